// Manager - payment channel façade
// Owns the channel store and the ledger collaborators; lane allocation,
// voucher accounting, channel lifecycle and queries are implemented in the
// sibling modules as further `impl Manager` blocks.

use super::{ManagerConfig, PaychError};
use crate::chain::{ActorStateViewer, MessageId, MessageSender, MessageWaiter};
use crate::identity::Address;
use crate::storage::ChannelStore;
use dashmap::{DashMap, DashSet};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

// ============================================================================
// MANAGER EVENTS
// ============================================================================

/// Outcomes of background work, broadcast to subscribers
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ManagerEvent {
    /// A create message was confirmed and the channel record written
    ChannelCreated {
        message_id: MessageId,
        channel: Address,
        from: Address,
        to: Address,
    },
    /// A create message did not produce a channel record
    ChannelCreationFailed {
        message_id: MessageId,
        from: Address,
        to: Address,
        error: String,
    },
}

// ============================================================================
// MANAGER
// ============================================================================

/// Payment channel manager.
///
/// Safe to share across tasks and threads; all shared state lives in the
/// channel store, which serializes writers per channel.
pub struct Manager {
    pub(super) store: ChannelStore,
    pub(super) sender: Arc<dyn MessageSender>,
    pub(super) waiter: Arc<dyn MessageWaiter>,
    pub(super) viewer: Arc<dyn ActorStateViewer>,
    pub(super) config: ManagerConfig,
    /// (payer, payee) pairs with a create message in flight
    pub(super) creating: Arc<DashSet<(Address, Address)>>,
    /// Background creation tasks by create message id
    pub(super) creations: DashMap<MessageId, JoinHandle<Result<Address, PaychError>>>,
    pub(super) events: broadcast::Sender<ManagerEvent>,
}

impl Manager {
    /// Create a manager over an open channel store
    pub fn new(
        store: ChannelStore,
        sender: Arc<dyn MessageSender>,
        waiter: Arc<dyn MessageWaiter>,
        viewer: Arc<dyn ActorStateViewer>,
        config: ManagerConfig,
    ) -> Result<Self, PaychError> {
        config.validate()?;
        let (events, _) = broadcast::channel(config.event_capacity);
        Ok(Self {
            store,
            sender,
            waiter,
            viewer,
            config,
            creating: Arc::new(DashSet::new()),
            creations: DashMap::new(),
            events,
        })
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Subscribe to background outcomes from this point on
    pub fn subscribe(&self) -> broadcast::Receiver<ManagerEvent> {
        self.events.subscribe()
    }
}
