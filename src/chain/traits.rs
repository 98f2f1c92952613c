// Collaborator traits for talking to the shared ledger

use super::{ChainError, MessageId, MessageLookup, TipSetToken, UnsignedMessage};
use crate::identity::Address;
use async_trait::async_trait;

/// Posts messages to the ledger
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Sign and submit a message. Returns as soon as the message is accepted
    /// for inclusion; it may still be pending afterwards.
    async fn send(
        &self,
        message: UnsignedMessage,
        broadcast: bool,
    ) -> Result<MessageId, ChainError>;
}

/// Waits for a submitted message to execute
#[async_trait]
pub trait MessageWaiter: Send + Sync {
    /// Resolve once the message has been included and executed
    async fn wait(&self, id: &MessageId) -> Result<MessageLookup, ChainError>;
}

/// Read-only view of actor state at one tipset
#[async_trait]
pub trait StateView: Send + Sync {
    /// (owner, worker) addresses of a storage miner
    async fn miner_control_addresses(
        &self,
        miner: &Address,
    ) -> Result<(Address, Address), ChainError>;

    /// (from, to) parties of a payment channel actor
    async fn paych_actor_parties(
        &self,
        paych: &Address,
    ) -> Result<(Address, Address), ChainError>;
}

/// Produces state views
#[async_trait]
pub trait ActorStateViewer: Send + Sync {
    async fn state_view(&self, token: &TipSetToken) -> Result<Box<dyn StateView>, ChainError>;
}
