// Channel lifecycle - creation and funding through ledger messages
//
// Creation is asynchronous: the create message is submitted, its id returned
// to the caller, and a detached task waits for execution and writes the
// channel record. The task's outcome is kept by the manager and broadcast as
// a ManagerEvent; it is never retried.

use super::{find_by_accounts, ChannelInfo, Manager, ManagerEvent, PaychError};
use crate::chain::{
    init_actor_addr, paych_actor_ctor_exec_params_for, ConstructorParams, ExecParams, ExecReturn,
    MessageId, MessageLookup, MessageWaiter, MethodNum, TipSetToken, UnsignedMessage,
};
use crate::identity::Address;
use crate::storage::ChannelStore;
use crate::voucher::TokenAmount;
use dashmap::DashSet;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Parties and address of a channel, as decoded from an executed create message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatedChannel {
    pub channel: Address,
    pub from: Address,
    pub to: Address,
}

/// Decode the outcome of an executed create message
pub fn decode_create_result(lookup: &MessageLookup) -> Result<CreatedChannel, PaychError> {
    let receipt = &lookup.receipt;
    if !receipt.exit_code.is_success() {
        return Err(PaychError::ChainExecution {
            exit_code: receipt.exit_code,
        });
    }

    let ret = ExecReturn::decode(&receipt.return_value)?;
    let exec = ExecParams::decode(&lookup.message.message.params)?;
    let ctor = ConstructorParams::decode(&exec.constructor_params)?;

    Ok(CreatedChannel {
        channel: ret.robust_address,
        from: ctor.from,
        to: ctor.to,
    })
}

impl Manager {
    /// Submit a message creating a channel from `payer` to `payee` funded
    /// with `amount`, and return its id.
    ///
    /// The channel record is written in the background once the message
    /// executes; see [`Manager::take_creation_result`] and
    /// [`Manager::subscribe`] for its outcome.
    pub async fn create_payment_channel(
        &self,
        payer: &Address,
        payee: &Address,
        amount: TokenAmount,
    ) -> Result<MessageId, PaychError> {
        // claim the pair before looking at the store, so a concurrent create
        // either sees the claim or the record its task wrote
        let pair = (payer.clone(), payee.clone());
        if !self.creating.insert(pair.clone()) {
            return Err(PaychError::AlreadyExists(format!(
                "payment channel creation in flight for payer {}, payee {}",
                payer, payee
            )));
        }

        let message_id = match self.check_and_submit_create(payer, payee, amount).await {
            Ok(id) => id,
            Err(e) => {
                self.creating.remove(&pair);
                return Err(e);
            }
        };

        tracing::info!(message_id = %message_id, from = %payer, to = %payee, "submitted payment channel create message");

        let task = CreationTask {
            message_id,
            payer: payer.clone(),
            payee: payee.clone(),
            store: self.store.clone(),
            waiter: self.waiter.clone(),
            creating: self.creating.clone(),
            events: self.events.clone(),
        };
        self.prune_finished_creations();
        self.creations.insert(message_id, tokio::spawn(task.run()));

        Ok(message_id)
    }

    async fn check_and_submit_create(
        &self,
        payer: &Address,
        payee: &Address,
        amount: TokenAmount,
    ) -> Result<MessageId, PaychError> {
        if let Some(existing) = self.get_payment_channel_by_accounts(payer, payee)? {
            return Err(PaychError::AlreadyExists(format!(
                "payment channel {} for payer {}, payee {}",
                existing.unique_addr(),
                payer,
                payee
            )));
        }
        self.submit_create(payer, payee, amount).await
    }

    /// Drop outcomes nobody took once the tracked set reaches its bound.
    /// Creations still running are always kept.
    fn prune_finished_creations(&self) {
        if self.creations.len() < self.config.creation_history {
            return;
        }
        let before = self.creations.len();
        self.creations.retain(|_, handle| !handle.is_finished());
        tracing::debug!(
            dropped = before - self.creations.len(),
            "pruned untaken creation outcomes"
        );
    }

    async fn submit_create(
        &self,
        payer: &Address,
        payee: &Address,
        amount: TokenAmount,
    ) -> Result<MessageId, PaychError> {
        let params = paych_actor_ctor_exec_params_for(payer, payee)?.encode()?;
        let message = UnsignedMessage::new(
            payer.clone(),
            init_actor_addr(),
            amount,
            MethodNum::INIT_EXEC,
            params,
        )
        .with_gas(self.config.gas_price.clone(), self.config.gas_limit);

        Ok(self.sender.send(message, true).await?)
    }

    /// Wait for the background creation started by `message_id` and return
    /// the new channel's address. Each outcome can be taken once.
    pub async fn take_creation_result(&self, message_id: &MessageId) -> Result<Address, PaychError> {
        let (_, handle) = self
            .creations
            .remove(message_id)
            .ok_or(PaychError::UnknownCreation(*message_id))?;
        handle
            .await
            .map_err(|e| PaychError::TaskFailed(e.to_string()))?
    }

    /// Whether a create message for this pair is still awaiting execution
    pub fn creation_in_flight(&self, payer: &Address, payee: &Address) -> bool {
        self.creating.contains(&(payer.clone(), payee.clone()))
    }

    /// Block until a create message executes and return the new channel's
    /// address. The channel store is not touched.
    pub async fn wait_for_create_paych_message(
        &self,
        message_id: &MessageId,
    ) -> Result<Address, PaychError> {
        let lookup = self.wait_for(message_id).await?;
        Ok(decode_create_result(&lookup)?.channel)
    }

    /// Submit a message moving `amount` from the channel's payer into the
    /// channel, and return its id. Funding totals are not tracked locally.
    pub async fn add_funds_to_channel(
        &self,
        paych: &Address,
        amount: TokenAmount,
    ) -> Result<MessageId, PaychError> {
        let info = self.get_payment_channel_info(paych)?;

        let message = UnsignedMessage::new(
            info.from().clone(),
            paych.clone(),
            amount.clone(),
            MethodNum::SEND,
            Vec::new(),
        )
        .with_gas(self.config.gas_price.clone(), self.config.gas_limit);

        let message_id = self.sender.send(message, true).await?;
        tracing::info!(message_id = %message_id, channel = %paych, %amount, "submitted add funds message");
        Ok(message_id)
    }

    /// Block until an add-funds message executes successfully
    pub async fn wait_for_add_funds_message(&self, message_id: &MessageId) -> Result<(), PaychError> {
        let lookup = self.wait_for(message_id).await?;
        if !lookup.receipt.exit_code.is_success() {
            return Err(PaychError::ChainExecution {
                exit_code: lookup.receipt.exit_code,
            });
        }
        Ok(())
    }

    /// Worker address of a storage miner at the given tipset
    pub async fn get_miner_worker_address(
        &self,
        miner: &Address,
        token: &TipSetToken,
    ) -> Result<Address, PaychError> {
        let view = self.viewer.state_view(token).await?;
        let (_, worker) = view.miner_control_addresses(miner).await?;
        Ok(worker)
    }

    /// Wait for a message within the configured timeout. Timing out stops
    /// only the local wait; the message may still execute.
    async fn wait_for(&self, message_id: &MessageId) -> Result<MessageLookup, PaychError> {
        match tokio::time::timeout(self.config.wait_timeout(), self.waiter.wait(message_id)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(PaychError::Timeout(*message_id)),
        }
    }
}

// ============================================================================
// BACKGROUND CREATION
// ============================================================================

struct CreationTask {
    message_id: MessageId,
    payer: Address,
    payee: Address,
    store: ChannelStore,
    waiter: Arc<dyn MessageWaiter>,
    creating: Arc<DashSet<(Address, Address)>>,
    events: broadcast::Sender<ManagerEvent>,
}

impl CreationTask {
    async fn run(self) -> Result<Address, PaychError> {
        let result = self.reconcile().await;
        self.creating.remove(&(self.payer.clone(), self.payee.clone()));

        // send only fails when there are no subscribers
        let _ = match &result {
            Ok(created) => {
                tracing::info!(
                    message_id = %self.message_id,
                    channel = %created.channel,
                    from = %created.from,
                    to = %created.to,
                    "recorded new payment channel"
                );
                self.events.send(ManagerEvent::ChannelCreated {
                    message_id: self.message_id,
                    channel: created.channel.clone(),
                    from: created.from.clone(),
                    to: created.to.clone(),
                })
            }
            Err(e) => {
                tracing::error!(
                    message_id = %self.message_id,
                    from = %self.payer,
                    to = %self.payee,
                    error = %e,
                    "payment channel creation failed"
                );
                self.events.send(ManagerEvent::ChannelCreationFailed {
                    message_id: self.message_id,
                    from: self.payer.clone(),
                    to: self.payee.clone(),
                    error: e.to_string(),
                })
            }
        };

        result.map(|created| created.channel)
    }

    async fn reconcile(&self) -> Result<CreatedChannel, PaychError> {
        let lookup = self.waiter.wait(&self.message_id).await?;
        let created = decode_create_result(&lookup)?;

        if let Some(existing) = find_by_accounts(&self.store, &created.from, &created.to)? {
            tracing::warn!(
                channel = %created.channel,
                existing = %existing.unique_addr(),
                "another payment channel already recorded for these parties"
            );
        }

        let info = ChannelInfo::new(
            created.from.clone(),
            created.to.clone(),
            created.channel.clone(),
        );
        self.store.begin(&created.channel, &info)?;
        Ok(created)
    }
}
