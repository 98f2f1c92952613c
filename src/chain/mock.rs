// MockChain - in-process ledger for tests and local development
// Implements the sender, waiter and state viewer traits over an in-memory actor table

use super::{
    init_actor_addr, ActorStateViewer, Block, ChainError, ConstructorParams, ExecParams,
    ExecReturn, ExitCode, MessageId, MessageLookup, MessageReceipt, MessageSender,
    MessageWaiter, MethodNum, SignedMessage, StateView, TipSetToken, UnsignedMessage,
    PAYMENT_CHANNEL_ACTOR_CODE,
};
use crate::identity::Address;
use crate::voucher::TokenAmount;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;

const MOCK_GAS_USED: u64 = 100;

/// On-ledger state of a mock payment channel actor
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockChannelActor {
    pub from: Address,
    pub to: Address,
    pub balance: TokenAmount,
}

#[derive(Default)]
struct MockState {
    next_sequence: u64,
    next_actor_id: u64,
    height: u64,
    sent: Vec<MessageId>,
    pending: HashMap<MessageId, SignedMessage>,
    executed: HashMap<MessageId, MessageLookup>,
    channels: HashMap<Address, MockChannelActor>,
    miners: HashMap<Address, (Address, Address)>,
}

/// Mock ledger implementing every collaborator trait the manager needs.
///
/// Messages stay pending until [`MockChain::confirm`] executes them, unless
/// the chain was built with auto-confirmation.
pub struct MockChain {
    state: Mutex<MockState>,
    executed_tx: watch::Sender<u64>,
    auto_confirm: bool,
    exit_code: ExitCode,
    submit_failure: Option<String>,
}

impl MockChain {
    pub fn new() -> Self {
        let (executed_tx, _) = watch::channel(0);
        Self {
            state: Mutex::new(MockState {
                next_actor_id: 100,
                ..MockState::default()
            }),
            executed_tx,
            auto_confirm: false,
            exit_code: ExitCode::OK,
            submit_failure: None,
        }
    }

    /// Execute every message as soon as it is sent
    pub fn with_auto_confirm(mut self) -> Self {
        self.auto_confirm = true;
        self
    }

    /// Execute every message with the given exit code and no state change
    pub fn with_exit_code(mut self, exit_code: ExitCode) -> Self {
        self.exit_code = exit_code;
        self
    }

    /// Reject every submission
    pub fn with_submit_failure(mut self, message: &str) -> Self {
        self.submit_failure = Some(message.to_string());
        self
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a storage miner's control addresses
    pub fn register_miner(&self, miner: Address, owner: Address, worker: Address) {
        self.lock().miners.insert(miner, (owner, worker));
    }

    /// Place a payment channel actor on the ledger directly
    pub fn register_channel(&self, paych: Address, from: Address, to: Address) {
        self.lock().channels.insert(
            paych,
            MockChannelActor {
                from,
                to,
                balance: TokenAmount::default(),
            },
        );
    }

    pub fn channel_actor(&self, paych: &Address) -> Option<MockChannelActor> {
        self.lock().channels.get(paych).cloned()
    }

    /// Messages sent so far, oldest first
    pub fn sent_messages(&self) -> Vec<SignedMessage> {
        let state = self.lock();
        state
            .sent
            .iter()
            .filter_map(|id| {
                state
                    .pending
                    .get(id)
                    .cloned()
                    .or_else(|| state.executed.get(id).map(|l| l.message.clone()))
            })
            .collect()
    }

    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    /// Execute a pending message against the mock actors
    pub fn confirm(&self, id: &MessageId) -> Option<MessageLookup> {
        let lookup = {
            let mut state = self.lock();
            let message = state.pending.remove(id)?;
            let receipt = if self.exit_code.is_success() {
                apply(&mut state, &message.message)
            } else {
                MessageReceipt::failure(self.exit_code, MOCK_GAS_USED)
            };
            record(&mut state, *id, message, receipt)
        };
        self.executed_tx.send_modify(|n| *n += 1);
        Some(lookup)
    }

    /// Execute a pending message with a caller-supplied receipt, skipping actor logic
    pub fn confirm_with_receipt(
        &self,
        id: &MessageId,
        receipt: MessageReceipt,
    ) -> Option<MessageLookup> {
        let lookup = {
            let mut state = self.lock();
            let message = state.pending.remove(id)?;
            record(&mut state, *id, message, receipt)
        };
        self.executed_tx.send_modify(|n| *n += 1);
        Some(lookup)
    }

    /// Execute all pending messages in submission order
    pub fn confirm_all(&self) -> Vec<MessageLookup> {
        let ids: Vec<MessageId> = {
            let state = self.lock();
            state
                .sent
                .iter()
                .filter(|id| state.pending.contains_key(id))
                .copied()
                .collect()
        };
        ids.iter().filter_map(|id| self.confirm(id)).collect()
    }
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new()
    }
}

fn record(
    state: &mut MockState,
    id: MessageId,
    message: SignedMessage,
    receipt: MessageReceipt,
) -> MessageLookup {
    state.height += 1;
    let lookup = MessageLookup {
        block: Block {
            height: state.height,
            miner: Address::new_id(1000),
        },
        message,
        receipt,
    };
    state.executed.insert(id, lookup.clone());
    lookup
}

fn apply(state: &mut MockState, message: &UnsignedMessage) -> MessageReceipt {
    if message.to == init_actor_addr() {
        if message.method != MethodNum::INIT_EXEC {
            return MessageReceipt::failure(ExitCode::SYS_INVALID_METHOD, MOCK_GAS_USED);
        }
        return exec_paych_constructor(state, message);
    }

    if message.method != MethodNum::SEND {
        return MessageReceipt::failure(ExitCode::SYS_INVALID_METHOD, MOCK_GAS_USED);
    }
    if let Some(actor) = state.channels.get_mut(&message.to) {
        actor.balance += &message.value;
    }
    MessageReceipt::success(Vec::new(), MOCK_GAS_USED)
}

fn exec_paych_constructor(state: &mut MockState, message: &UnsignedMessage) -> MessageReceipt {
    let ctor = match ExecParams::decode(&message.params) {
        Ok(exec) if exec.code_id == PAYMENT_CHANNEL_ACTOR_CODE => {
            match ConstructorParams::decode(&exec.constructor_params) {
                Ok(ctor) => ctor,
                Err(_) => return MessageReceipt::failure(ExitCode::ERR_SERIALIZATION, MOCK_GAS_USED),
            }
        }
        Ok(_) => return MessageReceipt::failure(ExitCode::ERR_ILLEGAL_ARGUMENT, MOCK_GAS_USED),
        Err(_) => return MessageReceipt::failure(ExitCode::ERR_SERIALIZATION, MOCK_GAS_USED),
    };

    state.next_actor_id += 1;
    let id_address = Address::new_id(state.next_actor_id);
    let seed = [message.from.to_bytes(), message.sequence.to_be_bytes().to_vec()].concat();
    let robust_address = Address::new_actor(&seed);

    state.channels.insert(
        robust_address.clone(),
        MockChannelActor {
            from: ctor.from,
            to: ctor.to,
            balance: message.value.clone(),
        },
    );

    let ret = ExecReturn {
        id_address,
        robust_address,
    };
    match ret.encode() {
        Ok(bytes) => MessageReceipt::success(bytes, MOCK_GAS_USED),
        Err(_) => MessageReceipt::failure(ExitCode::ERR_SERIALIZATION, MOCK_GAS_USED),
    }
}

#[async_trait]
impl MessageSender for MockChain {
    async fn send(
        &self,
        mut message: UnsignedMessage,
        _broadcast: bool,
    ) -> Result<MessageId, ChainError> {
        if let Some(reason) = &self.submit_failure {
            return Err(ChainError::Submission(reason.clone()));
        }

        let id = {
            let mut state = self.lock();
            message.sequence = state.next_sequence;

            let signed = SignedMessage {
                message,
                signature: Vec::new(),
            };
            let id = MessageId::of(&signed)?;
            state.next_sequence += 1;
            state.sent.push(id);
            state.pending.insert(id, signed);
            id
        };

        if self.auto_confirm {
            self.confirm(&id);
        }
        Ok(id)
    }
}

#[async_trait]
impl MessageWaiter for MockChain {
    async fn wait(&self, id: &MessageId) -> Result<MessageLookup, ChainError> {
        let mut executed_rx = self.executed_tx.subscribe();
        loop {
            {
                let state = self.lock();
                if let Some(lookup) = state.executed.get(id) {
                    return Ok(lookup.clone());
                }
                if !state.pending.contains_key(id) {
                    return Err(ChainError::MessageNotFound(*id));
                }
            }
            executed_rx
                .changed()
                .await
                .map_err(|e| ChainError::WaitAborted(e.to_string()))?;
        }
    }
}

/// Snapshot of the mock actor table
pub struct MockStateView {
    channels: HashMap<Address, MockChannelActor>,
    miners: HashMap<Address, (Address, Address)>,
}

#[async_trait]
impl StateView for MockStateView {
    async fn miner_control_addresses(
        &self,
        miner: &Address,
    ) -> Result<(Address, Address), ChainError> {
        self.miners
            .get(miner)
            .cloned()
            .ok_or_else(|| ChainError::ActorNotFound(miner.clone()))
    }

    async fn paych_actor_parties(
        &self,
        paych: &Address,
    ) -> Result<(Address, Address), ChainError> {
        self.channels
            .get(paych)
            .map(|actor| (actor.from.clone(), actor.to.clone()))
            .ok_or_else(|| ChainError::ActorNotFound(paych.clone()))
    }
}

#[async_trait]
impl ActorStateViewer for MockChain {
    async fn state_view(&self, _token: &TipSetToken) -> Result<Box<dyn StateView>, ChainError> {
        let state = self.lock();
        Ok(Box::new(MockStateView {
            channels: state.channels.clone(),
            miners: state.miners.clone(),
        }))
    }
}
