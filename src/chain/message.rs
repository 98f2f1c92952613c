// Ledger message types exchanged with the transaction submitter and waiter

use super::ChainError;
use crate::identity::Address;
use crate::voucher::TokenAmount;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Id of the init actor, which constructs new actors on the ledger
pub const INIT_ACTOR_ID: u64 = 1;

/// Address of the init actor
pub fn init_actor_addr() -> Address {
    Address::new_id(INIT_ACTOR_ID)
}

// ============================================================================
// MESSAGE ID
// ============================================================================

/// Content identifier of a submitted message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId([u8; 32]);

impl MessageId {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hash of the message's canonical encoding
    pub fn of(message: &SignedMessage) -> Result<Self, ChainError> {
        let encoded =
            postcard::to_allocvec(message).map_err(|e| ChainError::Encode(e.to_string()))?;
        let mut id = [0u8; 32];
        id.copy_from_slice(&Sha256::digest(&encoded));
        Ok(Self(id))
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for MessageId {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

// ============================================================================
// METHODS AND EXIT CODES
// ============================================================================

/// Actor method number
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodNum(pub u64);

impl MethodNum {
    /// Plain value transfer
    pub const SEND: MethodNum = MethodNum(0);
    /// Init actor: construct a new actor
    pub const INIT_EXEC: MethodNum = MethodNum(2);
}

/// Execution outcome of a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExitCode(pub u32);

impl ExitCode {
    pub const OK: ExitCode = ExitCode(0);
    pub const SYS_INVALID_METHOD: ExitCode = ExitCode(3);
    pub const ERR_ILLEGAL_ARGUMENT: ExitCode = ExitCode(16);
    pub const ERR_NOT_FOUND: ExitCode = ExitCode(17);
    pub const ERR_SERIALIZATION: ExitCode = ExitCode(21);

    pub fn is_success(&self) -> bool {
        *self == ExitCode::OK
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// MESSAGES
// ============================================================================

/// A message before the submitter assigns its sequence and signs it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedMessage {
    pub from: Address,
    pub to: Address,
    pub sequence: u64,
    pub value: TokenAmount,
    pub gas_price: TokenAmount,
    pub gas_limit: u64,
    pub method: MethodNum,
    pub params: Vec<u8>,
}

impl UnsignedMessage {
    pub fn new(
        from: Address,
        to: Address,
        value: TokenAmount,
        method: MethodNum,
        params: Vec<u8>,
    ) -> Self {
        Self {
            from,
            to,
            sequence: 0,
            value,
            gas_price: TokenAmount::default(),
            gas_limit: 0,
            method,
            params,
        }
    }

    pub fn with_gas(mut self, gas_price: TokenAmount, gas_limit: u64) -> Self {
        self.gas_price = gas_price;
        self.gas_limit = gas_limit;
        self
    }
}

/// A message as included on the ledger. The signature is opaque here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedMessage {
    pub message: UnsignedMessage,
    pub signature: Vec<u8>,
}

/// Result of executing a message
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReceipt {
    pub exit_code: ExitCode,
    pub return_value: Vec<u8>,
    pub gas_used: u64,
}

impl MessageReceipt {
    pub fn success(return_value: Vec<u8>, gas_used: u64) -> Self {
        Self {
            exit_code: ExitCode::OK,
            return_value,
            gas_used,
        }
    }

    pub fn failure(exit_code: ExitCode, gas_used: u64) -> Self {
        Self {
            exit_code,
            return_value: Vec::new(),
            gas_used,
        }
    }
}

/// Opaque reference to a point in ledger history
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TipSetToken(pub Vec<u8>);

impl TipSetToken {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }
}

/// Block that included a message
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub height: u64,
    pub miner: Address,
}

impl Block {
    /// Token naming the tipset this block heads
    pub fn token(&self) -> TipSetToken {
        TipSetToken::new(self.height.to_be_bytes().to_vec())
    }
}

/// Everything known about a message once it has executed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageLookup {
    pub block: Block,
    pub message: SignedMessage,
    pub receipt: MessageReceipt,
}
