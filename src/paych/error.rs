use crate::chain::{ChainError, ExitCode, MessageId};
use crate::identity::Address;
use crate::storage::StoreError;
use crate::voucher::TokenAmount;
use thiserror::Error;

/// Errors returned by the payment channel manager
#[derive(Error, Debug)]
pub enum PaychError {
    #[error("No payment channel record for {0}")]
    NotFound(Address),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Lane {lane} does not exist (next lane is {next_lane})")]
    InvalidLane { lane: u64, next_lane: u64 },

    #[error("Voucher amount insufficient: increment {delta} exceeds expected {expected}")]
    InsufficientIncrement {
        expected: TokenAmount,
        delta: TokenAmount,
    },

    #[error("Voucher already saved (lane {lane}, nonce {nonce})")]
    DuplicateVoucher { lane: u64, nonce: u64 },

    #[error("Message submission failed: {0}")]
    ChainSubmission(String),

    #[error("Message executed with exit code {exit_code}")]
    ChainExecution { exit_code: ExitCode },

    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("Decoding failed: {0}")]
    Decode(String),

    #[error("Ledger error: {0}")]
    Chain(ChainError),

    #[error("Storage error: {0}")]
    Store(StoreError),

    #[error("Timed out waiting for message {0}")]
    Timeout(MessageId),

    #[error("No background creation tracked for message {0}")]
    UnknownCreation(MessageId),

    #[error("Background task failed: {0}")]
    TaskFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<StoreError> for PaychError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(addr) => PaychError::NotFound(addr),
            StoreError::AlreadyExists(addr) => {
                PaychError::AlreadyExists(format!("channel record for {}", addr))
            }
            other => PaychError::Store(other),
        }
    }
}

impl From<ChainError> for PaychError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::Submission(reason) => PaychError::ChainSubmission(reason),
            ChainError::Encode(reason) => PaychError::Encode(reason),
            ChainError::Decode(reason) => PaychError::Decode(reason),
            other => PaychError::Chain(other),
        }
    }
}
