// Chain module - the shared ledger as seen by the channel manager
// Message types, exec parameter encodings, collaborator traits and a mock ledger

mod message;
mod mock;
mod params;
mod traits;

pub use message::*;
pub use mock::*;
pub use params::*;
pub use traits::*;

use crate::identity::Address;
use thiserror::Error;

/// Errors reported by ledger collaborators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("Message submission failed: {0}")]
    Submission(String),

    #[error("Message not found: {0}")]
    MessageNotFound(MessageId),

    #[error("Actor not found: {0}")]
    ActorNotFound(Address),

    #[error("State view unavailable: {0}")]
    StateView(String),

    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("Decoding failed: {0}")]
    Decode(String),

    #[error("Wait aborted: {0}")]
    WaitAborted(String),
}
