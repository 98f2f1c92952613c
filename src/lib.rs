// paych - payment channel manager for storage-retrieval markets
//
// Tracks lanes, nonces and vouchers of bilateral payment channels locally and
// reconciles them with channel creation and funding messages on the ledger.

pub mod chain;
pub mod identity;
pub mod paych;
pub mod storage;
pub mod voucher;

pub use paych::{ChannelInfo, Manager, ManagerConfig, ManagerEvent, PaychError};
