// Payment channel module - the channel manager
// Lane allocation, voucher accounting, channel creation/funding and queries

mod config;
mod error;
mod info;
mod lanes;
mod lifecycle;
mod manager;
mod query;
mod vouchers;

pub use config::ManagerConfig;
pub use error::PaychError;
pub use info::ChannelInfo;
pub use lifecycle::{decode_create_result, CreatedChannel};
pub use manager::{Manager, ManagerEvent};
pub use query::find_by_accounts;
