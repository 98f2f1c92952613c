// Storage module - PERSISTENCE
// Channel records in a namespaced sled tree

mod store;

pub use store::{ChannelStore, StoreError, PAYMENT_CHANNEL_STORE_PREFIX};
