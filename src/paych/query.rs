use super::{ChannelInfo, Manager, PaychError};
use crate::identity::Address;
use crate::storage::{ChannelStore, StoreError};

/// First record whose parties are exactly (payer, payee).
///
/// Scans every record. More than one match is possible when two creations
/// for the same pair raced; which one is returned is then unspecified.
pub fn find_by_accounts(
    store: &ChannelStore,
    payer: &Address,
    payee: &Address,
) -> Result<Option<ChannelInfo>, StoreError> {
    Ok(store
        .list()?
        .into_iter()
        .find(|info| info.from() == payer && info.to() == payee))
}

impl Manager {
    /// Look up a channel by its parties
    pub fn get_payment_channel_by_accounts(
        &self,
        payer: &Address,
        payee: &Address,
    ) -> Result<Option<ChannelInfo>, PaychError> {
        Ok(find_by_accounts(&self.store, payer, payee)?)
    }

    /// Record of a channel; `NotFound` if this node has none
    pub fn get_payment_channel_info(&self, paych: &Address) -> Result<ChannelInfo, PaychError> {
        Ok(self.store.get(paych)?)
    }

    pub fn channel_exists(&self, paych: &Address) -> Result<bool, PaychError> {
        Ok(self.store.has(paych)?)
    }

    /// Snapshot of every channel record
    pub fn list_channels(&self) -> Result<Vec<ChannelInfo>, PaychError> {
        Ok(self.store.list()?)
    }
}
