use super::{Manager, PaychError};
use crate::identity::Address;

impl Manager {
    /// Allocate a new lane on a channel, consuming one nonce.
    ///
    /// Lane ids for a channel are strictly increasing and never reused, also
    /// under concurrent callers.
    pub fn allocate_lane(&self, paych: &Address) -> Result<u64, PaychError> {
        let lane = self
            .store
            .mutate(paych, |info| Ok::<_, PaychError>(info.allocate_lane()))?;
        tracing::debug!(channel = %paych, lane, "allocated lane");
        Ok(lane)
    }
}
