use super::{ChannelInfo, Manager, PaychError};
use crate::chain::TipSetToken;
use crate::identity::Address;
use crate::voucher::{SignedVoucher, TokenAmount, VoucherInfo};

impl Manager {
    /// Save a voucher this node issued on its own channel.
    ///
    /// Used by the payer to remember what it has promised. The lane must
    /// already be allocated; no amount check is made.
    pub fn add_voucher_to_channel(
        &self,
        paych: &Address,
        voucher: &SignedVoucher,
    ) -> Result<(), PaychError> {
        self.store
            .mutate(paych, |info| info.record_voucher(voucher))?;
        tracing::debug!(
            channel = %paych,
            lane = voucher.lane(),
            nonce = voucher.nonce(),
            "saved issued voucher"
        );
        Ok(())
    }

    /// Accept a voucher received from the payer and return the amount it
    /// newly makes payable.
    ///
    /// If the channel is unknown locally its parties are read from the ledger
    /// at `token` and a record is created holding this voucher alone; the
    /// whole voucher amount is then payable. Otherwise the increment over the
    /// largest stored voucher must not exceed `expected`.
    pub async fn add_voucher(
        &self,
        paych: &Address,
        voucher: &SignedVoucher,
        proof: Option<Vec<u8>>,
        expected: &TokenAmount,
        token: &TipSetToken,
    ) -> Result<TokenAmount, PaychError> {
        if !self.channel_exists(paych)? {
            match self
                .create_payment_channel_with_voucher(paych, voucher, proof.clone(), token)
                .await
            {
                Err(PaychError::AlreadyExists(_)) => {
                    tracing::debug!(channel = %paych, "channel recorded concurrently, validating voucher against it");
                }
                other => return other,
            }
        }

        let delta = self
            .store
            .mutate(paych, |info| info.accept_voucher(voucher, proof.clone(), expected))?;
        tracing::debug!(
            channel = %paych,
            lane = voucher.lane(),
            nonce = voucher.nonce(),
            %delta,
            "accepted voucher"
        );
        Ok(delta)
    }

    async fn create_payment_channel_with_voucher(
        &self,
        paych: &Address,
        voucher: &SignedVoucher,
        proof: Option<Vec<u8>>,
        token: &TipSetToken,
    ) -> Result<TokenAmount, PaychError> {
        let view = self.viewer.state_view(token).await?;
        let (from, to) = view.paych_actor_parties(paych).await?;

        let info = ChannelInfo::bootstrap(
            from,
            to,
            paych.clone(),
            VoucherInfo::new(voucher.clone(), proof),
        );
        self.store.begin(paych, &info)?;

        tracing::info!(
            channel = %paych,
            from = %info.from(),
            to = %info.to(),
            "recorded channel from first voucher"
        );
        Ok(voucher.amount().clone())
    }
}
