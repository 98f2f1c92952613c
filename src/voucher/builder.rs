use crate::identity::{Address, Keypair};
use crate::voucher::{SignedVoucher, TokenAmount};
use num_bigint::Sign;
use thiserror::Error;

/// Errors that can occur when building a voucher
#[derive(Error, Debug)]
pub enum VoucherError {
    #[error("Missing channel: channel address is required")]
    MissingChannel,

    #[error("Missing amount: voucher amount is required")]
    MissingAmount,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

/// Builder for payer-issued vouchers
pub struct VoucherBuilder<'a> {
    channel: Option<Address>,
    lane: u64,
    nonce: u64,
    amount: Option<TokenAmount>,
    min_settle_height: i64,
    signer: Option<&'a Keypair>,
}

impl<'a> VoucherBuilder<'a> {
    pub fn new() -> Self {
        Self {
            channel: None,
            lane: 0,
            nonce: 0,
            amount: None,
            min_settle_height: 0,
            signer: None,
        }
    }

    /// Set the channel address (required)
    pub fn channel(mut self, addr: Address) -> Self {
        self.channel = Some(addr);
        self
    }

    pub fn lane(mut self, lane: u64) -> Self {
        self.lane = lane;
        self
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    /// Set the cumulative amount (required)
    pub fn amount(mut self, amount: impl Into<TokenAmount>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    pub fn min_settle_height(mut self, height: i64) -> Self {
        self.min_settle_height = height;
        self
    }

    /// Sign with the payer's keypair (optional)
    pub fn signer(mut self, keypair: &'a Keypair) -> Self {
        self.signer = Some(keypair);
        self
    }

    pub fn build(self) -> Result<SignedVoucher, VoucherError> {
        let channel = self.channel.ok_or(VoucherError::MissingChannel)?;
        let amount = self.amount.ok_or(VoucherError::MissingAmount)?;

        if amount.sign() == Sign::Minus {
            return Err(VoucherError::InvalidAmount(
                "amount cannot be negative".to_string(),
            ));
        }

        let voucher = SignedVoucher::new(channel, self.lane, self.nonce, amount)
            .with_min_settle_height(self.min_settle_height);

        Ok(match self.signer {
            Some(keypair) => voucher.sign(keypair),
            None => voucher,
        })
    }
}

impl<'a> Default for VoucherBuilder<'a> {
    fn default() -> Self {
        Self::new()
    }
}
