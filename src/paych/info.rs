use super::PaychError;
use crate::identity::Address;
use crate::voucher::{SignedVoucher, TokenAmount, VoucherInfo};
use serde::{Deserialize, Serialize};

/// Local bookkeeping for one payment channel, keyed by its ledger address
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    from: Address,
    to: Address,
    next_lane: u64,
    next_nonce: u64,
    unique_addr: Address,
    vouchers: Vec<VoucherInfo>,
}

impl ChannelInfo {
    /// Record for a channel this node created: no lanes allocated yet
    pub fn new(from: Address, to: Address, unique_addr: Address) -> Self {
        Self {
            from,
            to,
            next_lane: 0,
            next_nonce: 1,
            unique_addr,
            vouchers: Vec::new(),
        }
    }

    /// Record for a channel first seen through an incoming voucher.
    ///
    /// The voucher implicitly allocates lane 0 and consumes a nonce for
    /// itself, so lane and nonce counters start one step ahead.
    pub fn bootstrap(from: Address, to: Address, unique_addr: Address, first: VoucherInfo) -> Self {
        Self {
            from,
            to,
            next_lane: 1,
            next_nonce: 2,
            unique_addr,
            vouchers: vec![first],
        }
    }

    /// Payer
    pub fn from(&self) -> &Address {
        &self.from
    }

    /// Payee
    pub fn to(&self) -> &Address {
        &self.to
    }

    pub fn next_lane(&self) -> u64 {
        self.next_lane
    }

    pub fn next_nonce(&self) -> u64 {
        self.next_nonce
    }

    pub fn unique_addr(&self) -> &Address {
        &self.unique_addr
    }

    /// Stored vouchers in acceptance order
    pub fn vouchers(&self) -> &[VoucherInfo] {
        &self.vouchers
    }

    /// Claim the next lane, consuming one nonce
    pub fn allocate_lane(&mut self) -> u64 {
        let lane = self.next_lane;
        self.next_lane += 1;
        self.next_nonce += 1;
        lane
    }

    /// Highest amount across every stored voucher, on any lane
    pub fn largest_voucher_amount(&self) -> TokenAmount {
        self.vouchers
            .iter()
            .map(|v| v.voucher.amount())
            .max()
            .cloned()
            .unwrap_or_default()
    }

    pub fn has_voucher(&self, voucher: &SignedVoucher) -> bool {
        self.vouchers.iter().any(|v| v.voucher.same_payment(voucher))
    }

    fn check_lane(&self, voucher: &SignedVoucher) -> Result<(), PaychError> {
        if voucher.lane() >= self.next_lane {
            return Err(PaychError::InvalidLane {
                lane: voucher.lane(),
                next_lane: self.next_lane,
            });
        }
        Ok(())
    }

    fn check_duplicate(&self, voucher: &SignedVoucher) -> Result<(), PaychError> {
        if self.has_voucher(voucher) {
            return Err(PaychError::DuplicateVoucher {
                lane: voucher.lane(),
                nonce: voucher.nonce(),
            });
        }
        Ok(())
    }

    fn push_voucher(&mut self, voucher: SignedVoucher, proof: Option<Vec<u8>>) {
        self.next_nonce += 1;
        self.vouchers.push(VoucherInfo::new(voucher, proof));
    }

    /// Store a voucher this node issued itself. No amount check is made.
    pub fn record_voucher(&mut self, voucher: &SignedVoucher) -> Result<(), PaychError> {
        self.check_lane(voucher)?;
        self.check_duplicate(voucher)?;
        self.push_voucher(voucher.clone(), None);
        Ok(())
    }

    /// Validate and store an incoming voucher, returning the newly payable amount.
    ///
    /// The increment is measured against the largest voucher on any lane and
    /// may not exceed `expected`. The record is unchanged on error.
    pub fn accept_voucher(
        &mut self,
        voucher: &SignedVoucher,
        proof: Option<Vec<u8>>,
        expected: &TokenAmount,
    ) -> Result<TokenAmount, PaychError> {
        self.check_lane(voucher)?;

        let largest = self.largest_voucher_amount();
        let delta = voucher.amount() - &largest;
        if expected < &delta {
            return Err(PaychError::InsufficientIncrement {
                expected: expected.clone(),
                delta,
            });
        }

        self.check_duplicate(voucher)?;
        self.push_voucher(voucher.clone(), proof);
        Ok(delta)
    }
}
