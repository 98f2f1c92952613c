use crate::identity::{Address, Keypair, PublicKey, Signature, Signer};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// Token amount on the ledger, in the smallest unit
pub type TokenAmount = BigInt;

/// A payment voucher issued by the payer of a channel.
///
/// The amount is cumulative for the channel: a payee holding vouchers for 10
/// and then 25 is owed 25, not 35. The signature is carried along but never
/// checked by the manager.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedVoucher {
    channel_addr: Address,
    lane: u64,
    nonce: u64,
    amount: TokenAmount,
    min_settle_height: i64,
    signature: Option<Signature>,
}

impl SignedVoucher {
    /// Create an unsigned voucher
    pub fn new(channel_addr: Address, lane: u64, nonce: u64, amount: TokenAmount) -> Self {
        Self {
            channel_addr,
            lane,
            nonce,
            amount,
            min_settle_height: 0,
            signature: None,
        }
    }

    pub fn with_min_settle_height(mut self, height: i64) -> Self {
        self.min_settle_height = height;
        self
    }

    pub fn channel_addr(&self) -> &Address {
        &self.channel_addr
    }

    pub fn lane(&self) -> u64 {
        self.lane
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn amount(&self) -> &TokenAmount {
        &self.amount
    }

    pub fn min_settle_height(&self) -> i64 {
        self.min_settle_height
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    /// Deterministic bytes covered by the signature
    pub fn signing_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();

        let channel = self.channel_addr.to_bytes();
        bytes.extend_from_slice(&(channel.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&channel);

        bytes.extend_from_slice(&self.lane.to_le_bytes());
        bytes.extend_from_slice(&self.nonce.to_le_bytes());

        let amount = self.amount.to_signed_bytes_le();
        bytes.extend_from_slice(&(amount.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&amount);

        bytes.extend_from_slice(&self.min_settle_height.to_le_bytes());
        bytes
    }

    /// Sign the voucher, replacing any previous signature
    pub fn sign(mut self, keypair: &Keypair) -> Self {
        self.signature = Some(Signer::sign(keypair, &self.signing_bytes()));
        self
    }

    /// Check the signature against the payer's key. Unsigned vouchers never verify.
    pub fn verify(&self, public_key: &PublicKey) -> bool {
        match &self.signature {
            Some(sig) => Signer::verify(public_key, &self.signing_bytes(), sig),
            None => false,
        }
    }

    /// Whether two vouchers describe the same payment (lane, nonce and amount)
    pub fn same_payment(&self, other: &SignedVoucher) -> bool {
        self.lane == other.lane && self.nonce == other.nonce && self.amount == other.amount
    }
}

/// A voucher as stored in a channel record, with the payee's optional proof
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherInfo {
    pub voucher: SignedVoucher,
    pub proof: Option<Vec<u8>>,
}

impl VoucherInfo {
    pub fn new(voucher: SignedVoucher, proof: Option<Vec<u8>>) -> Self {
        Self { voucher, proof }
    }
}
