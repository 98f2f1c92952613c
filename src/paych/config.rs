use super::PaychError;
use crate::storage::PAYMENT_CHANNEL_STORE_PREFIX;
use crate::voucher::TokenAmount;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Smallest units per whole token
const ATTO_PER_TOKEN: u64 = 1_000_000_000_000_000_000;
const DEFAULT_GAS_COST_TOKENS: u64 = 100;

// ============================================================================
// MANAGER CONFIG
// ============================================================================

/// Configuration for the payment channel manager
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Gas price attached to every submitted message
    pub gas_price: TokenAmount,
    /// Gas limit attached to every submitted message
    pub gas_limit: u64,
    /// Upper bound on the synchronous wait variants, in seconds
    pub wait_timeout_secs: u64,
    /// Namespace of the channel records in the database
    pub store_namespace: String,
    /// Buffered manager events per subscriber
    pub event_capacity: usize,
    /// Tracked creation outcomes before untaken finished ones are dropped
    pub creation_history: usize,
}

impl ManagerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gas_price(mut self, price: impl Into<TokenAmount>) -> Self {
        self.gas_price = price.into();
        self
    }

    pub fn with_gas_limit(mut self, limit: u64) -> Self {
        self.gas_limit = limit;
        self
    }

    pub fn with_wait_timeout_secs(mut self, secs: u64) -> Self {
        self.wait_timeout_secs = secs;
        self
    }

    pub fn with_store_namespace(mut self, namespace: &str) -> Self {
        self.store_namespace = namespace.to_string();
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub fn with_creation_history(mut self, history: usize) -> Self {
        self.creation_history = history;
        self
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), PaychError> {
        if self.gas_limit == 0 {
            return Err(PaychError::InvalidConfig("gas_limit must be > 0".to_string()));
        }
        if self.wait_timeout_secs == 0 {
            return Err(PaychError::InvalidConfig(
                "wait_timeout_secs must be > 0".to_string(),
            ));
        }
        if self.store_namespace.is_empty() {
            return Err(PaychError::InvalidConfig(
                "store_namespace cannot be empty".to_string(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(PaychError::InvalidConfig(
                "event_capacity must be > 0".to_string(),
            ));
        }
        if self.creation_history == 0 {
            return Err(PaychError::InvalidConfig(
                "creation_history must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            gas_price: BigInt::from(DEFAULT_GAS_COST_TOKENS) * BigInt::from(ATTO_PER_TOKEN),
            gas_limit: 5000,
            wait_timeout_secs: 300,
            store_namespace: PAYMENT_CHANNEL_STORE_PREFIX.to_string(),
            event_capacity: 64,
            creation_history: 1024,
        }
    }
}
