// Parameter and return encodings for the init actor's exec method

use super::ChainError;
use crate::identity::Address;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Code id of the payment channel actor
pub const PAYMENT_CHANNEL_ACTOR_CODE: &str = "builtin/paymentchannel";

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ChainError> {
    postcard::to_allocvec(value).map_err(|e| ChainError::Encode(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ChainError> {
    postcard::from_bytes(bytes).map_err(|e| ChainError::Decode(e.to_string()))
}

/// Constructor parameters of a payment channel actor
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorParams {
    pub from: Address,
    pub to: Address,
}

impl ConstructorParams {
    pub fn encode(&self) -> Result<Vec<u8>, ChainError> {
        encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ChainError> {
        decode(bytes)
    }
}

/// Parameters of the init actor's exec method
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecParams {
    pub code_id: String,
    pub constructor_params: Vec<u8>,
}

impl ExecParams {
    pub fn encode(&self) -> Result<Vec<u8>, ChainError> {
        encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ChainError> {
        decode(bytes)
    }
}

/// Return value of the init actor's exec method
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecReturn {
    /// Id address assigned to the new actor; may be reorganised away
    pub id_address: Address,
    /// Reorg-stable address of the new actor
    pub robust_address: Address,
}

impl ExecReturn {
    pub fn encode(&self) -> Result<Vec<u8>, ChainError> {
        encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ChainError> {
        decode(bytes)
    }
}

/// Exec parameters that construct a payment channel from `payer` to `payee`
pub fn paych_actor_ctor_exec_params_for(
    payer: &Address,
    payee: &Address,
) -> Result<ExecParams, ChainError> {
    let ctor = ConstructorParams {
        from: payer.clone(),
        to: payee.clone(),
    };
    Ok(ExecParams {
        code_id: PAYMENT_CHANNEL_ACTOR_CODE.to_string(),
        constructor_params: ctor.encode()?,
    })
}
