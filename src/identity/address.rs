use crate::identity::PublicKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const NETWORK_PREFIX: char = 'f';
const HASH_PAYLOAD_LEN: usize = 20;

#[derive(Error, Debug)]
pub enum AddressError {
    #[error("Invalid address format: {0}")]
    InvalidFormat(String),

    #[error("Unknown address protocol: {0}")]
    UnknownProtocol(u8),

    #[error("Invalid base58 encoding: {0}")]
    InvalidBase58(String),

    #[error("Invalid payload length for {protocol:?}: {len}")]
    InvalidPayload { protocol: Protocol, len: usize },
}

/// Address protocol tag
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Protocol {
    /// Numeric id assigned by the ledger (well-known actors)
    Id,
    /// Hash of a party's public key
    Key,
    /// Robust address of an actor created on the ledger
    Actor,
}

impl Protocol {
    fn tag(self) -> u8 {
        match self {
            Protocol::Id => 0,
            Protocol::Key => 1,
            Protocol::Actor => 2,
        }
    }

    fn from_tag(tag: u8) -> Result<Self, AddressError> {
        match tag {
            0 => Ok(Protocol::Id),
            1 => Ok(Protocol::Key),
            2 => Ok(Protocol::Actor),
            other => Err(AddressError::UnknownProtocol(other)),
        }
    }
}

/// Ledger address of an account or actor.
///
/// Textual form is `f<protocol><payload>`, where the payload of an id address
/// is its decimal id and all other payloads are base58.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address {
    protocol: Protocol,
    payload: Vec<u8>,
}

fn hash_payload(data: &[u8]) -> Vec<u8> {
    Sha256::digest(data)[..HASH_PAYLOAD_LEN].to_vec()
}

impl Address {
    /// Id address of a well-known actor
    pub fn new_id(id: u64) -> Self {
        Self {
            protocol: Protocol::Id,
            payload: id.to_be_bytes().to_vec(),
        }
    }

    /// Account address controlled by a public key
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        Self {
            protocol: Protocol::Key,
            payload: hash_payload(public_key.as_bytes()),
        }
    }

    /// Robust actor address derived from creation data
    pub fn new_actor(seed: &[u8]) -> Self {
        Self {
            protocol: Protocol::Actor,
            payload: hash_payload(seed),
        }
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// The numeric id, for id addresses
    pub fn id(&self) -> Option<u64> {
        match self.protocol {
            Protocol::Id => self
                .payload
                .as_slice()
                .try_into()
                .ok()
                .map(u64::from_be_bytes),
            _ => None,
        }
    }

    /// Binary form: protocol tag followed by the payload
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + self.payload.len());
        bytes.push(self.protocol.tag());
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AddressError> {
        let (tag, payload) = bytes
            .split_first()
            .ok_or_else(|| AddressError::InvalidFormat("empty address".into()))?;
        Self::from_parts(Protocol::from_tag(*tag)?, payload.to_vec())
    }

    fn from_parts(protocol: Protocol, payload: Vec<u8>) -> Result<Self, AddressError> {
        let expected = match protocol {
            Protocol::Id => 8,
            Protocol::Key | Protocol::Actor => HASH_PAYLOAD_LEN,
        };
        if payload.len() != expected {
            return Err(AddressError::InvalidPayload {
                protocol,
                len: payload.len(),
            });
        }
        Ok(Self { protocol, payload })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", NETWORK_PREFIX, self.protocol.tag())?;
        match self.id() {
            Some(id) => write!(f, "{}", id),
            None => write!(f, "{}", bs58::encode(&self.payload).into_string()),
        }
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if chars.next() != Some(NETWORK_PREFIX) {
            return Err(AddressError::InvalidFormat(format!(
                "expected '{}' prefix in '{}'",
                NETWORK_PREFIX, s
            )));
        }
        let tag = chars
            .next()
            .and_then(|c| c.to_digit(10))
            .ok_or_else(|| AddressError::InvalidFormat(format!("missing protocol in '{}'", s)))?;
        let protocol = Protocol::from_tag(tag as u8)?;
        let rest = chars.as_str();
        if rest.is_empty() {
            return Err(AddressError::InvalidFormat("payload cannot be empty".into()));
        }

        match protocol {
            Protocol::Id => {
                let id = rest
                    .parse::<u64>()
                    .map_err(|e| AddressError::InvalidFormat(e.to_string()))?;
                Ok(Self::new_id(id))
            }
            _ => {
                let payload = bs58::decode(rest)
                    .into_vec()
                    .map_err(|e| AddressError::InvalidBase58(e.to_string()))?;
                Self::from_parts(protocol, payload)
            }
        }
    }
}
