// ChannelStore - Persistent channel records using sled
//
// One record per channel address, postcard-encoded, inside a namespaced tree.
// Mutations are optimistic compare-and-swap loops on a single key, so writers
// to different channels never contend and writers to the same channel are
// serialized without a lock.

use crate::identity::Address;
use crate::paych::ChannelInfo;
use std::path::Path;
use thiserror::Error;

/// Namespace of channel records inside the database
pub const PAYMENT_CHANNEL_STORE_PREFIX: &str = "/retrievaldeals/paymentchannel";

/// Errors from storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No channel record for {0}")]
    NotFound(Address),

    #[error("Channel record already exists for {0}")]
    AlreadyExists(Address),

    #[error("Failed to open database: {0}")]
    OpenFailed(String),

    #[error("Database operation failed: {0}")]
    DatabaseError(String),

    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        StoreError::DatabaseError(err.to_string())
    }
}

/// Keyed store of channel records.
///
/// Cloning is cheap and clones share the same underlying tree.
#[derive(Clone)]
pub struct ChannelStore {
    db: sled::Db,
    tree: sled::Tree,
}

impl ChannelStore {
    /// Open or create a store at the given path
    pub fn open<P: AsRef<Path>>(path: P, namespace: &str) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(|e| StoreError::OpenFailed(e.to_string()))?;
        Self::with_db(db, namespace)
    }

    /// In-memory store removed when dropped
    pub fn temporary(namespace: &str) -> Result<Self, StoreError> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(|e| StoreError::OpenFailed(e.to_string()))?;
        Self::with_db(db, namespace)
    }

    /// Use a namespace of an already open database
    pub fn with_db(db: sled::Db, namespace: &str) -> Result<Self, StoreError> {
        let tree = db.open_tree(namespace)?;
        Ok(Self { db, tree })
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Current record for a channel
    pub fn get(&self, addr: &Address) -> Result<ChannelInfo, StoreError> {
        match self.tree.get(addr.to_bytes())? {
            Some(bytes) => decode(&bytes),
            None => Err(StoreError::NotFound(addr.clone())),
        }
    }

    pub fn has(&self, addr: &Address) -> Result<bool, StoreError> {
        Ok(self.tree.contains_key(addr.to_bytes())?)
    }

    /// Snapshot of every record, in key order
    pub fn list(&self) -> Result<Vec<ChannelInfo>, StoreError> {
        let mut infos = Vec::with_capacity(self.tree.len());
        for value in self.tree.iter().values() {
            infos.push(decode(&value?)?);
        }
        Ok(infos)
    }

    /// Insert the first record for a channel; fails if one is already present
    pub fn begin(&self, addr: &Address, initial: &ChannelInfo) -> Result<(), StoreError> {
        let bytes = encode(initial)?;
        self.tree
            .compare_and_swap(addr.to_bytes(), None as Option<&[u8]>, Some(bytes))?
            .map_err(|_| StoreError::AlreadyExists(addr.clone()))
    }

    /// Atomically read, modify and persist a record.
    ///
    /// `f` may run more than once if another writer updates the same record
    /// concurrently; only the run whose result is persisted is returned. An
    /// error from `f` leaves the record untouched.
    pub fn mutate<T, E, F>(&self, addr: &Address, mut f: F) -> Result<T, E>
    where
        F: FnMut(&mut ChannelInfo) -> Result<T, E>,
        E: From<StoreError>,
    {
        let key = addr.to_bytes();
        loop {
            let current = self
                .tree
                .get(&key)
                .map_err(StoreError::from)?
                .ok_or_else(|| StoreError::NotFound(addr.clone()))?;

            let mut info = decode(&current)?;
            let out = f(&mut info)?;
            let updated = encode(&info)?;

            let swapped = self
                .tree
                .compare_and_swap(&key, Some(&current), Some(updated))
                .map_err(StoreError::from)?;
            if swapped.is_ok() {
                return Ok(out);
            }
            tracing::trace!(channel = %addr, "concurrent update, retrying mutation");
        }
    }
}

fn encode(info: &ChannelInfo) -> Result<Vec<u8>, StoreError> {
    postcard::to_allocvec(info).map_err(|e| StoreError::SerializationFailed(e.to_string()))
}

fn decode(bytes: &[u8]) -> Result<ChannelInfo, StoreError> {
    postcard::from_bytes(bytes).map_err(|e| StoreError::DeserializationFailed(e.to_string()))
}
