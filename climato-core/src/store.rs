//! Persistent last-position store: three string values (latitude,
//! longitude, serialized address) read back only as a fallback when no
//! live position is available.

use crate::{error::StoreError, model::Address};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub mod file;

pub const KEY_LATITUDE: &str = "latitude";
pub const KEY_LONGITUDE: &str = "longitude";
pub const KEY_ADDRESS: &str = "address";

/// Version tag written with every cached address. Bump when the
/// [`Address`] shape changes so stale entries are invalidated instead of
/// silently misread.
pub const ADDRESS_SCHEMA_VERSION: u32 = 1;

/// Key/value store collaborator, mirroring the multi-get/multi-set
/// surface of device-local storage.
#[async_trait]
pub trait PositionStore: Send + Sync + Debug {
    async fn multi_get(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StoreError>;

    /// Writes all pairs together; best-effort atomicity.
    async fn multi_set(&self, pairs: &[(&str, String)]) -> Result<(), StoreError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedAddress {
    schema: u32,
    address: Address,
}

/// Serialize an address into its versioned cache envelope.
pub fn encode_address(address: &Address) -> Result<String, StoreError> {
    let envelope = CachedAddress { schema: ADDRESS_SCHEMA_VERSION, address: address.clone() };
    Ok(serde_json::to_string(&envelope)?)
}

/// Decode a cached envelope. A parse failure or schema mismatch yields
/// `None`: the entry is treated as absent, never misread.
pub fn decode_address(value: &str) -> Option<Address> {
    let envelope: CachedAddress = match serde_json::from_str(value) {
        Ok(env) => env,
        Err(err) => {
            tracing::warn!("discarding corrupt cached address: {err}");
            return None;
        }
    };

    if envelope.schema != ADDRESS_SCHEMA_VERSION {
        tracing::warn!(
            schema = envelope.schema,
            expected = ADDRESS_SCHEMA_VERSION,
            "discarding cached address with stale schema"
        );
        return None;
    }

    Some(envelope.address)
}

#[cfg(test)]
pub(crate) mod memory {
    use super::*;
    use std::{collections::BTreeMap, sync::Mutex};

    /// In-memory store double for flow tests.
    #[derive(Debug, Default)]
    pub struct MemoryStore {
        entries: Mutex<BTreeMap<String, String>>,
    }

    impl MemoryStore {
        pub fn seeded(pairs: &[(&str, String)]) -> Self {
            let store = Self::default();
            {
                let mut entries = store.entries.lock().unwrap();
                for (key, value) in pairs {
                    entries.insert((*key).to_string(), value.clone());
                }
            }
            store
        }

        pub fn snapshot(&self) -> BTreeMap<String, String> {
            self.entries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PositionStore for MemoryStore {
        async fn multi_get(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StoreError> {
            let entries = self.entries.lock().unwrap();
            Ok(keys.iter().map(|key| entries.get(*key).cloned()).collect())
        }

        async fn multi_set(&self, pairs: &[(&str, String)]) -> Result<(), StoreError> {
            let mut entries = self.entries.lock().unwrap();
            for (key, value) in pairs {
                entries.insert((*key).to_string(), value.clone());
            }
            Ok(())
        }
    }
}
