//! In-memory [`Store`] implementation.

use alloc::borrow::ToOwned;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use super::BoxError;
use crate::store::Store;

/// [`Store`] backed by a [`BTreeMap`]. Useful for tests,
/// and for hosts that persist the map themselves at the
/// end of a block.
#[derive(Default, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemoryStore {
    pub btreemap: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub const fn new() -> Self {
        Self {
            btreemap: BTreeMap::new(),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.btreemap.len()
    }

    /// Check if the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.btreemap.is_empty()
    }
}

impl Store for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, BoxError> {
        Ok(self.btreemap.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &[u8]) -> Result<(), BoxError> {
        self.btreemap.insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), BoxError> {
        self.btreemap.remove(key);
        Ok(())
    }

    fn has(&self, key: &str) -> Result<bool, BoxError> {
        Ok(self.btreemap.contains_key(key))
    }
}
