//! Middleware specific storage.

use alloc::vec::Vec;

use super::BoxError;

/// Durable key-value store of data belonging to the router.
///
/// Keys are plain UTF-8 strings. Hosts are expected to hand out a store
/// dedicated to the router module, such that keys written here cannot
/// collide with those of other modules.
pub trait Store {
    /// Read some value from the store. Returns [`None`] if
    /// no value has been written under `key`.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, BoxError>;

    /// Write some value to the store, replacing any
    /// previous value under `key`.
    fn write(&mut self, key: &str, value: &[u8]) -> Result<(), BoxError>;

    /// Delete the value stored under `key`. Deleting a
    /// missing key is not an error.
    fn delete(&mut self, key: &str) -> Result<(), BoxError>;

    /// Check whether some value is stored under `key`.
    fn has(&self, key: &str) -> Result<bool, BoxError> {
        self.read(key).map(|value| value.is_some())
    }
}

impl<S: Store + ?Sized> Store for &mut S {
    #[inline]
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, BoxError> {
        (**self).read(key)
    }

    #[inline]
    fn write(&mut self, key: &str, value: &[u8]) -> Result<(), BoxError> {
        (**self).write(key, value)
    }

    #[inline]
    fn delete(&mut self, key: &str) -> Result<(), BoxError> {
        (**self).delete(key)
    }

    #[inline]
    fn has(&self, key: &str) -> Result<bool, BoxError> {
        (**self).has(key)
    }
}
