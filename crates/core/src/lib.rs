//! Core crate defining the storage contract of the swap router.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod memory;
pub mod store;

use alloc::boxed::Box;

/// Type erased error returned by [`store::Store`] implementations.
pub type BoxError = Box<dyn core::error::Error + Send + Sync>;
