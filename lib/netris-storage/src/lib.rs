//! Cached view of the Netris inventory
//!
//! This library provides:
//! - `Snapshot`, an immutable copy of every Netris collection the operator reads
//! - `Storage`, which swaps in a fresh snapshot on every refresh

pub mod error;
pub mod snapshot;
pub mod storage;

pub use error::{Result, StorageError};
pub use snapshot::Snapshot;
pub use storage::Storage;
