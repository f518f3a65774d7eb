//! Durable token persistence.
//!
//! The session keeps two strings, `access_token` and `refresh_token`, that
//! must survive a restart. Storage is a plain key/value seam so the session
//! core never cares whether the bytes end up in a file or in memory.

pub mod file;
pub mod memory;
pub mod paths;

pub use file::FileTokenStorage;
pub use memory::MemoryTokenStorage;
pub use paths::{DataPaths, PathSource, detect_data_paths};

use crate::error::StorageError;

/// Key/value store for session tokens.
///
/// Implementations must be cheap to call from async code: the session calls
/// them while holding its state lock, so they must not block on the network.
pub trait TokenStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
