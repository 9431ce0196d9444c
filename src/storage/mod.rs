//! Persistent key-value storage
//!
//! The recorder persists three plain string values across page loads:
//!
//! - [`SESSION_ID_KEY`] - the current session id
//! - [`LAST_ACTIVE_KEY`] - last user interaction, epoch milliseconds
//! - [`WRITE_CODE_KEY`] - the encoded collector credential
//!
//! Absence of any key means "unset", never an error. The two session keys are
//! written independently, so readers must tolerate one without the other.
//!
//! # Implementations
//!
//! - [`MemoryStore`] - shared in-process map (tests, embedded hosts)
//! - [`FileStore`] - JSON file in the platform data directory

pub mod credential;
pub mod file;
pub mod memory;

pub use credential::{load_write_code, save_write_code};
pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::Result;

/// Key holding the current session id
pub const SESSION_ID_KEY: &str = "userlensSessionUuid";

/// Key holding the last interaction timestamp (epoch ms, decimal string)
pub const LAST_ACTIVE_KEY: &str = "userlensSessionLastActive";

/// Key holding the encoded write code
pub const WRITE_CODE_KEY: &str = "$ul_WRITE_CODE";

/// Scratch key used to check that storage actually accepts writes
pub const PROBE_KEY: &str = "__userlens_test__";

/// String key-value store that survives restarts of the host
pub trait KeyValueStore: Send {
    /// Read a value; `Ok(None)` when the key is unset
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove a value; removing an unset key is not an error
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Check that the store is usable by writing and removing a scratch key
///
/// Storage can exist yet reject writes (quota, privacy modes), so presence
/// alone is not enough.
pub fn probe(store: &mut dyn KeyValueStore) -> Result<()> {
    store.set(PROBE_KEY, "1")?;
    store.remove(PROBE_KEY)
}
