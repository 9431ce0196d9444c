//! Write-code persistence
//!
//! The write code is stored already in HTTP Basic form, `base64("<code>:")`,
//! so the delivery channel can put it straight into the `Authorization`
//! header. This is encoding, not encryption.

use super::{KeyValueStore, WRITE_CODE_KEY};
use crate::error::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Encode and persist the write code
pub fn save_write_code(store: &mut dyn KeyValueStore, write_code: &str) -> Result<()> {
    let encoded = STANDARD.encode(format!("{}:", write_code));
    store.set(WRITE_CODE_KEY, &encoded)
}

/// Read back the encoded write code
///
/// Blank values and the literal strings `null` / `undefined` left behind by
/// careless hosts count as absent, as does a storage read failure.
pub fn load_write_code(store: &dyn KeyValueStore) -> Option<String> {
    let raw = match store.get(WRITE_CODE_KEY) {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::debug!("Failed to read write code: {}", e);
            return None;
        }
    };

    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    let lower = value.to_ascii_lowercase();
    if lower == "null" || lower == "undefined" {
        return None;
    }

    Some(value.to_string())
}
