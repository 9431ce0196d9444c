//! Upload payload encoding
//!
//! The collector expects the chunk as base64 text of a gzip-compressed JSON
//! document, so no event content is readable in transit logs.

use crate::error::{RecorderError, Result};
use crate::types::CapturedEvent;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use std::io::{Read, Write};

/// JSON document posted for one chunk
#[derive(Debug, Serialize)]
pub struct UploadBody<'a> {
    #[serde(rename = "userId")]
    pub user_id: &'a str,
    pub chunk_timestamp: i64,
    pub events: &'a [CapturedEvent],
}

/// Serialize, gzip and base64-encode a body
pub fn encode_payload(body: &UploadBody<'_>) -> Result<String> {
    let json = serde_json::to_vec(body)?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    let compressed = encoder.finish()?;

    Ok(STANDARD.encode(compressed))
}

/// Reverse of [`encode_payload`], for inspection tooling and tests
pub fn decode_payload(encoded: &str) -> Result<serde_json::Value> {
    let compressed = STANDARD
        .decode(encoded.trim())
        .map_err(|e| RecorderError::Serialization(format!("invalid base64 payload: {}", e)))?;

    let mut json = Vec::new();
    GzDecoder::new(compressed.as_slice()).read_to_end(&mut json)?;

    Ok(serde_json::from_slice(&json)?)
}
