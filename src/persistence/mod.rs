//! Save/load of stored records
//!
//! Features:
//! - Versioned JSON envelope
//! - Migration of bare (pre-envelope) payloads
//! - Corruption detection: anything unreadable loads as "no data"

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::platform::KeyValueStore;

/// Current envelope format version
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    payload: T,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("record written by a newer format version ({found})")]
    UnsupportedVersion { found: u32 },
}

/// Wrap `payload` in a versioned envelope
pub fn encode<T: Serialize>(payload: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(&Envelope {
        version: FORMAT_VERSION,
        payload,
    })
}

/// Decode an envelope, falling back to a bare payload from before envelopes existed
pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, DecodeError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let is_envelope = value.get("version").is_some() && value.get("payload").is_some();
    if !is_envelope {
        return Ok(serde_json::from_value(value)?);
    }
    let envelope: Envelope<T> = serde_json::from_value(value)?;
    if envelope.version > FORMAT_VERSION {
        return Err(DecodeError::UnsupportedVersion {
            found: envelope.version,
        });
    }
    Ok(envelope.payload)
}

/// Read and decode `key`. Missing, unreadable or corrupt records all come back as `None`.
pub fn load<T, S>(store: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("Failed to read '{key}': {e}");
            return None;
        }
    };
    match decode(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Discarding '{key}': {e}");
            None
        }
    }
}

/// Encode and write `value` under `key`. Returns false if it could not be stored.
pub fn save<T, S>(store: &mut S, key: &str, value: &T) -> bool
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    let json = match encode(value) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("Failed to encode '{key}': {e}");
            return false;
        }
    };
    match store.set(key, &json) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Failed to write '{key}': {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    #[test]
    fn test_envelope_carries_version() {
        let json = encode(&vec![1u32, 2]).expect("encode");
        assert!(json.contains("\"version\":1"));
        assert_eq!(decode::<Vec<u32>>(&json).expect("decode"), vec![1, 2]);
    }

    #[test]
    fn test_bare_payload_migrates() {
        assert_eq!(decode::<Vec<u32>>("[3,1]").expect("decode"), vec![3, 1]);
    }

    #[test]
    fn test_newer_version_rejected() {
        let raw = r#"{"version":99,"payload":[1]}"#;
        assert!(matches!(
            decode::<Vec<u32>>(raw),
            Err(DecodeError::UnsupportedVersion { found: 99 })
        ));
    }

    #[test]
    fn test_corrupt_record_loads_as_none() {
        let mut store = MemoryStore::new();
        store.set("junk", "{not json").expect("set");
        assert_eq!(load::<Vec<u32>, _>(&store, "junk"), None);
        assert_eq!(load::<Vec<u32>, _>(&store, "absent"), None);

        assert!(save(&mut store, "good", &vec![7u32]));
        assert_eq!(load::<Vec<u32>, _>(&store, "good"), Some(vec![7]));
    }
}
