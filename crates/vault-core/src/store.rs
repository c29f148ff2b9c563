//! # Token Store
//!
//! Single-slot durable persistence for the `CardToken`. At most one token
//! exists at a time; saving overwrites, loading a missing or corrupt slot
//! yields `None`, and clearing is idempotent. All operations are fail-soft:
//! storage trouble surfaces as a result, never a panic.
//!
//! The store is always injected (no ambient singleton): `MemoryTokenStore`
//! for tests and ephemeral use, `FileTokenStore` as the durable
//! browser-local-storage analogue for a native client.

use crate::card::CardToken;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;

/// Errors from the persistence layer. Callers must treat a save failure as
/// "token not guaranteed persisted" and not assume a later load returns it.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Candidate lacked an opaque token; partial tokens are never persisted
    #[error("candidate token is not persistable: {0}")]
    InvalidCandidate(&'static str),

    /// The backing store could not complete the operation
    /// (quota exceeded, disabled storage, I/O failure)
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Single-slot key-value persistence for exactly one `CardToken`
pub trait TokenStore: Send + Sync {
    /// Persist the candidate, atomically overwriting any existing slot
    /// value. Rejects candidates without an opaque token.
    fn save(&self, candidate: &CardToken) -> Result<(), StorageError>;

    /// The current token, or `None` if the slot is empty or the persisted
    /// value fails structural validation. Never returns a corrupted
    /// partial value.
    fn load(&self) -> Option<CardToken>;

    /// Remove the slot unconditionally. Clearing an empty slot is not an
    /// error.
    fn clear(&self) -> Result<(), StorageError>;
}

fn check_candidate(candidate: &CardToken) -> Result<(), StorageError> {
    if !candidate.is_persistable() {
        return Err(StorageError::InvalidCandidate("opaque token is empty"));
    }
    Ok(())
}

/// In-memory single-slot store
#[derive(Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<CardToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn save(&self, candidate: &CardToken) -> Result<(), StorageError> {
        check_candidate(candidate)?;
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| StorageError::Unavailable("store lock poisoned".into()))?;
        *slot = Some(candidate.clone());
        Ok(())
    }

    fn load(&self) -> Option<CardToken> {
        self.slot.lock().ok()?.clone()
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| StorageError::Unavailable("store lock poisoned".into()))?;
        *slot = None;
        Ok(())
    }
}

/// File-backed single-slot store: one JSON file holding the serialized
/// token. Writes go through a temp file and rename so a later load never
/// observes a torn value.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn save(&self, candidate: &CardToken) -> Result<(), StorageError> {
        check_candidate(candidate)?;
        let bytes = serde_json::to_vec_pretty(candidate)
            .map_err(|e| StorageError::Unavailable(format!("serialize: {e}")))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| StorageError::Unavailable(format!("mkdir: {e}")))?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &bytes).map_err(|e| StorageError::Unavailable(format!("write: {e}")))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| StorageError::Unavailable(format!("rename: {e}")))?;
        Ok(())
    }

    fn load(&self) -> Option<CardToken> {
        let bytes = fs::read(&self.path).ok()?;
        let token: CardToken = serde_json::from_slice(&bytes).ok()?;
        // a persisted value that fails structural validation reads as empty
        if !token.is_persistable() {
            return None;
        }
        Some(token)
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Unavailable(format!("remove: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Expiry;

    fn sample_token(blob: &str) -> CardToken {
        CardToken::new(
            blob,
            "4111111111111111",
            "TEST USER",
            Expiry::parse("12/25").unwrap(),
            "cust-1",
        )
    }

    fn scratch_path() -> PathBuf {
        std::env::temp_dir().join(format!("cardvault-test-{}.json", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_memory_save_load_round_trip() {
        let store = MemoryTokenStore::new();
        let token = sample_token("blob-1");
        store.save(&token).unwrap();
        assert_eq!(store.load().unwrap(), token);
    }

    #[test]
    fn test_memory_save_replaces() {
        let store = MemoryTokenStore::new();
        store.save(&sample_token("first")).unwrap();
        store.save(&sample_token("second")).unwrap();
        assert_eq!(store.load().unwrap().token, "second");
    }

    #[test]
    fn test_memory_clear_is_idempotent() {
        let store = MemoryTokenStore::new();
        store.save(&sample_token("blob")).unwrap();
        store.clear().unwrap();
        assert!(store.load().is_none());
        // clearing an already-empty slot is fine
        store.clear().unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_rejects_empty_token() {
        let store = MemoryTokenStore::new();
        let mut token = sample_token("blob");
        token.token = "   ".into();
        assert!(matches!(
            store.save(&token),
            Err(StorageError::InvalidCandidate(_))
        ));
        assert!(store.load().is_none());
    }

    #[test]
    fn test_file_save_load_clear() {
        let path = scratch_path();
        let store = FileTokenStore::new(&path);
        let token = sample_token("blob-file");

        store.save(&token).unwrap();
        assert_eq!(store.load().unwrap(), token);

        store.clear().unwrap();
        assert!(store.load().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_file_corrupt_slot_reads_as_none() {
        let path = scratch_path();
        fs::write(&path, b"{not json at all").unwrap();
        let store = FileTokenStore::new(&path);
        assert!(store.load().is_none());

        // structurally valid JSON with an empty blob is also "no token"
        fs::write(
            &path,
            serde_json::to_vec(&{
                let mut t = sample_token("x");
                t.token = String::new();
                t
            })
            .unwrap(),
        )
        .unwrap();
        assert!(store.load().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_file_missing_slot_reads_as_none() {
        let store = FileTokenStore::new(scratch_path());
        assert!(store.load().is_none());
    }
}
