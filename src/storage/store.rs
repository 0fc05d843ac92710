//! Persisted token pair

use crate::auth::TokenPair;
use crate::error::Result;
use crate::storage::StorageBackend;
use std::sync::Arc;

/// Default key the pair is stored under
pub const DEFAULT_STORAGE_KEY: &str = "sessiongate.session";

/// Owns the single persisted token pair.
///
/// Every call goes straight to the backend, so a `load` always observes the
/// most recent `save` or `clear` made through any handle.
#[derive(Clone)]
pub struct TokenStore {
    backend: Arc<dyn StorageBackend>,
    key: String,
}

impl TokenStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self::with_key(backend, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(backend: Arc<dyn StorageBackend>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Persist both tokens in one write
    pub fn save(&self, pair: &TokenPair) -> Result<()> {
        let bytes = serde_json::to_vec(pair)?;
        self.backend.write(&self.key, &bytes)?;
        tracing::debug!("Saved token pair under '{}'", self.key);
        Ok(())
    }

    /// The last saved pair, or `None` if absent or unreadable
    pub fn load(&self) -> Option<TokenPair> {
        let bytes = match self.backend.read(&self.key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Could not read session storage '{}': {}", self.key, e);
                return None;
            }
        };

        match serde_json::from_slice::<TokenPair>(&bytes) {
            Ok(pair) => Some(pair),
            Err(e) => {
                tracing::warn!("Ignoring corrupt session data under '{}': {}", self.key, e);
                None
            }
        }
    }

    /// Remove the persisted pair. Clearing an empty store succeeds.
    pub fn clear(&self) -> Result<()> {
        self.backend.remove(&self.key)?;
        tracing::debug!("Cleared token pair under '{}'", self.key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;

    fn pair(tag: &str) -> TokenPair {
        TokenPair {
            access_token: format!("access-{}", tag),
            refresh_token: format!("refresh-{}", tag),
        }
    }

    #[test]
    fn test_save_then_load() {
        let store = TokenStore::new(Arc::new(MemoryBackend::new()));
        assert_eq!(store.load(), None);

        store.save(&pair("a")).unwrap();
        assert_eq!(store.load(), Some(pair("a")));

        store.save(&pair("b")).unwrap();
        assert_eq!(store.load(), Some(pair("b")));
    }

    #[test]
    fn test_persisted_shape() {
        let backend = MemoryBackend::new();
        let store = TokenStore::new(Arc::new(backend.clone()));
        store.save(&pair("x")).unwrap();

        let raw = backend.read(DEFAULT_STORAGE_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(value["accessToken"], "access-x");
        assert_eq!(value["refreshToken"], "refresh-x");
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = TokenStore::new(Arc::new(MemoryBackend::new()));
        store.save(&pair("a")).unwrap();

        store.clear().unwrap();
        assert_eq!(store.load(), None);
        store.clear().unwrap();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_corrupt_data_reads_as_no_session() {
        let backend = MemoryBackend::new();
        let store = TokenStore::new(Arc::new(backend.clone()));

        let samples: [&[u8]; 4] = [b"\xff\xfe\x00garbage", b"{}", b"{\"accessToken\": 1}", b""];
        for garbage in samples {
            backend.write(DEFAULT_STORAGE_KEY, garbage).unwrap();
            assert_eq!(store.load(), None);
        }
    }
}
