//! Configuration schema definitions

use crate::error::{Error, Result};
use crate::storage::DEFAULT_STORAGE_KEY;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Upper bound for any configured lifetime: one hundred years
pub const MAX_TTL_SECS: i64 = 100 * 365 * 24 * 60 * 60;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub codec: CodecConfig,

    /// Per-role capability overrides, e.g. `worker = ["tasks:browse"]`
    #[serde(default)]
    pub permissions: HashMap<String, Vec<String>>,
}

impl Config {
    /// Reject settings the session guard cannot work with
    pub fn validate(&self) -> Result<()> {
        let session = &self.session;
        if session.access_ttl_secs <= 0 {
            return Err(Error::Config(
                "session.access_ttl_secs must be positive".to_string(),
            ));
        }
        if session.refresh_ttl_secs <= 0 {
            return Err(Error::Config(
                "session.refresh_ttl_secs must be positive".to_string(),
            ));
        }
        if session.expiring_soon_secs < 0 {
            return Err(Error::Config(
                "session.expiring_soon_secs must not be negative".to_string(),
            ));
        }
        for (field, secs) in [
            ("session.access_ttl_secs", session.access_ttl_secs),
            ("session.refresh_ttl_secs", session.refresh_ttl_secs),
            ("session.expiring_soon_secs", session.expiring_soon_secs),
        ] {
            if secs > MAX_TTL_SECS {
                return Err(Error::Config(format!(
                    "{} must be at most {} seconds, got {}",
                    field, MAX_TTL_SECS, secs
                )));
            }
        }
        // Access tokens must be shorter-lived than the refresh tokens that renew them
        if session.access_ttl_secs >= session.refresh_ttl_secs {
            return Err(Error::Config(format!(
                "session.access_ttl_secs ({}) must be shorter than session.refresh_ttl_secs ({})",
                session.access_ttl_secs, session.refresh_ttl_secs
            )));
        }
        if self.storage.key.trim().is_empty() {
            return Err(Error::Config("storage.key must not be empty".to_string()));
        }
        if self.codec.kind == CodecKind::Jwt
            && self.codec.secret.as_deref().map_or(true, str::is_empty)
        {
            return Err(Error::Config(
                "codec.secret is required for the jwt codec".to_string(),
            ));
        }
        Ok(())
    }
}

/// Token lifetimes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_access_ttl_secs")]
    pub access_ttl_secs: i64,

    #[serde(default = "default_refresh_ttl_secs")]
    pub refresh_ttl_secs: i64,

    #[serde(default = "default_expiring_soon_secs")]
    pub expiring_soon_secs: i64,

    #[serde(default)]
    pub rotate_refresh_token: bool,
}

fn default_access_ttl_secs() -> i64 {
    15 * 60
}

fn default_refresh_ttl_secs() -> i64 {
    7 * 24 * 60 * 60
}

fn default_expiring_soon_secs() -> i64 {
    5 * 60
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            access_ttl_secs: default_access_ttl_secs(),
            refresh_ttl_secs: default_refresh_ttl_secs(),
            expiring_soon_secs: default_expiring_soon_secs(),
            rotate_refresh_token: false,
        }
    }
}

/// Where the token pair is persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageKind,

    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_storage_key")]
    pub key: String,
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("./.sessiongate")
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageKind::default(),
            dir: default_storage_dir(),
            key: default_storage_key(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    File,
    Memory,
}

/// Token encoding
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CodecConfig {
    #[serde(default)]
    pub kind: CodecKind,

    /// HMAC secret, required for `jwt`
    #[serde(default)]
    pub secret: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CodecKind {
    /// Unsigned development tokens
    #[default]
    Unsigned,
    /// HS256 JWT
    Jwt,
}
