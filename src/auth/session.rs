//! Session guard: identity plus authorization over the persisted token pair

use crate::auth::clock::{Clock, SystemClock};
use crate::auth::codec::{TokenCodec, UnsignedCodec};
use crate::auth::jwt::JwtCodec;
use crate::auth::models::{Capability, Role, SessionState, TokenPair, TokenPayload};
use crate::auth::permissions::PermissionTable;
use crate::config::{CodecKind, Config, SessionConfig, StorageKind};
use crate::error::{Error, Result};
use crate::storage::{FileBackend, MemoryBackend, StorageBackend, TokenStore};
use chrono::Duration;
use std::sync::{Arc, Mutex};

/// Token lifetimes and refresh behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Lifetime of access tokens
    pub access_ttl: Duration,
    /// Lifetime of refresh tokens
    pub refresh_ttl: Duration,
    /// Remaining lifetime at which an access token counts as expiring soon
    pub expiring_soon_window: Duration,
    /// Mint a new refresh token on every refresh instead of keeping the old one
    pub rotate_refresh_token: bool,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(7),
            expiring_soon_window: Duration::minutes(5),
            rotate_refresh_token: false,
        }
    }
}

impl TryFrom<&SessionConfig> for SessionPolicy {
    type Error = Error;

    fn try_from(config: &SessionConfig) -> Result<Self> {
        Ok(Self {
            access_ttl: seconds("session.access_ttl_secs", config.access_ttl_secs)?,
            refresh_ttl: seconds("session.refresh_ttl_secs", config.refresh_ttl_secs)?,
            expiring_soon_window: seconds("session.expiring_soon_secs", config.expiring_soon_secs)?,
            rotate_refresh_token: config.rotate_refresh_token,
        })
    }
}

fn seconds(field: &str, secs: i64) -> Result<Duration> {
    Duration::try_seconds(secs)
        .ok_or_else(|| Error::Config(format!("{} is out of range: {}", field, secs)))
}

/// Answers "who is calling" and "may they do this".
///
/// Nothing is cached between calls: each check reloads the pair from the
/// store and compares against the clock. Refreshes are serialized so that
/// two callers never race to overwrite the store with different pairs.
pub struct SessionGuard {
    store: TokenStore,
    codec: Arc<dyn TokenCodec>,
    clock: Arc<dyn Clock>,
    permissions: PermissionTable,
    policy: SessionPolicy,
    refresh_lock: Mutex<()>,
}

impl SessionGuard {
    /// Guard with the standard permission table and default policy
    pub fn new(store: TokenStore, codec: Arc<dyn TokenCodec>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            codec,
            clock,
            permissions: PermissionTable::standard(),
            policy: SessionPolicy::default(),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Wire up storage, codec, policy and permissions from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let backend: Arc<dyn StorageBackend> = match config.storage.backend {
            StorageKind::File => Arc::new(FileBackend::new(config.storage.dir.clone())?),
            StorageKind::Memory => Arc::new(MemoryBackend::new()),
        };
        let codec: Arc<dyn TokenCodec> = match config.codec.kind {
            CodecKind::Unsigned => {
                tracing::warn!("Using unsigned session tokens; do not use outside development");
                Arc::new(UnsignedCodec::new())
            }
            CodecKind::Jwt => {
                let secret = config.codec.secret.as_deref().unwrap_or_default();
                Arc::new(JwtCodec::new(secret.as_bytes())?)
            }
        };

        let store = TokenStore::with_key(backend, config.storage.key.clone());
        Ok(Self::new(store, codec, Arc::new(SystemClock))
            .with_permissions(PermissionTable::from_overrides(&config.permissions)?)
            .with_policy(SessionPolicy::try_from(&config.session)?))
    }

    pub fn with_permissions(mut self, permissions: PermissionTable) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn with_policy(mut self, policy: SessionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn permissions(&self) -> &PermissionTable {
        &self.permissions
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    pub fn codec(&self) -> &dyn TokenCodec {
        self.codec.as_ref()
    }

    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Mint and persist a fresh pair for `subject`, replacing any existing session
    pub fn login(&self, subject: &str, role: Role) -> Result<TokenPair> {
        let now = self.clock.now();
        let access = TokenPayload::issue(subject, role, now, self.policy.access_ttl)?;
        let refresh = TokenPayload::issue(subject, role, now, self.policy.refresh_ttl)?;

        let pair = TokenPair {
            access_token: self.codec.encode(&access)?,
            refresh_token: self.codec.encode(&refresh)?,
        };
        self.store.save(&pair)?;

        tracing::info!("Session started for {} ({})", subject, role);
        Ok(pair)
    }

    /// Drop the persisted session
    pub fn logout(&self) -> Result<()> {
        self.store.clear()?;
        tracing::info!("Session cleared");
        Ok(())
    }

    /// The current session, refreshing transparently if only the access token expired
    pub fn require_session(&self) -> Result<TokenPayload> {
        let pair = self.store.load().ok_or(Error::Unauthenticated)?;
        if let Some(payload) = self.codec.verify(&pair.access_token, self.clock.now()) {
            return Ok(payload);
        }

        let _guard = self.refresh_lock.lock().map_err(|_| Error::LockPoisoned)?;

        // Another caller may have refreshed while we waited for the lock
        if let Some(payload) = self.valid_access() {
            return Ok(payload);
        }

        match self.refresh_locked() {
            Ok(pair) => self
                .codec
                .decode(&pair.access_token)
                .ok_or(Error::Unauthenticated),
            Err(Error::Unauthenticated) => {
                self.end_expired_session();
                Err(Error::Unauthenticated)
            }
            Err(e) => Err(e),
        }
    }

    /// The current session, if it grants `capability`
    pub fn require_capability(&self, capability: Capability) -> Result<TokenPayload> {
        let payload = self.require_session()?;
        if self.permissions.has_capability(payload.role, capability) {
            Ok(payload)
        } else {
            tracing::debug!(
                "Denied {} to {} ({})",
                capability,
                payload.subject,
                payload.role
            );
            Err(Error::Forbidden {
                capability: capability.to_string(),
            })
        }
    }

    /// Like [`SessionGuard::require_session`], but `None` instead of an error
    pub fn current_session(&self) -> Option<TokenPayload> {
        match self.require_session() {
            Ok(payload) => Some(payload),
            Err(e) if e.is_gate_failure() => None,
            Err(e) => {
                tracing::warn!("Session check failed: {}", e);
                None
            }
        }
    }

    /// Mint a new access token from a still-valid refresh token and persist the pair
    pub fn refresh(&self) -> Result<TokenPair> {
        let _guard = self.refresh_lock.lock().map_err(|_| Error::LockPoisoned)?;
        self.refresh_locked()
    }

    /// Refresh ahead of time when the access token is inside the policy window
    pub fn ensure_fresh(&self) -> Result<TokenPayload> {
        let payload = self.require_session()?;
        if !payload.is_expiring_soon(self.clock.now(), self.policy.expiring_soon_window) {
            return Ok(payload);
        }

        match self.refresh() {
            Ok(pair) => self
                .codec
                .decode(&pair.access_token)
                .ok_or(Error::Unauthenticated),
            // refresh token is gone but the access token still holds
            Err(Error::Unauthenticated) => Ok(payload),
            Err(e) => Err(e),
        }
    }

    /// True if `token` has at most `window` left. Undecodable tokens count as expiring.
    pub fn is_expiring_soon(&self, token: &str, window: Duration) -> bool {
        match self.codec.decode(token) {
            Some(payload) => payload.is_expiring_soon(self.clock.now(), window),
            None => true,
        }
    }

    /// Classify the persisted pair without refreshing or clearing anything
    pub fn state(&self) -> SessionState {
        let Some(pair) = self.store.load() else {
            return SessionState::NoSession;
        };
        let now = self.clock.now();

        if let Some(access) = self.codec.verify(&pair.access_token, now) {
            if access.is_expiring_soon(now, self.policy.expiring_soon_window) {
                return SessionState::ExpiringSoon;
            }
            return SessionState::Active;
        }

        if self.codec.verify(&pair.refresh_token, now).is_some() {
            SessionState::Expired
        } else {
            SessionState::NoSession
        }
    }

    fn valid_access(&self) -> Option<TokenPayload> {
        let pair = self.store.load()?;
        self.codec.verify(&pair.access_token, self.clock.now())
    }

    /// Caller must hold `refresh_lock`
    fn refresh_locked(&self) -> Result<TokenPair> {
        let pair = self.store.load().ok_or(Error::Unauthenticated)?;
        let now = self.clock.now();
        let refresh = self
            .codec
            .verify(&pair.refresh_token, now)
            .ok_or(Error::Unauthenticated)?;

        let previous = self.codec.decode(&pair.access_token);
        if let Some(previous) = &previous {
            if previous.subject != refresh.subject || previous.role != refresh.role {
                tracing::warn!("Stored tokens disagree on identity, refusing to refresh");
                return Err(Error::Unauthenticated);
            }
        }

        let mut access = TokenPayload::issue(
            refresh.subject.clone(),
            refresh.role,
            now,
            self.policy.access_ttl,
        )?;
        if let Some(previous) = &previous {
            // Move past the previous expiry within the same second, but never
            // by more than one second over a full access lifetime
            let ceiling = access.expires_at.saturating_add(1);
            let bumped = previous.expires_at.saturating_add(1).min(ceiling);
            access.expires_at = access.expires_at.max(bumped);
        }
        // An access token never outlives the refresh token that minted it
        access.expires_at = access.expires_at.min(refresh.expires_at);

        let refresh_token = if self.policy.rotate_refresh_token {
            let rotated = TokenPayload::issue(
                refresh.subject.clone(),
                refresh.role,
                now,
                self.policy.refresh_ttl,
            )?;
            self.codec.encode(&rotated)?
        } else {
            pair.refresh_token
        };

        let new_pair = TokenPair {
            access_token: self.codec.encode(&access)?,
            refresh_token,
        };
        self.store.save(&new_pair)?;

        tracing::debug!(
            "Refreshed access token for {} until {}",
            access.subject,
            access.expires_at
        );
        Ok(new_pair)
    }

    fn end_expired_session(&self) {
        tracing::info!("Session expired, clearing stored tokens");
        if let Err(e) = self.store.clear() {
            tracing::warn!("Failed to clear expired session: {}", e);
        }
    }
}
