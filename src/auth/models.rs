//! Session models: roles, capabilities, token payloads and pairs

use crate::error::{Error, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Marketplace roles. A session carries exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Seller - lists services and approves orders
    Seller,
    /// Worker - claims and submits tasks
    Worker,
    /// Administrator - full access
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Seller, Role::Worker, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Seller => "seller",
            Role::Worker => "worker",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "seller" => Ok(Role::Seller),
            "worker" => Ok(Role::Worker),
            "admin" => Ok(Role::Admin),
            _ => Err(Error::UnknownRole(s.to_string())),
        }
    }
}

/// Atomic permissions checked against a role
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Capability {
    #[serde(rename = "route:/seller")]
    SellerRoutes,
    #[serde(rename = "route:/worker")]
    WorkerRoutes,
    #[serde(rename = "route:/admin")]
    AdminRoutes,
    #[serde(rename = "route:/profile")]
    ProfileRoutes,
    #[serde(rename = "services:browse")]
    BrowseServices,
    #[serde(rename = "services:manage")]
    ManageServices,
    #[serde(rename = "orders:create")]
    CreateOrders,
    #[serde(rename = "orders:view")]
    ViewOrders,
    #[serde(rename = "orders:approve")]
    ApproveOrders,
    #[serde(rename = "tasks:browse")]
    BrowseTasks,
    #[serde(rename = "tasks:claim")]
    ClaimTasks,
    #[serde(rename = "tasks:submit")]
    SubmitTasks,
    #[serde(rename = "wallet:view")]
    ViewWallet,
    #[serde(rename = "wallet:withdraw")]
    WithdrawWallet,
    #[serde(rename = "users:manage")]
    ManageUsers,
    #[serde(rename = "analytics:view")]
    ViewAnalytics,
    #[serde(rename = "settings:manage")]
    ManageSettings,
}

impl Capability {
    pub const ALL: [Capability; 17] = [
        Capability::SellerRoutes,
        Capability::WorkerRoutes,
        Capability::AdminRoutes,
        Capability::ProfileRoutes,
        Capability::BrowseServices,
        Capability::ManageServices,
        Capability::CreateOrders,
        Capability::ViewOrders,
        Capability::ApproveOrders,
        Capability::BrowseTasks,
        Capability::ClaimTasks,
        Capability::SubmitTasks,
        Capability::ViewWallet,
        Capability::WithdrawWallet,
        Capability::ManageUsers,
        Capability::ViewAnalytics,
        Capability::ManageSettings,
    ];

    /// Canonical string form, e.g. `orders:approve`
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::SellerRoutes => "route:/seller",
            Capability::WorkerRoutes => "route:/worker",
            Capability::AdminRoutes => "route:/admin",
            Capability::ProfileRoutes => "route:/profile",
            Capability::BrowseServices => "services:browse",
            Capability::ManageServices => "services:manage",
            Capability::CreateOrders => "orders:create",
            Capability::ViewOrders => "orders:view",
            Capability::ApproveOrders => "orders:approve",
            Capability::BrowseTasks => "tasks:browse",
            Capability::ClaimTasks => "tasks:claim",
            Capability::SubmitTasks => "tasks:submit",
            Capability::ViewWallet => "wallet:view",
            Capability::WithdrawWallet => "wallet:withdraw",
            Capability::ManageUsers => "users:manage",
            Capability::ViewAnalytics => "analytics:view",
            Capability::ManageSettings => "settings:manage",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Capability {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Capability::ALL
            .iter()
            .copied()
            .find(|cap| cap.as_str() == wanted)
            .ok_or_else(|| Error::UnknownCapability(s.to_string()))
    }
}

/// Decoded contents of a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Subject (user ID)
    #[serde(rename = "sub")]
    pub subject: String,
    /// Role of the session
    pub role: Role,
    /// Issued at, seconds since epoch
    #[serde(rename = "iat")]
    pub issued_at: i64,
    /// Expiration, seconds since epoch
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl TokenPayload {
    /// Create a payload valid for `ttl` starting at `issued_at`
    pub fn issue(
        subject: impl Into<String>,
        role: Role,
        issued_at: i64,
        ttl: Duration,
    ) -> Result<Self> {
        let subject = subject.into();
        if subject.trim().is_empty() {
            return Err(Error::InvalidPayload(
                "subject must not be empty".to_string(),
            ));
        }
        if ttl <= Duration::zero() {
            return Err(Error::InvalidPayload(format!(
                "lifetime must be positive, got {}s",
                ttl.num_seconds()
            )));
        }

        Ok(Self {
            subject,
            role,
            issued_at,
            expires_at: issued_at.saturating_add(ttl.num_seconds()),
        })
    }

    /// Non-empty subject and `expires_at > issued_at`
    pub fn is_well_formed(&self) -> bool {
        !self.subject.trim().is_empty() && self.expires_at > self.issued_at
    }

    /// Check if the token is expired at `now`
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at <= now
    }

    /// Seconds left before expiry; negative once expired
    pub fn remaining_secs(&self, now: i64) -> i64 {
        self.expires_at.saturating_sub(now)
    }

    /// True when `expires_at - now <= window`
    pub fn is_expiring_soon(&self, now: i64, window: Duration) -> bool {
        self.remaining_secs(now) <= window.num_seconds()
    }
}

/// Encoded access and refresh tokens, persisted together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Derived state of the persisted session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NoSession,
    Active,
    ExpiringSoon,
    Expired,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::NoSession => write!(f, "no session"),
            SessionState::Active => write!(f, "active"),
            SessionState::ExpiringSoon => write!(f, "expiring soon"),
            SessionState::Expired => write!(f, "expired"),
        }
    }
}
