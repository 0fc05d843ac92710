//! sessiongate - session and permission management for marketplace clients
//!
//! The library issues access/refresh token pairs, persists them through a
//! [`storage::TokenStore`], and answers authentication and authorization
//! questions through a [`SessionGuard`]. Roles and capabilities are closed
//! enums checked against a static [`PermissionTable`].
//!
//! The default [`auth::UnsignedCodec`] is for local and demo use only;
//! [`auth::JwtCodec`] signs tokens behind the same [`auth::TokenCodec`]
//! contract.

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod storage;

pub use auth::{Capability, PermissionTable, Role, SessionGuard, TokenPayload};
pub use config::Config;
pub use error::Error;
