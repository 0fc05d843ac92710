//! Authentication and session management

pub mod clock;
pub mod codec;
pub mod jwt;
pub mod models;
pub mod permissions;
pub mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::{TokenCodec, UnsignedCodec};
pub use jwt::JwtCodec;
pub use models::{Capability, Role, SessionState, TokenPair, TokenPayload};
pub use permissions::PermissionTable;
pub use session::{SessionGuard, SessionPolicy};
