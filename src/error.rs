//! Error types for sessiongate

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No valid session")]
    Unauthenticated,

    #[error("Session lacks capability '{capability}'")]
    Forbidden { capability: String },

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown capability: {0}")]
    UnknownCapability(String),

    #[error("Invalid token payload: {0}")]
    InvalidPayload(String),

    #[error("Session lock poisoned")]
    LockPoisoned,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file not found. Run 'sessiongate init' first.")]
    ConfigNotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Message safe to show at a UI boundary.
    ///
    /// Gate failures map to a login or permission prompt; anything else is
    /// reported generically so internal details never leak to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Error::Unauthenticated => "Please log in",
            Error::Forbidden { .. } => "Not permitted",
            _ => "Something went wrong, please try again",
        }
    }

    /// Whether this error is one of the two session gate outcomes
    pub fn is_gate_failure(&self) -> bool {
        matches!(self, Error::Unauthenticated | Error::Forbidden { .. })
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_hide_internals() {
        assert_eq!(Error::Unauthenticated.user_message(), "Please log in");
        let forbidden = Error::Forbidden {
            capability: "route:/admin".to_string(),
        };
        assert_eq!(forbidden.user_message(), "Not permitted");

        let io = Error::Io(std::io::Error::other("disk on fire"));
        assert!(!io.user_message().contains("disk"));
        assert!(!io.is_gate_failure());
    }
}
