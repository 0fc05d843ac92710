//! Configuration loading and environment variable interpolation

use crate::error::{Error, Result};
use regex::Regex;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::Config;

pub const CONFIG_FILENAME: &str = "sessiongate.toml";

/// Load configuration from sessiongate.toml
pub fn load_config() -> Result<Config> {
    let config_path = find_config_file()?;
    load_config_from_path(&config_path)
}

/// Load sessiongate.toml if one exists, otherwise fall back to defaults
pub fn load_config_or_default() -> Result<Config> {
    match load_config() {
        Ok(config) => Ok(config),
        Err(Error::ConfigNotFound) => {
            tracing::debug!("No {} found, using defaults", CONFIG_FILENAME);
            Ok(Config::default())
        }
        Err(e) => Err(e),
    }
}

/// Load configuration from a specific path
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|_| Error::ConfigNotFound)?;
    parse_config(&content)
}

/// Parse configuration text, interpolating environment variables first
pub fn parse_config(content: &str) -> Result<Config> {
    let content = interpolate_env_vars(content);
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Find the configuration file, searching upward from current directory
fn find_config_file() -> Result<PathBuf> {
    let mut current = env::current_dir().map_err(|e| Error::Config(e.to_string()))?;

    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Ok(config_path);
        }

        if !current.pop() {
            return Err(Error::ConfigNotFound);
        }
    }
}

/// Interpolate environment variables in the format ${VAR_NAME} or ${VAR_NAME:-default}
fn interpolate_env_vars(content: &str) -> String {
    // This regex is a compile-time constant, panicking is acceptable here
    // as it indicates a programming error in the codebase, not a runtime issue
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
        .expect("Invalid regex pattern - this is a bug in the codebase");

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        env::var(var_name).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}

/// Generate a default configuration file content
pub fn default_config_content() -> &'static str {
    r#"# sessiongate configuration

[session]
access_ttl_secs = 900         # 15 minutes
refresh_ttl_secs = 604800     # 7 days
expiring_soon_secs = 300      # refresh proactively in the last 5 minutes
rotate_refresh_token = false

[storage]
backend = "file"              # or "memory"
dir = "./.sessiongate"
key = "sessiongate.session"

[codec]
kind = "unsigned"             # development only; use "jwt" with a secret otherwise
# kind = "jwt"
# secret = "${SESSIONGATE_SECRET}"

# Replace a role's capabilities wholesale
# [permissions]
# worker = ["route:/worker", "route:/profile", "tasks:browse", "tasks:claim", "tasks:submit"]
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CodecKind, StorageKind};

    #[test]
    fn test_env_interpolation() {
        env::set_var("SESSIONGATE_TEST_VAR", "hello");
        let content = "value = \"${SESSIONGATE_TEST_VAR}\"";
        let result = interpolate_env_vars(content);
        assert_eq!(result, "value = \"hello\"");
        env::remove_var("SESSIONGATE_TEST_VAR");
    }

    #[test]
    fn test_env_interpolation_with_default() {
        let content = "value = \"${NONEXISTENT_VAR:-default_value}\"";
        let result = interpolate_env_vars(content);
        assert_eq!(result, "value = \"default_value\"");
    }

    #[test]
    fn test_default_content_parses() {
        let config = parse_config(default_config_content()).unwrap();
        assert_eq!(config.session.access_ttl_secs, 900);
        assert_eq!(config.storage.backend, StorageKind::File);
        assert_eq!(config.codec.kind, CodecKind::Unsigned);
        assert!(config.permissions.is_empty());
    }

    #[test]
    fn test_jwt_secret_from_env_default() {
        let content = r#"
[codec]
kind = "jwt"
secret = "${SESSIONGATE_UNSET_SECRET:-local-dev-secret}"
"#;
        let config = parse_config(content).unwrap();
        assert_eq!(config.codec.secret.as_deref(), Some("local-dev-secret"));
    }
}
