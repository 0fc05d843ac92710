//! CLI command implementations

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::auth::{Capability, Role, SessionGuard};
use crate::cli::{
    error, format_timestamp, info, print_permission_table, print_session_detail, success, warn,
    OutputFormat, SessionReport,
};
use crate::config::{self, Config, StorageKind};

/// Initialize a new sessiongate.toml configuration file
pub fn init() -> Result<()> {
    let config_path = Path::new(config::loader::CONFIG_FILENAME);

    if config_path.exists() {
        warn("sessiongate.toml already exists");
        return Ok(());
    }

    let content = config::loader::default_config_content();
    fs::write(config_path, content)?;

    success("Created sessiongate.toml");
    info("Edit the configuration file and run 'sessiongate login --subject <id> --role <role>'");

    Ok(())
}

/// Start a new session
pub fn login(config_path: Option<&Path>, subject: &str, role: Role) -> Result<()> {
    let guard = load_guard(config_path)?;

    match guard.login(subject, role) {
        Ok(pair) => {
            success(&format!("Logged in as {} ({})", subject, role));
            if let Some(access) = guard.codec().decode(&pair.access_token) {
                info(&format!(
                    "Access token valid until {}",
                    format_timestamp(access.expires_at)
                ));
            }
            Ok(())
        }
        Err(e) => {
            tracing::debug!("Login failed: {}", e);
            error(e.user_message());
            Err(e.into())
        }
    }
}

/// Show the stored session
pub fn status(config_path: Option<&Path>, format: OutputFormat) -> Result<()> {
    let guard = load_guard(config_path)?;
    let report = SessionReport::collect(&guard);

    match format {
        OutputFormat::Table => {
            print_session_detail(&report);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&report)?;
            println!("{}", yaml);
        }
    }

    Ok(())
}

/// Check a capability against the current session
pub fn check(config_path: Option<&Path>, capability: Capability) -> Result<()> {
    let guard = load_guard(config_path)?;

    match guard.require_capability(capability) {
        Ok(payload) => {
            success(&format!(
                "{} ({}) may use {}",
                payload.subject, payload.role, capability
            ));
            Ok(())
        }
        Err(e) => {
            error(e.user_message());
            Err(e.into())
        }
    }
}

/// Refresh the access token
pub fn refresh(config_path: Option<&Path>) -> Result<()> {
    let guard = load_guard(config_path)?;

    match guard.refresh() {
        Ok(pair) => {
            let until = guard
                .codec()
                .decode(&pair.access_token)
                .map(|p| format_timestamp(p.expires_at))
                .unwrap_or_else(|| "unknown".to_string());
            success(&format!("Refreshed session, access valid until {}", until));
            Ok(())
        }
        Err(e) => {
            error(e.user_message());
            Err(e.into())
        }
    }
}

/// Clear the stored session
pub fn logout(config_path: Option<&Path>) -> Result<()> {
    let guard = load_guard(config_path)?;
    guard.logout()?;
    success("Logged out");
    Ok(())
}

/// Show capabilities per role
pub fn permissions(config_path: Option<&Path>, role: Option<Role>) -> Result<()> {
    let config = load(config_path)?;
    let table = crate::auth::PermissionTable::from_overrides(&config.permissions)?;

    let roles = match role {
        Some(role) => vec![role],
        None => Role::ALL.to_vec(),
    };
    print_permission_table(&table, &roles);

    Ok(())
}

fn load(config_path: Option<&Path>) -> Result<Config> {
    let config = match config_path {
        Some(path) => config::load_config_from_path(path)?,
        None => config::load_config_or_default()?,
    };
    Ok(config)
}

fn load_guard(config_path: Option<&Path>) -> Result<SessionGuard> {
    let config = load(config_path)?;
    if config.storage.backend == StorageKind::Memory {
        warn("Memory storage does not outlive this command");
    }
    Ok(SessionGuard::from_config(&config)?)
}
