//! CLI output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use serde::Serialize;

use crate::auth::{Capability, PermissionTable, Role, SessionGuard, SessionState};

/// Snapshot of the stored session for display
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub state: SessionState,
    pub subject: Option<String>,
    pub role: Option<Role>,
    pub access_expires_at: Option<i64>,
    pub refresh_expires_at: Option<i64>,
    pub capabilities: Vec<Capability>,
}

impl SessionReport {
    /// Read the stored pair without refreshing or clearing it
    pub fn collect(guard: &SessionGuard) -> Self {
        let state = guard.state();
        let pair = guard.store().load();
        let access = pair
            .as_ref()
            .and_then(|pair| guard.codec().decode(&pair.access_token));
        let refresh = pair
            .as_ref()
            .and_then(|pair| guard.codec().decode(&pair.refresh_token));

        let identity = access.as_ref().or(refresh.as_ref());
        let capabilities = match (state, identity) {
            (SessionState::NoSession, _) | (_, None) => Vec::new(),
            (_, Some(payload)) => guard
                .permissions()
                .capabilities_for(payload.role)
                .into_iter()
                .collect(),
        };

        Self {
            state,
            subject: identity.map(|p| p.subject.clone()),
            role: identity.map(|p| p.role),
            access_expires_at: access.as_ref().map(|p| p.expires_at),
            refresh_expires_at: refresh.as_ref().map(|p| p.expires_at),
            capabilities,
        }
    }
}

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn warn(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// Format session state as a colored string
pub fn format_state(state: SessionState) -> String {
    let label = state.to_string();
    match state {
        SessionState::Active => label.green().to_string(),
        SessionState::ExpiringSoon => label.yellow().to_string(),
        SessionState::Expired => label.red().to_string(),
        SessionState::NoSession => label.dimmed().to_string(),
    }
}

/// Render a Unix timestamp for humans
pub fn format_timestamp(secs: i64) -> String {
    chrono::DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| secs.to_string())
}

/// Print detailed session status
pub fn print_session_detail(report: &SessionReport) {
    println!("{}", "Session".bold().underline());
    println!();
    println!("  {} {}", "State:".bold(), format_state(report.state));

    if report.state == SessionState::NoSession {
        println!();
        info("Log in with 'sessiongate login --subject <id> --role <role>'");
        return;
    }

    if let Some(subject) = &report.subject {
        println!("  {} {}", "Subject:".bold(), subject);
    }
    if let Some(role) = report.role {
        println!("  {} {}", "Role:".bold(), role.to_string().cyan());
    }
    if let Some(exp) = report.access_expires_at {
        println!("  {} {}", "Access expires:".bold(), format_timestamp(exp));
    }
    if let Some(exp) = report.refresh_expires_at {
        println!("  {} {}", "Refresh expires:".bold(), format_timestamp(exp));
    }

    if !report.capabilities.is_empty() {
        println!();
        println!("  {}", "Capabilities:".bold());
        for cap in &report.capabilities {
            println!("    - {}", cap);
        }
    }
}

/// Print a table of roles and the capabilities they grant
pub fn print_permission_table(table: &PermissionTable, roles: &[Role]) {
    let mut header = vec![Cell::new("Capability").fg(Color::Cyan)];
    header.extend(roles.iter().map(|role| Cell::new(role).fg(Color::Cyan)));

    let mut out = Table::new();
    out.load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);

    for cap in Capability::ALL {
        let mut row = vec![Cell::new(cap)];
        for role in roles {
            row.push(if table.has_capability(*role, cap) {
                Cell::new("✓").fg(Color::Green)
            } else {
                Cell::new("-")
            });
        }
        out.add_row(row);
    }

    println!("{out}");
}
