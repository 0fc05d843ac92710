use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sessiongate::cli::{self, Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sessiongate=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Init => cli::commands::init(),
        Commands::Login { subject, role } => cli::commands::login(config, &subject, role),
        Commands::Status { format } => cli::commands::status(config, format),
        Commands::Check { capability } => cli::commands::check(config, capability),
        Commands::Refresh => cli::commands::refresh(config),
        Commands::Logout => cli::commands::logout(config),
        Commands::Permissions { role } => cli::commands::permissions(config, role),
    }
}
