use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crms_auth::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crms_auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => cli::commands::init().await,
        Commands::Serve {
            host,
            port,
            config,
            users,
        } => cli::commands::serve(host, port, config, users).await,
        Commands::HashPassword { from_env, cost } => {
            cli::commands::hash_password(from_env, cost).await
        }
        Commands::CheckConfig { config } => cli::commands::check_config(config).await,
    }
}
