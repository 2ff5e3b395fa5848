//! CLI command implementations

use anyhow::{Context, Result};
use dialoguer::{theme::ColorfulTheme, Password};
use std::fs;
use std::io::{self, BufRead, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::api;
use crate::cli::{error, info, print_config_summary, success, warn};
use crate::config::{self, loader::CONFIG_FILENAME};
use crate::store::{IdentityStore, MemoryStore};

/// Initialize a new crms-auth.toml configuration file
pub async fn init() -> Result<()> {
    let config_path = Path::new(CONFIG_FILENAME);

    if config_path.exists() {
        warn(&format!("{} already exists", CONFIG_FILENAME));
        return Ok(());
    }

    fs::write(config_path, config::loader::default_config_content())?;

    success(&format!("Created {}", CONFIG_FILENAME));
    info("Set JWT_SECRET and JWT_REFRESH_SECRET, then run 'crms-auth serve --users <file>'");

    Ok(())
}

/// Start the HTTP API server
pub async fn serve(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<PathBuf>,
    users: Option<PathBuf>,
) -> Result<()> {
    let mut config = config::load_config(config_path.as_deref())?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    if let Err(e) = config.validate() {
        error(&e.to_string());
        return Err(e.into());
    }

    let store = match users {
        Some(path) => MemoryStore::from_json_file(&path)
            .with_context(|| format!("Failed to load identities from {}", path.display()))?,
        None => {
            warn("No identities file given; every login will be rejected");
            MemoryStore::new()
        }
    };
    let store: Arc<dyn IdentityStore> = Arc::new(store);

    info(&format!(
        "crms-auth listening on http://{}:{} ({})",
        config.server.host, config.server.port, config.server.env
    ));
    api::run_server(config, store).await?;
    Ok(())
}

/// Hash a password with bcrypt. The password never appears on the command line.
pub async fn hash_password(from_env: Option<String>, cost: u32) -> Result<()> {
    let password = match from_env {
        Some(var) => std::env::var(&var)
            .with_context(|| format!("Environment variable {} is not set", var))?,
        None if io::stdin().is_terminal() => Password::with_theme(&ColorfulTheme::default())
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()?,
        None => read_password_line(io::stdin().lock())?,
    };
    if password.is_empty() {
        anyhow::bail!("Password is empty");
    }

    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await?
        .context("Failed to hash password")?;
    println!("{}", hash);
    Ok(())
}

/// First line of piped input, without the line terminator
fn read_password_line(mut reader: impl BufRead) -> Result<String> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Validate configuration and print the effective settings
pub async fn check_config(config_path: Option<PathBuf>) -> Result<()> {
    let config = config::load_config(config_path.as_deref())?;
    print_config_summary(&config);

    match config.validate() {
        Ok(()) => {
            success("Configuration is valid");
            Ok(())
        }
        Err(e) => {
            error(&e.to_string());
            Err(e.into())
        }
    }
}
