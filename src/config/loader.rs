//! Configuration loading, environment variable interpolation and overrides

use crate::error::{Error, Result};
use regex::Regex;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::Config;

pub const CONFIG_FILENAME: &str = "crms-auth.toml";

/// Load configuration.
///
/// An explicit `path` must exist. Otherwise `crms-auth.toml` is searched for
/// upward from the current directory, falling back to defaults when none is
/// found. Environment overrides are applied last in both cases.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => load_config_from_path(path)?,
        None => match find_config_file() {
            Ok(path) => load_config_from_path(&path)?,
            Err(Error::ConfigNotFound) => {
                tracing::debug!("No {} found, using defaults", CONFIG_FILENAME);
                Config::default()
            }
            Err(e) => return Err(e),
        },
    };
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Load configuration from a specific path
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|_| Error::ConfigNotFound)?;
    tracing::debug!("Loading configuration from {}", path.display());
    load_config_from_str(&content)
}

/// Parse TOML content after `${VAR}` interpolation
pub fn load_config_from_str(content: &str) -> Result<Config> {
    let content = interpolate_env_vars(content);
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Find the configuration file, searching upward from current directory
fn find_config_file() -> Result<PathBuf> {
    let mut current = env::current_dir().map_err(|e| Error::Configuration(e.to_string()))?;

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
    // Constant pattern
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
        .expect("Invalid regex pattern - this is a bug in the codebase");

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        env::var(var_name).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}

/// Apply overrides from the process environment
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    apply_overrides(config, |key| env::var(key).ok())
}

/// Apply overrides from any key lookup. Empty values are ignored.
pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

    if let Some(value) = get("JWT_SECRET") {
        config.auth.access_secret = Some(value);
    }
    if let Some(value) = get("JWT_REFRESH_SECRET") {
        config.auth.refresh_secret = Some(value);
    }
    if let Some(value) = get("TOKEN_EXPIRES_IN") {
        config.auth.access_expires_in = value;
    }
    if let Some(value) = get("REFRESH_EXPIRES_IN") {
        config.auth.refresh_expires_in = value;
    }
    if let Some(value) = get("REFRESH_COOKIE_NAME") {
        config.auth.refresh_cookie_name = value;
    }
    if let Some(value) = get("REJECT_SUPERSEDED_REFRESH") {
        config.auth.reject_superseded_refresh = matches!(
            value.to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        );
    }
    if let Some(value) = get("HOST") {
        config.server.host = value;
    }
    if let Some(value) = get("PORT") {
        config.server.port = value
            .parse()
            .map_err(|_| Error::Configuration(format!("Invalid PORT: {}", value)))?;
    }
    if let Some(value) = get("NODE_ENV") {
        config.server.env = value;
    }
    if let Some(value) = get("ALLOWED_ORIGIN") {
        config.server.allowed_origin = value;
    }
    Ok(())
}

/// Generate a default configuration file content
pub fn default_config_content() -> &'static str {
    r#"# crms-auth configuration
# Values may interpolate environment variables as ${name} or ${name:-default}
# (upper-case names only).
#
# Signing secrets are read from JWT_SECRET and JWT_REFRESH_SECRET in the
# environment. TOKEN_EXPIRES_IN, REFRESH_EXPIRES_IN, REFRESH_COOKIE_NAME,
# REJECT_SUPERSEDED_REFRESH, HOST, PORT, NODE_ENV and ALLOWED_ORIGIN in the
# environment override this file.

[server]
host = "0.0.0.0"
port = 5000
env = "development"
allowed_origin = "*"

[auth]
access_expires_in = "15m"
refresh_expires_in = "7d"
refresh_cookie_name = "crms_rft"

# Remember the latest refresh token per identity and reject older ones.
# Per-process only.
reject_superseded_refresh = false
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_env_interpolation() {
        env::set_var("CRMS_LOADER_TEST_VAR", "hello");
        let content = "value = \"${CRMS_LOADER_TEST_VAR}\"";
        let result = interpolate_env_vars(content);
        assert_eq!(result, "value = \"hello\"");
        env::remove_var("CRMS_LOADER_TEST_VAR");
    }

    #[test]
    fn test_env_interpolation_with_default() {
        let content = "value = \"${CRMS_NONEXISTENT_VAR:-default_value}\"";
        let result = interpolate_env_vars(content);
        assert_eq!(result, "value = \"default_value\"");
    }

    #[test]
    fn test_default_content_parses() {
        let config = load_config_from_str(default_config_content()).unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.auth.refresh_cookie_name, "crms_rft");
    }

    #[test]
    fn test_default_content_takes_secrets_from_environment_verbatim() {
        let mut config = load_config_from_str(default_config_content()).unwrap();
        assert!(config.auth.access_secret.is_none());

        let vars: HashMap<&str, &str> = [
            ("JWT_SECRET", r#"s3cr"et\x"#),
            ("JWT_REFRESH_SECRET", "r'ef\"resh"),
        ]
        .into_iter()
        .collect();
        apply_overrides(&mut config, |key| vars.get(key).map(|v| v.to_string())).unwrap();

        assert_eq!(config.auth.access_secret.as_deref(), Some(r#"s3cr"et\x"#));
        assert_eq!(config.auth.refresh_secret.as_deref(), Some("r'ef\"resh"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("JWT_SECRET", "a"),
            ("JWT_REFRESH_SECRET", "r"),
            ("TOKEN_EXPIRES_IN", "5m"),
            ("REFRESH_COOKIE_NAME", "rt"),
            ("PORT", "8080"),
            ("REJECT_SUPERSEDED_REFRESH", "true"),
            ("NODE_ENV", ""),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        apply_overrides(&mut config, |key| vars.get(key).map(|v| v.to_string())).unwrap();

        assert_eq!(config.auth.access_secret.as_deref(), Some("a"));
        assert_eq!(config.auth.access_secs(), 300);
        assert_eq!(config.auth.refresh_cookie_name, "rt");
        assert_eq!(config.server.port, 8080);
        assert!(config.auth.reject_superseded_refresh);
        // Empty values leave the existing setting alone
        assert_eq!(config.server.env, "development");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_port_override() {
        let mut config = Config::default();
        let result = apply_overrides(&mut config, |key| {
            (key == "PORT").then(|| "not-a-port".to_string())
        });
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
