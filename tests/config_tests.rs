//! Configuration loading tests

use crms_auth::config::{load_config, load_config_from_path, loader, Config};
use crms_auth::error::Error;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_config_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("crms-auth.toml");
    fs::write(
        &path,
        r#"
[server]
port = 8081
allowed_origin = "https://crms.netlify.app"

[auth]
access_secret = "file-access"
refresh_secret = "file-refresh"
access_expires_in = "10m"
refresh_expires_in = "30d"
refresh_cookie_name = "rt"
"#,
    )
    .unwrap();

    let config = load_config_from_path(&path).unwrap();
    assert_eq!(config.server.port, 8081);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.auth.access_secs(), 600);
    assert_eq!(config.auth.refresh_secs(), 30 * 86_400);
    assert_eq!(config.auth.cookie_policy().name(), "rt");
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_file_is_config_not_found() {
    let dir = TempDir::new().unwrap();
    let result = load_config_from_path(&dir.path().join("missing.toml"));
    assert!(matches!(result, Err(Error::ConfigNotFound)));
}

#[test]
fn test_invalid_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("crms-auth.toml");
    fs::write(&path, "this is [ not valid toml").unwrap();

    let result = load_config_from_path(&path);
    assert!(matches!(result, Err(Error::TomlParse(_))));
}

#[test]
fn test_interpolated_secret_with_default() {
    let config = loader::load_config_from_str(
        r#"
[auth]
access_secret = "${CRMS_CONFIG_TEST_UNSET_A:-from-default-a}"
refresh_secret = "${CRMS_CONFIG_TEST_UNSET_R:-from-default-r}"
"#,
    )
    .unwrap();

    assert_eq!(config.auth.access_secret.as_deref(), Some("from-default-a"));
    assert!(config.validate().is_ok());
}

#[test]
fn test_unset_interpolated_secret_fails_validation() {
    let config = loader::load_config_from_str(
        r#"
[auth]
access_secret = "${CRMS_CONFIG_TEST_UNSET_SECRET}"
refresh_secret = "present"
"#,
    )
    .unwrap();

    let err = config.validate().unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
    assert!(err.to_string().contains("JWT_SECRET"));
}

#[test]
fn test_unknown_duration_falls_back_to_defaults() {
    let config: Config = toml::from_str(
        r#"
[auth]
access_expires_in = "a while"
refresh_expires_in = "7w"
"#,
    )
    .unwrap();

    assert_eq!(config.auth.access_secs(), 15 * 60);
    assert_eq!(config.auth.refresh_secs(), 7 * 86_400);
}

#[test]
fn test_token_codec_requires_secrets() {
    let config = Config::default();
    assert!(matches!(
        config.auth.token_codec(),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn test_init_template_loads_with_quoted_secrets_in_environment() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("crms-auth.toml");
    fs::write(&path, loader::default_config_content()).unwrap();

    std::env::set_var("JWT_SECRET", r#"s3cr"et\"#);
    std::env::set_var("JWT_REFRESH_SECRET", r#"re"fresh"#);
    let result = load_config(Some(&path));
    std::env::remove_var("JWT_SECRET");
    std::env::remove_var("JWT_REFRESH_SECRET");

    let config = result.unwrap();
    assert_eq!(config.auth.access_secret.as_deref(), Some(r#"s3cr"et\"#));
    assert_eq!(config.auth.refresh_secret.as_deref(), Some(r#"re"fresh"#));
    assert!(config.validate().is_ok());
}
