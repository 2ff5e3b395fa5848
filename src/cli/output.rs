//! CLI output formatting utilities

use colored::Colorize;

use crate::config::Config;

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

/// Show a secret as set/unset without revealing it
pub fn mask_secret(secret: Option<&str>) -> String {
    match secret {
        Some(s) if !s.is_empty() => format!("set ({} bytes)", s.len()),
        _ => "not set".red().to_string(),
    }
}

/// Print the effective configuration, secrets masked
pub fn print_config_summary(config: &Config) {
    let auth = &config.auth;
    println!("{}", "Server".bold());
    println!("  listen:          {}:{}", config.server.host, config.server.port);
    println!("  env:             {}", config.server.env);
    println!("  allowed origin:  {}", config.server.allowed_origin);
    println!("{}", "Auth".bold());
    println!("  access secret:   {}", mask_secret(auth.access_secret.as_deref()));
    println!("  refresh secret:  {}", mask_secret(auth.refresh_secret.as_deref()));
    println!(
        "  access tokens:   {} ({}s)",
        auth.access_expires_in,
        auth.access_secs()
    );
    println!(
        "  refresh tokens:  {} ({}s)",
        auth.refresh_expires_in,
        auth.refresh_secs()
    );
    println!("  refresh cookie:  {}", auth.refresh_cookie_name);
    println!(
        "  reuse detection: {}",
        if auth.reject_superseded_refresh {
            "on".green()
        } else {
            "off".normal()
        }
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret_never_prints_value() {
        let masked = mask_secret(Some("super-secret"));
        assert!(!masked.contains("super-secret"));
        assert!(masked.contains("12 bytes"));
        assert!(mask_secret(None).contains("not set"));
        assert!(mask_secret(Some("")).contains("not set"));
    }
}
