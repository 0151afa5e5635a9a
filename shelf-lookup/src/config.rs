//! Configuration resolution for shelf-lookup
//!
//! The Google Books API key is optional (requests fall back to the anonymous
//! quota). Resolution priority: ENV → TOML.

use shelf_common::config::TomlConfig;
use tracing::{info, warn};

/// Environment variable holding the Google Books API key
pub const GOOGLE_API_KEY_ENV: &str = "SHELF_GOOGLE_BOOKS_API_KEY";

/// Resolve the Google Books API key from environment, then TOML
pub fn resolve_google_api_key(toml_config: &TomlConfig) -> Option<String> {
    let env_key = std::env::var(GOOGLE_API_KEY_ENV)
        .ok()
        .filter(|k| is_valid_key(k));
    let toml_key = toml_config
        .sources
        .google_api_key
        .clone()
        .filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!("Google Books API key found in both environment and TOML. Using environment (highest priority).");
    }

    if let Some(key) = env_key {
        info!("Google Books API key loaded from environment variable");
        return Some(key);
    }

    if let Some(key) = toml_key {
        info!("Google Books API key loaded from TOML config");
        return Some(key);
    }

    info!("No Google Books API key configured, using anonymous quota");
    None
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn toml_with_key(key: Option<&str>) -> TomlConfig {
        let mut config = TomlConfig::default();
        config.sources.google_api_key = key.map(str::to_string);
        config
    }

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("abc"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   "));
    }

    #[test]
    #[serial]
    fn test_env_wins_over_toml() {
        std::env::set_var(GOOGLE_API_KEY_ENV, "from-env");
        assert_eq!(
            resolve_google_api_key(&toml_with_key(Some("from-toml"))).as_deref(),
            Some("from-env")
        );
        std::env::remove_var(GOOGLE_API_KEY_ENV);
    }

    #[test]
    #[serial]
    fn test_toml_used_when_env_blank() {
        std::env::set_var(GOOGLE_API_KEY_ENV, "  ");
        assert_eq!(
            resolve_google_api_key(&toml_with_key(Some("from-toml"))).as_deref(),
            Some("from-toml")
        );
        std::env::remove_var(GOOGLE_API_KEY_ENV);
    }

    #[test]
    #[serial]
    fn test_no_key_anywhere() {
        std::env::remove_var(GOOGLE_API_KEY_ENV);
        assert_eq!(resolve_google_api_key(&toml_with_key(None)), None);
    }
}
