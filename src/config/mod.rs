//! Configuration for the Z-Audio gateway.
//!
//! All configuration comes from environment variables (a `.env` file is
//! loaded first when present). Defaults match the upstream provider's public
//! deployment so the gateway runs with nothing but a token configured.

use thiserror::Error;

/// Default upstream provider endpoint.
pub const DEFAULT_BASE_URL: &str = "https://audio.z.ai";
/// Browser-style user agent the provider expects.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 AppleWebKit/537.36 Chrome/143 Safari/537";
/// Stock voice used when a request names none.
pub const DEFAULT_VOICE: &str = "system_001";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
    #[error("BASE_URL must start with http:// or https://, got {0:?}")]
    InvalidBaseUrl(String),
}

/// Server configuration.
///
/// Built once at startup and shared read-only through
/// [`crate::state::AppState`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address.
    pub host: String,
    /// Listen port (`HTTP_PORT`).
    pub port: u16,
    /// Upstream provider base URL, without trailing slash (`BASE_URL`).
    pub base_url: String,
    /// User agent sent on every upstream call (`USER_AGENT`).
    pub user_agent: String,
    /// Fallback bearer token when a request carries none (`ZAI_TOKEN`).
    pub zai_token: String,
    /// Fallback user id for synthesis and catalog calls (`ZAI_USERID`).
    pub zai_user_id: String,
    /// Voice id used when a request names none (`ZAI_DEFAULT_VOICE`).
    pub default_voice: String,
    /// Upstream connection-establishment timeout (`CONNECT_TIMEOUT_SECS`).
    /// Deliberately no overall request timeout; streams run long.
    pub connect_timeout_secs: u64,
    /// Voice catalog cache TTL (`CATALOG_TTL_SECS`).
    pub catalog_ttl_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 80,
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            zai_token: String::new(),
            zai_user_id: String::new(),
            default_voice: DEFAULT_VOICE.to_string(),
            connect_timeout_secs: 60,
            catalog_ttl_secs: 3600,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables, validating as it goes.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let base_url = env_or("BASE_URL", &defaults.base_url);
        let base_url = base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidBaseUrl(base_url));
        }

        Ok(Self {
            host: env_or("HOST", &defaults.host),
            port: parse_env("HTTP_PORT", defaults.port)?,
            base_url,
            user_agent: env_or("USER_AGENT", &defaults.user_agent),
            zai_token: env_or("ZAI_TOKEN", ""),
            zai_user_id: env_or("ZAI_USERID", ""),
            default_voice: env_or("ZAI_DEFAULT_VOICE", &defaults.default_voice),
            connect_timeout_secs: parse_env("CONNECT_TIMEOUT_SECS", defaults.connect_timeout_secs)?,
            catalog_ttl_secs: parse_env("CATALOG_TTL_SECS", defaults.catalog_ttl_secs)?,
        })
    }

    /// The socket address string to bind.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_or(name: &str, default: &str) -> String {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}

fn parse_env<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for name in [
            "BASE_URL",
            "HOST",
            "HTTP_PORT",
            "USER_AGENT",
            "ZAI_TOKEN",
            "ZAI_USERID",
            "ZAI_DEFAULT_VOICE",
            "CONNECT_TIMEOUT_SECS",
            "CATALOG_TTL_SECS",
        ] {
            unsafe { std::env::remove_var(name) };
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.port, 80);
        assert_eq!(config.default_voice, "system_001");
        assert_eq!(config.connect_timeout_secs, 60);
        assert_eq!(config.address(), "0.0.0.0:80");
    }

    #[test]
    #[serial]
    fn test_env_overrides_and_trailing_slash() {
        clear_env();
        unsafe {
            std::env::set_var("BASE_URL", "https://audio.example.com/");
            std::env::set_var("HTTP_PORT", "8080");
            std::env::set_var("ZAI_TOKEN", "secret");
        }
        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.base_url, "https://audio.example.com");
        assert_eq!(config.port, 8080);
        assert_eq!(config.zai_token, "secret");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_port_rejected() {
        clear_env();
        unsafe { std::env::set_var("HTTP_PORT", "not-a-port") };
        let err = ServerConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "HTTP_PORT", .. }));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_base_url_rejected() {
        clear_env();
        unsafe { std::env::set_var("BASE_URL", "audio.example.com") };
        assert!(matches!(
            ServerConfig::from_env().unwrap_err(),
            ConfigError::InvalidBaseUrl(_)
        ));
        clear_env();
    }
}
