//! Gateway configuration.
//!
//! [`GatewayConfig`] is deserialized from TOML. Every
//! [`Gateway`](crate::gateway::Gateway) owns its own copy; nothing is global.
//!
//! # Examples
//!
//! ```
//! use pagarme_gateway::config::GatewayConfig;
//!
//! let config = GatewayConfig::from_toml(
//!     r#"
//!     api_key = "sk_test_123"
//!
//!     [http]
//!     timeout_secs = 60
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.base_url, "https://api.pagar.me/core/v5/");
//! assert_eq!(config.http.timeout_secs, 60);
//! assert_eq!(config.resolve_api_key().unwrap(), "sk_test_123");
//! ```

use std::{fmt, path::Path, time::Duration};

use serde::Deserialize;
use url::Url;

use crate::error::{GatewayError, Result};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.pagar.me/core/v5/";

/// Default environment variable holding the secret key.
pub const DEFAULT_API_KEY_ENV: &str = "PAGARME_API_KEY";

/// Root gateway configuration.
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// API root. Endpoint paths are joined onto it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Secret key, inline. Takes precedence over `api_key_env`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Environment variable holding the secret key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            api_key_env: default_api_key_env(),
            http: HttpConfig::default(),
        }
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_key_env", &self.api_key_env)
            .field("http", &self.http)
            .finish()
    }
}

impl GatewayConfig {
    /// Creates a configuration with an inline key and default settings.
    #[must_use]
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self { api_key: Some(api_key.into()), ..Self::default() }
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigError`] on malformed TOML or if
    /// [`validate`](Self::validate) fails.
    pub fn from_toml(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)
            .map_err(|e| GatewayError::ConfigError(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigError`] if the file cannot be read or
    /// [`from_toml`](Self::from_toml) fails.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::ConfigError(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml(&source)
    }

    /// Validates the configuration.
    ///
    /// Checks that:
    /// - `base_url` parses, uses HTTPS and is not localhost or loopback
    /// - `api_key_env` is a valid environment variable name
    /// - HTTP timeouts are within bounds
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigError`] naming the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.parsed_base_url()?;
        validate_env_var_name(&self.api_key_env)?;
        self.http.validate()
    }

    /// Parses and validates `base_url`.
    ///
    /// A trailing slash is added when missing so endpoint paths join below it.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigError`] if the URL is invalid, not HTTPS,
    /// or points at localhost.
    pub fn parsed_base_url(&self) -> Result<Url> {
        let raw = if self.base_url.ends_with('/') {
            self.base_url.clone()
        } else {
            format!("{}/", self.base_url)
        };
        let url = Url::parse(&raw).map_err(|e| {
            GatewayError::ConfigError(format!("invalid base_url '{}': {e}", self.base_url))
        })?;

        if url.scheme() != "https" {
            return Err(GatewayError::ConfigError(format!(
                "base_url must use HTTPS, got: {}",
                url.scheme()
            )));
        }

        if let Some(host) = url.host_str() {
            let host = host.to_lowercase();
            if host == "localhost"
                || host == "::1"
                || host == "[::1]"
                || host.starts_with("127.")
            {
                return Err(GatewayError::ConfigError(format!(
                    "base_url must not be localhost or loopback: {host}"
                )));
            }
        }

        Ok(url)
    }

    /// Returns the secret key: the inline key, else `api_key_env`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigError`] if neither yields a non-empty key.
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = self.api_key.as_ref().filter(|key| !key.is_empty()) {
            return Ok(key.clone());
        }
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err(GatewayError::ConfigError(format!(
                "no api_key configured and {} is not set",
                self.api_key_env
            ))),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Maximum idle connections per host.
    #[serde(default = "default_pool_max_idle")]
    pub pool_max_idle_per_host: usize,

    /// `User-Agent` header override.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            pool_max_idle_per_host: default_pool_max_idle(),
            user_agent: None,
        }
    }
}

impl HttpConfig {
    /// Validates timeouts.
    ///
    /// # Errors
    ///
    /// Returns error if `timeout_secs` is outside 1-300 or
    /// `connect_timeout_secs` is outside 1-60.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(GatewayError::ConfigError(
                "timeout_secs must be between 1 and 300".to_owned(),
            ));
        }
        if self.connect_timeout_secs == 0 || self.connect_timeout_secs > 60 {
            return Err(GatewayError::ConfigError(
                "connect_timeout_secs must be between 1 and 60".to_owned(),
            ));
        }
        Ok(())
    }

    /// Returns timeout as Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns connect timeout as Duration.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn validate_env_var_name(name: &str) -> Result<()> {
    let Some(first) = name.chars().next() else {
        return Err(GatewayError::ConfigError(
            "environment variable name cannot be empty".to_owned(),
        ));
    };
    if !first.is_ascii_alphabetic() && first != '_' {
        return Err(GatewayError::ConfigError(format!(
            "environment variable name must start with letter or underscore: {name}"
        )));
    }
    if let Some(ch) = name.chars().find(|ch| !ch.is_ascii_alphanumeric() && *ch != '_') {
        return Err(GatewayError::ConfigError(format!(
            "environment variable name contains invalid character '{ch}': {name}"
        )));
    }
    Ok(())
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_owned()
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_connect_timeout_secs() -> u64 {
    10
}

const fn default_pool_max_idle() -> usize {
    100
}
