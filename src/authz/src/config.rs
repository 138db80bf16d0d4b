//! Server and gate configuration

use crate::error::{AuthzError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthzConfig {
    /// Server bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// `false` disables enforcement entirely
    pub auth_enabled: bool,

    /// PostgreSQL connection string; in-memory store when unset
    pub database_url: Option<String>,

    /// Credential bound to the gate for internal callers
    pub bootstrap_token: Option<String>,
}

impl Default for AuthzConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            auth_enabled: true,
            database_url: None,
            bootstrap_token: None,
        }
    }
}

impl AuthzConfig {
    /// Load from `HOST`, `PORT`, `RUST_LOG`, `AUTH_ENABLED`, `DATABASE_URL`
    /// and `BOOTSTRAP_TOKEN`, falling back to defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port
                .parse()
                .map_err(|_| AuthzError::Config(format!("Invalid PORT: {}", port)))?;
        }
        if let Some(level) = lookup("RUST_LOG") {
            config.log_level = level;
        }
        if let Some(enabled) = lookup("AUTH_ENABLED") {
            config.auth_enabled = parse_bool(&enabled)
                .ok_or_else(|| AuthzError::Config(format!("Invalid AUTH_ENABLED: {}", enabled)))?;
        }
        config.database_url = lookup("DATABASE_URL").filter(|v| !v.is_empty());
        config.bootstrap_token = lookup("BOOTSTRAP_TOKEN").filter(|v| !v.is_empty());

        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
