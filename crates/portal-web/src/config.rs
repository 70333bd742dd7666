//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use portal::{StaticTokenAuth, TokenSpecError};

/// Portal web server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Directory holding uploaded photos.
    pub blob_dir: PathBuf,
    /// Public URL under which `blob_dir` is served.
    pub blob_base_url: String,
    /// Bearer tokens and the identities they stand for.
    pub tokens: StaticTokenAuth,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `PORTAL_ADDR` | Server bind address | `127.0.0.1:8790` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:portal.db?mode=rwc` |
    /// | `BLOB_DIR` | Photo storage directory | `blobs` |
    /// | `BLOB_BASE_URL` | Public URL of `BLOB_DIR` | `http://127.0.0.1:8790/blobs` |
    /// | `PORTAL_TOKENS` | `token=user_id:email:display name` entries, `;`-separated | (required) |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr = lookup("PORTAL_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8790".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = lookup("SQLITE_PATH")
            .unwrap_or_else(|| "sqlite:portal.db?mode=rwc".to_string());

        let blob_dir = lookup("BLOB_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("blobs"));

        let blob_base_url = lookup("BLOB_BASE_URL")
            .unwrap_or_else(|| "http://127.0.0.1:8790/blobs".to_string());

        let tokens = lookup("PORTAL_TOKENS").ok_or(ConfigError::MissingTokens)?;
        let tokens = StaticTokenAuth::parse(&tokens)?;
        if tokens.is_empty() {
            return Err(ConfigError::MissingTokens);
        }

        Ok(Self {
            addr,
            database_url,
            blob_dir,
            blob_base_url,
            tokens,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid PORTAL_ADDR format")]
    InvalidAddr,

    #[error("PORTAL_TOKENS environment variable is required")]
    MissingTokens,

    #[error("Invalid PORTAL_TOKENS: {0}")]
    InvalidTokens(#[from] TokenSpecError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("PORTAL_TOKENS", "abc=user-1::")])).unwrap();
        assert_eq!(config.addr.to_string(), "127.0.0.1:8790");
        assert_eq!(config.database_url, "sqlite:portal.db?mode=rwc");
        assert_eq!(config.blob_dir, PathBuf::from("blobs"));
        assert_eq!(config.blob_base_url, "http://127.0.0.1:8790/blobs");
        assert_eq!(config.tokens.len(), 1);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            Config::from_lookup(lookup(&[])),
            Err(ConfigError::MissingTokens)
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("PORTAL_TOKENS", " ; ")])),
            Err(ConfigError::MissingTokens)
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("PORTAL_TOKENS", "broken")])),
            Err(ConfigError::InvalidTokens(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("PORTAL_TOKENS", "a=b"), ("PORTAL_ADDR", "nowhere")])),
            Err(ConfigError::InvalidAddr)
        ));
    }
}
