//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `TEXTPIN_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `TEXTPIN_` override YAML values
//! 3. **Well-known variables** - `PORT`, `MONGO_URI`, `DATABASE_URL` and `THIRDWEB_API_KEY`
//!
//! A `.env` file in the working directory (or a parent) is loaded into the process environment at
//! startup, below the real environment: a variable that is already set is never overwritten.
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `TEXTPIN_DATABASE__POOL__MAX_CONNECTIONS=20` sets `database.pool.max_connections`.
//!
//! `MONGO_URI` and `DATABASE_URL` both set the record store connection string (and switch the
//! record store to PostgreSQL if it was configured as `memory`). When both are present
//! `DATABASE_URL` wins. `THIRDWEB_API_KEY` sets `storage.secret_key` for the thirdweb backend.
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use textpin::config::{Args, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let args = Args::parse();
//! let config = Config::load(&args)?;
//!
//! println!("Server will bind to {}", config.bind_address());
//! # Ok(())
//! # }
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::errors::Error;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "TEXTPIN_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// All fields have defaults, so an empty (or missing) config file plus the well-known
/// environment variables is enough to start the service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Record store URL from `MONGO_URI` / `DATABASE_URL`. Folded into `database` by [`Config::load`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    /// Storage secret from `THIRDWEB_API_KEY`. Folded into `storage` by [`Config::load`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thirdweb_api_key: Option<String>,
    /// Where records (CID -> text) are persisted
    pub database: DatabaseConfig,
    /// Where text content is uploaded to
    pub storage: StorageConfig,
    /// Console log output format
    pub log_format: LogFormat,
}

/// Record store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DatabaseConfig {
    /// External PostgreSQL database
    Postgres {
        /// Connection string
        url: String,
        /// Connection pool settings
        #[serde(default)]
        pool: PoolSettings,
    },
    /// Process-local store. Records are lost on restart.
    Memory,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig::Postgres {
            url: "postgres://localhost:5432/textpin".to_string(),
            pool: PoolSettings::default(),
        }
    }
}

/// Connection pool settings passed through to SQLx.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolSettings {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections to maintain
    pub min_connections: u32,
    /// Maximum time to wait for a connection (seconds)
    pub acquire_timeout_secs: u64,
    /// Time before idle connections are closed (seconds, 0 = never)
    pub idle_timeout_secs: u64,
    /// Maximum lifetime of a connection (seconds, 0 = never)
    pub max_lifetime_secs: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 0,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,  // 10 minutes
            max_lifetime_secs: 1800, // 30 minutes
        }
    }
}

impl PoolSettings {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }

    pub fn max_lifetime(&self) -> Option<Duration> {
        (self.max_lifetime_secs > 0).then(|| Duration::from_secs(self.max_lifetime_secs))
    }
}

/// Content storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// IPFS through the thirdweb storage service
    Thirdweb {
        /// thirdweb secret key, sent as `x-secret-key`
        #[serde(default, skip_serializing)]
        secret_key: Option<String>,
        /// Pinning endpoint that accepts multipart uploads
        #[serde(default = "default_upload_url")]
        upload_url: Url,
        /// IPFS gateway used for downloads
        #[serde(default = "default_gateway_url")]
        gateway_url: Url,
    },
    /// Process-local content-addressed store. Content is lost on restart.
    Memory,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Thirdweb {
            secret_key: None,
            upload_url: default_upload_url(),
            gateway_url: default_gateway_url(),
        }
    }
}

fn default_upload_url() -> Url {
    Url::parse("https://storage.thirdweb.com/ipfs/upload").expect("valid default upload URL")
}

fn default_gateway_url() -> Url {
    Url::parse("https://ipfs.thirdwebstorage.com").expect("valid default gateway URL")
}

/// Console log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            database_url: None,
            thirdweb_api_key: None,
            database: DatabaseConfig::default(),
            storage: StorageConfig::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let mut config: Self = Self::figment(args).extract()?;

        // MONGO_URI / DATABASE_URL always point at an external database
        if let Some(url) = config.database_url.take() {
            let pool = match &config.database {
                DatabaseConfig::Postgres { pool, .. } => pool.clone(),
                DatabaseConfig::Memory => PoolSettings::default(),
            };
            config.database = DatabaseConfig::Postgres { url, pool };
        }

        if let Some(key) = config.thirdweb_api_key.take() {
            match &mut config.storage {
                StorageConfig::Thirdweb { secret_key, .. } => *secret_key = Some(key),
                StorageConfig::Memory => {
                    // In-memory storage has no credentials
                }
            }
        }

        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if let DatabaseConfig::Postgres { url, pool } = &self.database {
            if url.trim().is_empty() {
                return Err(Error::Validation {
                    message: "Config validation: database.url is empty. Set MONGO_URI or DATABASE_URL.".to_string(),
                });
            }
            if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
                let scheme = url.split_once("://").map_or("<none>", |(scheme, _)| scheme);
                return Err(Error::Validation {
                    message: format!(
                        "Config validation: the record store is PostgreSQL, but database.url has scheme '{scheme}'. \
                         MONGO_URI and DATABASE_URL must be postgres:// or postgresql:// URLs."
                    ),
                });
            }
            if pool.max_connections == 0 {
                return Err(Error::Validation {
                    message: "Config validation: database.pool.max_connections must be at least 1".to_string(),
                });
            }
            if pool.min_connections > pool.max_connections {
                return Err(Error::Validation {
                    message: format!(
                        "Config validation: database.pool.min_connections ({}) cannot be greater than max_connections ({})",
                        pool.min_connections, pool.max_connections
                    ),
                });
            }
        }

        if let StorageConfig::Thirdweb { secret_key, .. } = &self.storage
            && secret_key.as_deref().is_none_or(|key| key.trim().is_empty())
        {
            return Err(Error::Validation {
                message: "Config validation: thirdweb storage requires a secret key. \
                          Please set THIRDWEB_API_KEY or storage.secret_key."
                    .to_string(),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Prefixed environment variables override specific values
            .merge(Env::prefixed("TEXTPIN_").ignore(&["CONFIG"]).split("__"))
            // Well-known deployment variables. DATABASE_URL is merged after MONGO_URI so it wins.
            .merge(Env::raw().only(&["PORT", "THIRDWEB_API_KEY"]))
            .merge(Env::raw().only(&["MONGO_URI"]).map(|_| "database_url".into()))
            .merge(Env::raw().only(&["DATABASE_URL"]))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
