//! Server configuration: CLI flags and environment variables.
//!
//! Mirrors a typical network config shape (host/port/cors/timeout) and
//! adds the cache-bound settings the HTTP adapter needs to construct the
//! underlying engine.

use std::time::Duration;

use cachegrid_core::config::CacheConfig;
use cachegrid_core::policy::PolicyKind;
use clap::Parser;

/// CacheGrid server configuration, parsed from CLI flags with environment
/// variable fallbacks.
#[derive(Debug, Clone, Parser)]
#[command(name = "cachegrid-server", about = "In-memory key-value cache over HTTP")]
pub struct ServerConfig {
    /// Bind address for the server.
    #[arg(long, env = "CACHEGRID_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, env = "CACHEGRID_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Maximum number of entries before eviction kicks in.
    #[arg(long, env = "CACHEGRID_MAX_ENTRIES", default_value_t = 10_000)]
    pub max_entries: u64,

    /// Maximum total estimated byte size before eviction kicks in.
    #[arg(long, env = "CACHEGRID_MAX_BYTES", default_value_t = 100 * 1024 * 1024)]
    pub max_bytes: u64,

    /// Period in seconds between background expiry sweeps.
    #[arg(long, env = "CACHEGRID_CLEANUP_INTERVAL_SECS", default_value_t = 60)]
    pub cleanup_interval_secs: u64,

    /// Eviction policy: `lru`, `lfu`, or `ttl`.
    #[arg(long, env = "CACHEGRID_POLICY", default_value = "lru")]
    pub policy: String,

    /// Maximum time to wait for a request to complete.
    #[arg(long, env = "CACHEGRID_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Allowed CORS origins. A single `*` allows any origin.
    #[arg(long, env = "CACHEGRID_CORS_ORIGINS", default_value = "*", value_delimiter = ',')]
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    /// Builds the core-layer [`CacheConfig`] from these settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `policy` is not a recognized policy name.
    pub fn cache_config(&self) -> Result<CacheConfig, cachegrid_core::CoreError> {
        Ok(CacheConfig {
            max_entries: self.max_entries,
            max_bytes: self.max_bytes,
            cleanup_interval: Duration::from_secs(self.cleanup_interval_secs),
            policy: PolicyKind::parse(&self.policy)?,
        })
    }

    /// Maximum time to wait for a request to complete.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_entries: 10_000,
            max_bytes: 100 * 1024 * 1024,
            cleanup_interval_secs: 60,
            policy: "lru".to_string(),
            request_timeout_secs: 30,
            cors_origins: vec!["*".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds_a_valid_cache_config() {
        let config = ServerConfig::default();
        let cache_config = config.cache_config().unwrap();
        assert_eq!(cache_config.max_entries, 10_000);
        assert_eq!(cache_config.policy, PolicyKind::Lru);
    }

    #[test]
    fn unknown_policy_name_is_rejected() {
        let mut config = ServerConfig::default();
        config.policy = "not-a-policy".to_string();
        assert!(config.cache_config().is_err());
    }
}
