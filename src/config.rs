use std::env;
use std::fmt;
use std::fs;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

#[cfg(test)]
mod tests;

/// Startup configuration for the proxy. Loaded once, validated once,
/// immutable afterwards.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProxyConfig {
    pub local_port: u16,
    pub upstream_host: String,
    pub upstream_port: u16,
    pub method: String,
    pub max_requests: u32,
    pub cache_size_kb: usize, // cache capacity in kilobytes of body data
    pub freshness_secs: u64,  // age after which a cached entry is stale
    pub upstream_timeout_secs: u64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            local_port: 3000,
            upstream_host: "www.public.asu.edu".to_string(),
            upstream_port: 80,
            method: "GET".to_string(),
            max_requests: 15,
            cache_size_kb: 1024,
            freshness_secs: 10,
            upstream_timeout_secs: 30,
        }
    }
}

#[derive(Debug)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid configuration: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

impl ProxyConfig {
    /// Reads the JSON file named by `WEBPROXY_CONFIG` (when set), applies
    /// `WEBPROXY_*` environment overrides on top, and validates the result.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match env::var("WEBPROXY_CONFIG") {
            Ok(path) => {
                let raw = fs::read_to_string(&path)
                    .map_err(|e| ConfigError(format!("{}: {}", path, e)))?;
                serde_json::from_str(&raw)
                    .map_err(|e| ConfigError(format!("{}: {}", path, e)))?
            }
            Err(_) => Self::default(),
        };

        override_from_env("WEBPROXY_LOCAL_PORT", &mut config.local_port)?;
        override_from_env("WEBPROXY_UPSTREAM_HOST", &mut config.upstream_host)?;
        override_from_env("WEBPROXY_UPSTREAM_PORT", &mut config.upstream_port)?;
        override_from_env("WEBPROXY_METHOD", &mut config.method)?;
        override_from_env("WEBPROXY_MAX_REQUESTS", &mut config.max_requests)?;
        override_from_env("WEBPROXY_CACHE_SIZE_KB", &mut config.cache_size_kb)?;
        override_from_env("WEBPROXY_FRESHNESS_SECS", &mut config.freshness_secs)?;
        override_from_env("WEBPROXY_UPSTREAM_TIMEOUT_SECS", &mut config.upstream_timeout_secs)?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upstream_host.is_empty() {
            return Err(ConfigError("upstream_host must not be empty".to_string()));
        }
        if self.method != "GET" && self.method != "POST" {
            return Err(ConfigError(format!(
                "method must be GET or POST, got {}",
                self.method
            )));
        }
        if self.max_requests == 0 {
            return Err(ConfigError("max_requests must be at least 1".to_string()));
        }
        if self.cache_size_kb == 0 {
            return Err(ConfigError("cache_size_kb must be at least 1".to_string()));
        }
        if self.freshness_secs == 0 {
            return Err(ConfigError("freshness_secs must be at least 1".to_string()));
        }
        if self.upstream_timeout_secs == 0 {
            return Err(ConfigError(
                "upstream_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn capacity_bytes(&self) -> usize {
        self.cache_size_kb * 1024
    }

    pub fn freshness(&self) -> Duration {
        Duration::from_secs(self.freshness_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

fn override_from_env<T: FromStr>(name: &str, field: &mut T) -> Result<(), ConfigError>
where
    T::Err: fmt::Display,
{
    if let Ok(raw) = env::var(name) {
        *field = raw
            .parse()
            .map_err(|e| ConfigError(format!("{}: {}", name, e)))?;
    }
    Ok(())
}
