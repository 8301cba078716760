// src/config/models.rs
use anyhow::{bail, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Ordered backend list; selection order follows config order.
    pub backends: Vec<BackendConfig>,

    #[serde(default)]
    pub proxy: ProxyConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URI of the backend. Deliberately not parsed here: a malformed
    /// entry fails the individual requests routed to it, not startup.
    pub url: String,
    pub weight: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProxyConfig {
    /// Upper bound on waiting for the upstream response head. Absent means
    /// no timeout.
    pub upstream_timeout_secs: Option<u64>,
}

impl ProxyConfig {
    pub fn upstream_timeout(&self) -> Option<Duration> {
        self.upstream_timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.backends.is_empty() {
            bail!("at least one backend must be configured");
        }

        for backend in &self.backends {
            if backend.weight == 0 {
                bail!(
                    "backend {} has weight 0; every weight must be positive",
                    backend.url
                );
            }
        }

        Ok(())
    }
}

fn default_listen_addr() -> SocketAddr {
    ([0, 0, 0, 0], 8080).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_yaml_config() {
        let config: Config = serde_yaml::from_str(
            r#"
listen_addr: 127.0.0.1:9000
backends:
  - url: http://app-a:5678
    weight: 5
  - url: http://app-b:5678
    weight: 5
proxy:
  upstream_timeout_secs: 30
"#,
        )
        .unwrap();

        assert_eq!(config.listen_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.backends.len(), 2);
        assert_eq!(config.backends[0].url, "http://app-a:5678");
        assert_eq!(
            config.proxy.upstream_timeout(),
            Some(Duration::from_secs(30))
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_json_config_with_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"backends": [{"url": "http://127.0.0.1:8001", "weight": 1}]}"#,
        )
        .unwrap();

        assert_eq!(config.listen_addr, default_listen_addr());
        assert_eq!(config.proxy.upstream_timeout(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_empty_backend_list() {
        let config: Config = serde_json::from_str(r#"{"backends": []}"#).unwrap();

        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_weight() {
        let config: Config = serde_json::from_str(
            r#"{"backends": [{"url": "http://127.0.0.1:8001", "weight": 0}]}"#,
        )
        .unwrap();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("weight"));
    }
}
