//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: AUDIT_RELAY_)
//! 2. TOML file (./audit-relay.toml, or an explicit path via [`Config::load_from`])
//! 3. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    #[serde(default)]
    pub service: ServiceConfig,

    /// Message broker configuration
    #[serde(default)]
    pub broker: BrokerConfig,

    /// Audit formatting configuration
    #[serde(default)]
    pub audit: AuditConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            broker: BrokerConfig::default(),
            audit: AuditConfig::default(),
        }
    }
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

/// Message broker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Broker server URL
    #[serde(default = "default_broker_url")]
    pub url: String,

    /// Subject the audit events are published to
    #[serde(default = "default_queue")]
    pub queue: String,

    /// Connection name
    #[serde(default)]
    pub name: Option<String>,

    /// Max reconnection attempts once connected
    #[serde(default = "default_max_reconnects")]
    pub max_reconnects: usize,

    /// Maximum retry attempts for the initial connection
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay between retry attempts in seconds
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            url: default_broker_url(),
            queue: default_queue(),
            name: None,
            max_reconnects: default_max_reconnects(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay(),
        }
    }
}

/// Audit formatting configuration
///
/// These values become the immutable [`AuditLayout`](crate::audit::AuditLayout)
/// state at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Comma-separated allow-list of parameter keys included in
    /// `PARAMETERS` audit events
    #[serde(default)]
    pub interesting_keys: String,

    /// IANA time zone name used for audit timestamps
    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    /// Application label placed in every audit document
    #[serde(default = "default_application")]
    pub application: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            interesting_keys: String::new(),
            time_zone: default_time_zone(),
            application: default_application(),
        }
    }
}

impl AuditConfig {
    /// Split the configured comma-separated allow-list into a lookup set.
    ///
    /// Keys are matched verbatim, whitespace included, so `"a, b"` yields
    /// the keys `a` and ` b`.
    pub fn interesting_key_set(&self) -> HashSet<String> {
        self.interesting_keys
            .split(',')
            .map(str::to_string)
            .collect()
    }
}

// Default value functions
fn default_service_name() -> String {
    "audit-relay".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_broker_url() -> String {
    "nats://localhost:4222".to_string()
}

fn default_queue() -> String {
    "workflow.audit".to_string()
}

fn default_max_reconnects() -> usize {
    10
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_delay() -> u64 {
    2
}

fn default_time_zone() -> String {
    "UTC".to_string()
}

fn default_application() -> String {
    "Workflow Executor".to_string()
}

impl Config {
    /// Load configuration from the default file location and environment.
    ///
    /// Reads `./audit-relay.toml` if present. Environment variables
    /// (AUDIT_RELAY_ prefix) override file values.
    pub fn load() -> Result<Self> {
        Self::load_from("audit-relay.toml")
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &str) -> Result<Self> {
        let config = Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Config::default()))
            // Load from config file (if exists)
            .merge(Toml::file(path))
            // Override with environment variables
            .merge(Env::prefixed("AUDIT_RELAY_").split("_"))
            .extract()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.name, "audit-relay");
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.broker.url, "nats://localhost:4222");
        assert_eq!(config.broker.queue, "workflow.audit");
        assert_eq!(config.broker.max_retries, 5);
        assert_eq!(config.audit.time_zone, "UTC");
        assert_eq!(config.audit.application, "Workflow Executor");
        assert!(config.audit.interesting_keys.is_empty());
    }

    #[test]
    fn test_interesting_key_set_splits_on_commas() {
        let audit = AuditConfig {
            interesting_keys: "url,query,path".to_string(),
            ..AuditConfig::default()
        };
        let keys = audit.interesting_key_set();
        assert_eq!(keys.len(), 3);
        assert!(keys.contains("url"));
        assert!(keys.contains("query"));
        assert!(keys.contains("path"));
    }

    #[test]
    fn test_interesting_key_set_does_not_trim() {
        let audit = AuditConfig {
            interesting_keys: "url, query".to_string(),
            ..AuditConfig::default()
        };
        let keys = audit.interesting_key_set();
        assert!(keys.contains("url"));
        assert!(keys.contains(" query"));
        assert!(!keys.contains("query"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[service]
name = "relay-under-test"

[broker]
url = "nats://broker.internal:4222"
queue = "workflow.audit.test"
max_retries = 1

[audit]
interesting_keys = "url,password"
time_zone = "Europe/Madrid"
"#
        )
        .unwrap();

        let config = Config::load_from(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.service.name, "relay-under-test");
        assert_eq!(config.broker.url, "nats://broker.internal:4222");
        assert_eq!(config.broker.queue, "workflow.audit.test");
        assert_eq!(config.broker.max_retries, 1);
        assert_eq!(config.audit.time_zone, "Europe/Madrid");
        assert!(config.audit.interesting_key_set().contains("password"));
        // Unset fields keep their defaults
        assert_eq!(config.broker.max_reconnects, 10);
        assert_eq!(config.audit.application, "Workflow Executor");
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let config = Config::load_from("does-not-exist.toml").unwrap();
        assert_eq!(config.broker.queue, "workflow.audit");
    }
}
