//! Configuration management for the push relay.
//!
//! Loaded once at startup into an immutable struct shared by reference;
//! there is no global settings singleton. Environment variable names are
//! kept compatible with earlier deployments of this service.

use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use busload_core::storage::client::SupabaseConfig;
use busload_notify::ClientConfig;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.toml";

/// Complete service configuration with defaults, file, and environment
/// overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables (highest priority)
/// 2. Configuration file (`config.toml`)
/// 3. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Managed store
    /// Base URL of the managed document store.
    ///
    /// Environment variable: `SUPABASE_URL`
    #[serde(default, alias = "SUPABASE_URL")]
    pub supabase_url: String,
    /// Service key for the managed document store.
    ///
    /// Environment variable: `SUPABASE_KEY`
    #[serde(default, alias = "SUPABASE_KEY")]
    pub supabase_key: String,
    /// Timeout for store round trips in seconds.
    ///
    /// Environment variable: `STORAGE_TIMEOUT_SECONDS`
    #[serde(default = "default_storage_timeout", alias = "STORAGE_TIMEOUT_SECONDS")]
    pub storage_timeout_seconds: u64,

    // Authentication
    /// Static bearer token required on protected routes.
    ///
    /// Environment variable: `BEARER_TOKEN`
    #[serde(default, alias = "BEARER_TOKEN")]
    pub bearer_token: String,

    // Webhook dispatch
    /// Receiver URL for new-record notifications. Unset disables
    /// dispatch entirely.
    ///
    /// Environment variable: `FRONTEND_WEBHOOK_URL`
    #[serde(default, alias = "FRONTEND_WEBHOOK_URL")]
    pub frontend_webhook_url: Option<String>,
    /// Shared secret embedded in every notification.
    ///
    /// Environment variable: `WEBHOOK_SECRET`
    #[serde(default, alias = "WEBHOOK_SECRET")]
    pub webhook_secret: Option<String>,
    /// Fixed timeout for webhook delivery in seconds.
    ///
    /// Environment variable: `WEBHOOK_TIMEOUT_SECONDS`
    #[serde(default = "default_webhook_timeout", alias = "WEBHOOK_TIMEOUT_SECONDS")]
    pub webhook_timeout_seconds: u64,
    /// Upper bound on concurrent outbound webhook requests.
    ///
    /// Environment variable: `WEBHOOK_MAX_CONNECTIONS`
    #[serde(default = "default_webhook_max_connections", alias = "WEBHOOK_MAX_CONNECTIONS")]
    pub webhook_max_connections: usize,
    /// Idle keep-alive connections retained after use.
    ///
    /// Environment variable: `WEBHOOK_POOL_MAX_IDLE`
    #[serde(default = "default_webhook_pool_max_idle", alias = "WEBHOOK_POOL_MAX_IDLE")]
    pub webhook_pool_max_idle: usize,
    /// Keep-alive idle timeout in seconds.
    ///
    /// Environment variable: `WEBHOOK_POOL_IDLE_TIMEOUT_SECONDS`
    #[serde(
        default = "default_webhook_pool_idle_timeout",
        alias = "WEBHOOK_POOL_IDLE_TIMEOUT_SECONDS"
    )]
    pub webhook_pool_idle_timeout_seconds: u64,
    /// Whether multiplexed HTTP/2 transport is used for dispatch.
    ///
    /// Environment variable: `WEBHOOK_HTTP2`
    #[serde(default, alias = "WEBHOOK_HTTP2")]
    pub webhook_http2: bool,

    // Server
    /// Server bind address.
    ///
    /// Environment variable: `HOST`
    #[serde(default = "default_host", alias = "HOST")]
    pub host: String,
    /// Server bind port.
    ///
    /// Environment variable: `PORT`
    #[serde(default = "default_port", alias = "PORT")]
    pub port: u16,
    /// Inbound request timeout in seconds.
    ///
    /// Environment variable: `REQUEST_TIMEOUT`
    #[serde(default = "default_request_timeout", alias = "REQUEST_TIMEOUT")]
    pub request_timeout: u64,

    // Runtime
    /// Deployment environment label.
    ///
    /// Environment variable: `ENVIRONMENT`
    #[serde(default = "default_environment", alias = "ENVIRONMENT")]
    pub environment: String,
    /// Tracing filter directives; drives the subscriber at startup.
    ///
    /// Environment variable: `RUST_LOG`
    #[serde(default = "default_log_level", alias = "RUST_LOG")]
    pub rust_log: String,
}

impl Config {
    /// Loads configuration from defaults, config file, and environment
    /// variable overrides, then validates it.
    ///
    /// # Errors
    ///
    /// Fails when extraction fails or a required value is missing or out
    /// of range.
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(""));

        let config: Self = figment.extract().context("failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Converts to the store adapter configuration.
    pub fn to_supabase_config(&self) -> SupabaseConfig {
        SupabaseConfig {
            base_url: self.supabase_url.clone(),
            service_key: self.supabase_key.clone(),
            timeout: Duration::from_secs(self.storage_timeout_seconds),
        }
    }

    /// Converts to the webhook client configuration.
    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.webhook_timeout_seconds),
            user_agent: format!("busload/{}", env!("CARGO_PKG_VERSION")),
            max_connections: self.webhook_max_connections,
            pool_max_idle: self.webhook_pool_max_idle,
            pool_idle_timeout: Duration::from_secs(self.webhook_pool_idle_timeout_seconds),
            http2_prior_knowledge: self.webhook_http2,
        }
    }

    /// Parses the server socket address from host and port.
    ///
    /// # Errors
    ///
    /// Fails when host and port do not form a valid socket address.
    pub fn parse_server_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr).context("invalid server address")
    }

    /// Validates configuration values.
    fn validate(&self) -> Result<()> {
        if self.supabase_url.is_empty() {
            anyhow::bail!("SUPABASE_URL must be set");
        }

        if self.supabase_key.is_empty() {
            anyhow::bail!("SUPABASE_KEY must be set");
        }

        if self.bearer_token.is_empty() {
            anyhow::bail!("BEARER_TOKEN must be set");
        }

        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        if self.webhook_timeout_seconds == 0 {
            anyhow::bail!("webhook timeout must be greater than 0");
        }

        if self.webhook_max_connections == 0 {
            anyhow::bail!("webhook max connections must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_key: String::new(),
            storage_timeout_seconds: default_storage_timeout(),
            bearer_token: String::new(),
            frontend_webhook_url: None,
            webhook_secret: None,
            webhook_timeout_seconds: default_webhook_timeout(),
            webhook_max_connections: default_webhook_max_connections(),
            webhook_pool_max_idle: default_webhook_pool_max_idle(),
            webhook_pool_idle_timeout_seconds: default_webhook_pool_idle_timeout(),
            webhook_http2: false,
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            environment: default_environment(),
            rust_log: default_log_level(),
        }
    }
}

fn default_storage_timeout() -> u64 {
    10
}

fn default_webhook_timeout() -> u64 {
    5
}

fn default_webhook_max_connections() -> usize {
    16
}

fn default_webhook_pool_max_idle() -> usize {
    8
}

fn default_webhook_pool_idle_timeout() -> u64 {
    90
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_log_level() -> String {
    "info,busload=debug,tower_http=debug".to_string()
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, env, sync::Mutex};

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    struct TestEnvGuard {
        _lock: std::sync::MutexGuard<'static, ()>,
        vars: Vec<String>,
        originals: HashMap<String, Option<String>>,
    }

    impl TestEnvGuard {
        fn new() -> Self {
            let lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            Self { _lock: lock, vars: Vec::new(), originals: HashMap::new() }
        }

        fn set_var(&mut self, key: &str, value: &str) {
            if !self.vars.contains(&key.to_string()) {
                self.originals.insert(key.to_string(), env::var(key).ok());
                self.vars.push(key.to_string());
            }
            env::set_var(key, value);
        }
    }

    impl Drop for TestEnvGuard {
        fn drop(&mut self) {
            for var in &self.vars {
                match self.originals.get(var) {
                    Some(Some(value)) => env::set_var(var, value),
                    Some(None) => env::remove_var(var),
                    None => {},
                }
            }
        }
    }

    fn required_env(guard: &mut TestEnvGuard) {
        guard.set_var("SUPABASE_URL", "https://project.supabase.co");
        guard.set_var("SUPABASE_KEY", "service-key");
        guard.set_var("BEARER_TOKEN", "push-token");
    }

    #[test]
    fn load_requires_store_and_token_settings() {
        let mut config = Config::default();
        assert!(config.validate().is_err());

        config.supabase_url = "https://project.supabase.co".to_string();
        config.supabase_key = "service-key".to_string();
        config.bearer_token = "push-token".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn env_overrides_are_applied() {
        let mut guard = TestEnvGuard::new();
        required_env(&mut guard);
        guard.set_var("PORT", "9100");
        guard.set_var("ENVIRONMENT", "production");
        guard.set_var("WEBHOOK_TIMEOUT_SECONDS", "8");
        guard.set_var("WEBHOOK_HTTP2", "true");

        let config = Config::load().expect("config should load");

        assert_eq!(config.port, 9100);
        assert_eq!(config.environment, "production");
        assert_eq!(config.webhook_timeout_seconds, 8);
        assert!(config.webhook_http2);
    }

    #[test]
    fn webhook_secret_is_optional() {
        let mut guard = TestEnvGuard::new();
        required_env(&mut guard);
        guard.set_var("FRONTEND_WEBHOOK_URL", "https://frontend.example/api/webhook");

        let config = Config::load().expect("config should load");

        assert_eq!(
            config.frontend_webhook_url.as_deref(),
            Some("https://frontend.example/api/webhook")
        );
        assert!(config.webhook_secret.is_none());
    }

    #[test]
    fn rust_log_override_reaches_the_config() {
        let mut guard = TestEnvGuard::new();
        required_env(&mut guard);
        guard.set_var("RUST_LOG", "warn,busload=info");

        let config = Config::load().expect("config should load");

        assert_eq!(config.rust_log, "warn,busload=info");
    }

    #[test]
    fn client_config_mirrors_pool_knobs() {
        let mut config = Config::default();
        config.webhook_timeout_seconds = 7;
        config.webhook_max_connections = 32;
        config.webhook_pool_max_idle = 4;
        config.webhook_pool_idle_timeout_seconds = 120;
        config.webhook_http2 = true;

        let client = config.to_client_config();

        assert_eq!(client.timeout, Duration::from_secs(7));
        assert_eq!(client.max_connections, 32);
        assert_eq!(client.pool_max_idle, 4);
        assert_eq!(client.pool_idle_timeout, Duration::from_secs(120));
        assert!(client.http2_prior_knowledge);
    }

    #[test]
    fn socket_address_parsing() {
        let mut config = Config::default();
        config.host = "127.0.0.1".to_string();
        config.port = 9000;

        let addr = config.parse_server_addr().expect("should parse");

        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 9000);
    }

    #[test]
    fn zero_port_is_rejected() {
        let mut guard = TestEnvGuard::new();
        required_env(&mut guard);
        guard.set_var("PORT", "0");

        assert!(Config::load().is_err());
    }
}
