//! Session Configuration

use std::sync::Arc;
use std::time::Duration;

use inkfont_net::{ClientConfig, HttpClient, NetError, Transport};

/// Where and how to reach the font service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Backend root URL
    pub server: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// User agent override
    pub user_agent: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: "http://127.0.0.1:5000".into(),
            timeout: Duration::from_secs(120),
            user_agent: None,
        }
    }
}

impl Config {
    pub const SERVER_VAR: &'static str = "INKFONT_SERVER";
    pub const TIMEOUT_VAR: &'static str = "INKFONT_TIMEOUT_SECS";
    pub const USER_AGENT_VAR: &'static str = "INKFONT_USER_AGENT";

    /// Defaults overlaid with `INKFONT_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(server) = lookup(Self::SERVER_VAR).filter(|s| !s.trim().is_empty()) {
            config.server = server.trim().to_string();
        }
        if let Some(raw) = lookup(Self::TIMEOUT_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => tracing::warn!("Ignoring {}={:?}: expected a positive number of seconds", Self::TIMEOUT_VAR, raw),
            }
        }
        if let Some(ua) = lookup(Self::USER_AGENT_VAR).filter(|s| !s.trim().is_empty()) {
            config.user_agent = Some(ua);
        }
        config
    }

    pub fn server(mut self, server: &str) -> Self {
        self.server = server.to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn client_config(&self) -> ClientConfig {
        let mut client = ClientConfig {
            base_url: self.server.clone(),
            request_timeout: self.timeout,
            ..Default::default()
        };
        if let Some(ua) = &self.user_agent {
            client.user_agent = ua.clone();
        }
        client
    }

    /// HTTP transport for this configuration
    pub fn connect(&self) -> Result<Arc<dyn Transport>, NetError> {
        Ok(Arc::new(HttpClient::with_config(self.client_config())?))
    }
}
