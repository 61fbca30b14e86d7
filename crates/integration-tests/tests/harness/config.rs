//! Programmatic configuration builder for integration tests

use std::{net::SocketAddr, time::Duration};

use secrecy::SecretString;
use voxgate_config::{AccountConfig, Config, ServerConfig, TtsConfig, TtsProviderType};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder pointed at a mock TTS backend
    pub fn new(base_url: &str) -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    ..ServerConfig::default()
                },
                tts: TtsConfig {
                    base_url: Some(base_url.to_owned()),
                    timeout: Duration::from_secs(5),
                    ..TtsConfig::default()
                },
                telemetry: None,
            },
        }
    }

    /// Append an account; its API key doubles as the mock's behavior key
    pub fn with_account(mut self, name: &str, api_key: &str) -> Self {
        self.config.tts.accounts.push(AccountConfig {
            name: name.to_owned(),
            api_key: Some(SecretString::from(api_key)),
        });
        self
    }

    pub fn with_provider(mut self, provider: TtsProviderType) -> Self {
        self.config.tts.provider = provider;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.tts.timeout = timeout;
        self
    }

    pub fn with_max_text_length(mut self, max: usize) -> Self {
        self.config.tts.max_text_length = max;
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
