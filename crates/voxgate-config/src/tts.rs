use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

/// Default per-call downstream timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default maximum accepted text length, in characters
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 1000;

/// Default upper bound for environment-discovered accounts
pub const DEFAULT_MAX_ACCOUNTS: usize = 10;

/// Largest accepted `discover.max_accounts`
pub const MAX_DISCOVER_ACCOUNTS: usize = 100;

/// Top-level TTS configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TtsConfig {
    /// Downstream provider kind shared by every account
    #[serde(default)]
    pub provider: TtsProviderType,
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<String>,
    /// Default model passed through to the provider
    #[serde(default)]
    pub model: Option<String>,
    /// Default voice passed through to the provider
    #[serde(default)]
    pub voice: Option<String>,
    /// Timeout applied to every downstream call
    #[serde(default = "default_timeout", deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
    /// Maximum accepted text length, in characters
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,
    /// Refuse to start when no account ends up configured
    #[serde(default)]
    pub require_accounts: bool,
    /// Explicit accounts, in failover order
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
    /// Environment-based account discovery, appended after `accounts`
    #[serde(default)]
    pub discover: Option<DiscoverConfig>,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            provider: TtsProviderType::default(),
            base_url: None,
            model: None,
            voice: None,
            timeout: DEFAULT_TIMEOUT,
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
            require_accounts: false,
            accounts: Vec::new(),
            discover: None,
        }
    }
}

/// A single named account
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountConfig {
    /// Stable account name, e.g. `account_1`
    pub name: String,
    /// API key; absent or empty entries are skipped
    #[serde(default)]
    pub api_key: Option<SecretString>,
}

/// Discovery of numbered API keys from the process environment
///
/// With `prefix = "ELEVENLABS_API_KEY_"`, the variables
/// `ELEVENLABS_API_KEY_1` through `ELEVENLABS_API_KEY_{max_accounts}` are
/// read and become accounts `account_1` onwards.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiscoverConfig {
    /// Environment variable prefix
    pub prefix: String,
    /// Highest index probed
    #[serde(default = "default_max_accounts")]
    pub max_accounts: usize,
}

/// Supported TTS providers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TtsProviderType {
    /// `ElevenLabs`
    #[default]
    Elevenlabs,
    /// `OpenAI` TTS
    OpenaiTts,
}

impl TtsProviderType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Elevenlabs => "elevenlabs",
            Self::OpenaiTts => "openai_tts",
        }
    }
}

const fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

const fn default_max_text_length() -> usize {
    DEFAULT_MAX_TEXT_LENGTH
}

const fn default_max_accounts() -> usize {
    DEFAULT_MAX_ACCOUNTS
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    duration_str::parse(&raw).map_err(|e| serde::de::Error::custom(format!("invalid duration '{raw}': {e}")))
}
