use std::{collections::HashSet, path::Path};

use crate::{Config, MAX_DISCOVER_ACCOUNTS};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if account names repeat or TTS limits are zero
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_tts_limits()?;
        self.validate_accounts()?;
        Ok(())
    }

    fn validate_tts_limits(&self) -> anyhow::Result<()> {
        if self.tts.timeout.is_zero() {
            anyhow::bail!("tts.timeout must be greater than zero");
        }

        if self.tts.max_text_length == 0 {
            anyhow::bail!("tts.max_text_length must be greater than zero");
        }

        Ok(())
    }

    fn validate_accounts(&self) -> anyhow::Result<()> {
        let mut seen = HashSet::new();

        for account in &self.tts.accounts {
            if account.name.trim().is_empty() {
                anyhow::bail!("tts account names must not be empty");
            }

            if !seen.insert(account.name.as_str()) {
                anyhow::bail!("duplicate tts account name '{}'", account.name);
            }
        }

        if let Some(ref discover) = self.tts.discover {
            if discover.prefix.is_empty() {
                anyhow::bail!("tts.discover.prefix must not be empty");
            }

            if discover.max_accounts > MAX_DISCOVER_ACCOUNTS {
                anyhow::bail!("tts.discover.max_accounts must be at most {MAX_DISCOVER_ACCOUNTS}");
            }
        }

        tracing::debug!(
            accounts = self.tts.accounts.len(),
            discover = self.tts.discover.is_some(),
            "tts account configuration validated"
        );

        Ok(())
    }
}
