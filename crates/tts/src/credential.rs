//! Named credentials for one downstream TTS service
//!
//! The pool is built once at startup and only read afterwards. Its order
//! is the order accounts were declared in, which is also the failover order.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use voxgate_config::{DiscoverConfig, TtsConfig};

/// Errors raised while building a [`CredentialPool`]
#[derive(Debug, Error)]
pub enum PoolError {
    /// Two entries resolved to the same account name
    #[error("duplicate credential name '{0}'")]
    DuplicateName(String),

    /// No usable credential was found and the caller requires at least one
    #[error("no credentials configured")]
    Empty,
}

/// A named secret authorizing calls to the downstream service
#[derive(Debug, Clone)]
pub struct Credential {
    name: String,
    secret: SecretString,
}

impl Credential {
    pub fn new(name: impl Into<String>, secret: SecretString) -> Self {
        Self {
            name: name.into(),
            secret,
        }
    }

    /// Stable, human-readable account name (e.g. `account_1`)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn secret(&self) -> &SecretString {
        &self.secret
    }
}

/// Ordered, read-only set of interchangeable credentials
#[derive(Debug, Default)]
pub struct CredentialPool {
    credentials: Vec<Credential>,
}

impl CredentialPool {
    /// Build a pool from `(name, secret)` pairs, keeping their order
    ///
    /// Entries without a secret, or with a blank one, are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::DuplicateName`] if a name appears twice among
    /// the kept entries
    pub fn from_entries<I, N>(entries: I) -> Result<Self, PoolError>
    where
        I: IntoIterator<Item = (N, Option<SecretString>)>,
        N: Into<String>,
    {
        let mut credentials: Vec<Credential> = Vec::new();

        for (name, secret) in entries {
            let name = name.into();

            let Some(secret) = secret.filter(|s| !s.expose_secret().trim().is_empty()) else {
                tracing::debug!(credential = %name, "skipping credential without a secret");
                continue;
            };

            if credentials.iter().any(|c| c.name == name) {
                return Err(PoolError::DuplicateName(name));
            }

            credentials.push(Credential::new(name, secret));
        }

        Ok(Self { credentials })
    }

    /// Load the pool from TTS configuration
    ///
    /// Explicit `accounts` come first, followed by any accounts discovered
    /// from numbered environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::DuplicateName`] on a name clash, and
    /// [`PoolError::Empty`] when the pool ends up empty while
    /// `require_accounts` is set
    pub fn load(config: &TtsConfig) -> Result<Self, PoolError> {
        let explicit = config
            .accounts
            .iter()
            .map(|account| (account.name.clone(), account.api_key.clone()));

        let discovered = config.discover.as_ref().map(discover).unwrap_or_default();

        let pool = Self::from_entries(explicit.chain(discovered))?;

        if pool.is_empty() && config.require_accounts {
            return Err(PoolError::Empty);
        }

        let names: Vec<&str> = pool.names().collect();
        tracing::debug!(credentials = ?names, "credential pool loaded");

        Ok(pool)
    }

    /// Find a credential by name
    pub fn lookup(&self, name: &str) -> Option<&Credential> {
        self.credentials.iter().find(|c| c.name == name)
    }

    /// All credentials in failover order
    pub fn all(&self) -> &[Credential] {
        &self.credentials
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.credentials.iter().map(Credential::name)
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}

/// Read `{prefix}1 ..= {prefix}{max_accounts}` from the environment
fn discover(config: &DiscoverConfig) -> Vec<(String, Option<SecretString>)> {
    (1..=config.max_accounts)
        .map(|index| {
            let secret = std::env::var(format!("{}{index}", config.prefix))
                .ok()
                .map(SecretString::from);

            (format!("account_{index}"), secret)
        })
        .collect()
}
