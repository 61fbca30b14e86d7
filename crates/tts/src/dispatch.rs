//! Multi-credential failover dispatch
//!
//! Given a pool of interchangeable credentials for one downstream service,
//! pick the candidates for a request, try them strictly one at a time in
//! pool order, and report which credential served the audio.
//!
//! Attempts are sequential and the winner is the first successful
//! credential in pool order. Worst-case latency is `pool size × per-call
//! timeout`.

use std::{sync::Arc, time::Duration};

use serde::Serialize;

use crate::{
    credential::{Credential, CredentialPool},
    provider::{AttemptOutcome, DownstreamClient, OutcomeKind},
    types::{SpeechAudio, SynthesisRequest},
};

/// Terminal failure classification handed to the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    /// The pool is empty and no account was named
    NoCredentials,
    /// The named account is not in the pool
    UnknownCredential,
    /// The named account was rejected by the provider
    Unauthorized,
    /// The named account is out of quota or rate limited
    QuotaExceeded,
    /// The provider returned another error for the named account
    ProviderError,
    /// The named account could not reach the provider
    TransportError,
    /// Every account in the pool was tried and none succeeded
    Exhausted,
}

impl ReasonCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoCredentials => "no_credentials",
            Self::UnknownCredential => "unknown_credential",
            Self::Unauthorized => "unauthorized",
            Self::QuotaExceeded => "quota_exceeded",
            Self::ProviderError => "provider_error",
            Self::TransportError => "transport_error",
            Self::Exhausted => "exhausted",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a dispatch did not produce audio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchFailure {
    pub reason: ReasonCode,
    /// Human-readable detail, including the last observed outcome
    pub detail: String,
    /// Classification of the last attempt, if any attempt was made
    pub last_outcome: Option<OutcomeKind>,
    /// Credentials tried, in order
    pub attempted: Vec<String>,
}

/// Terminal result of a dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    Success {
        audio: SpeechAudio,
        /// Credential that produced the audio
        credential: String,
        /// Credentials tried, in order, ending with `credential`
        attempted: Vec<String>,
    },
    Failure(DispatchFailure),
}

impl DispatchResult {
    fn failure(reason: ReasonCode, detail: String, last_outcome: Option<OutcomeKind>, attempted: Vec<String>) -> Self {
        Self::Failure(DispatchFailure {
            reason,
            detail,
            last_outcome,
            attempted,
        })
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Credentials tried, in order
    pub fn attempted(&self) -> &[String] {
        match self {
            Self::Success { attempted, .. } | Self::Failure(DispatchFailure { attempted, .. }) => attempted,
        }
    }
}

/// Drives a [`CredentialPool`] and a [`DownstreamClient`] through the
/// selection and failover algorithm
#[derive(Clone)]
pub struct FailoverDispatcher {
    pool: Arc<CredentialPool>,
    client: Arc<dyn DownstreamClient>,
    timeout: Duration,
}

impl FailoverDispatcher {
    /// Create a dispatcher
    ///
    /// `timeout` bounds every downstream call and must be non-zero; a
    /// zero value is replaced by one second.
    pub fn new(pool: Arc<CredentialPool>, client: Arc<dyn DownstreamClient>, timeout: Duration) -> Self {
        let timeout = if timeout.is_zero() {
            tracing::warn!("zero downstream timeout replaced with 1s");
            Duration::from_secs(1)
        } else {
            timeout
        };

        Self { pool, client, timeout }
    }

    pub fn pool(&self) -> &CredentialPool {
        &self.pool
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Upper bound on the time one unattended dispatch can take
    pub fn worst_case_latency(&self) -> Duration {
        let candidates = u32::try_from(self.pool.len()).unwrap_or(u32::MAX);
        self.timeout.saturating_mul(candidates)
    }

    /// Dispatch a request
    ///
    /// With a named credential only that credential is tried and its
    /// outcome is final. Without one, the whole pool is tried in order,
    /// stopping at the first success. Never fails: every outcome is
    /// reported through [`DispatchResult`].
    pub async fn dispatch(&self, request: &SynthesisRequest) -> DispatchResult {
        match request.credential.as_deref() {
            Some(name) => self.dispatch_named(name, request).await,
            None => self.dispatch_pool(request).await,
        }
    }

    async fn dispatch_named(&self, name: &str, request: &SynthesisRequest) -> DispatchResult {
        let Some(credential) = self.pool.lookup(name) else {
            tracing::warn!(credential = name, "requested credential is not configured");
            return DispatchResult::failure(
                ReasonCode::UnknownCredential,
                format!("unknown credential name '{name}'"),
                None,
                Vec::new(),
            );
        };

        let outcome = self.attempt(request, credential).await;
        let attempted = vec![credential.name().to_owned()];
        let kind = outcome.kind();
        let detail = format!("{}: {}", credential.name(), outcome.describe());

        let reason = match outcome {
            AttemptOutcome::Success(audio) => {
                return DispatchResult::Success {
                    audio,
                    credential: credential.name().to_owned(),
                    attempted,
                };
            }
            AttemptOutcome::Unauthorized => ReasonCode::Unauthorized,
            AttemptOutcome::QuotaExceeded => ReasonCode::QuotaExceeded,
            AttemptOutcome::ProviderError { .. } => ReasonCode::ProviderError,
            AttemptOutcome::TransportError(_) => ReasonCode::TransportError,
        };

        DispatchResult::failure(reason, detail, Some(kind), attempted)
    }

    async fn dispatch_pool(&self, request: &SynthesisRequest) -> DispatchResult {
        if self.pool.is_empty() {
            tracing::warn!("dispatch requested with no credentials configured");
            return DispatchResult::failure(
                ReasonCode::NoCredentials,
                "no credentials configured".to_owned(),
                None,
                Vec::new(),
            );
        }

        let mut attempted = Vec::with_capacity(self.pool.len());
        let mut last: Option<(OutcomeKind, String)> = None;

        for credential in self.pool.all() {
            attempted.push(credential.name().to_owned());

            let outcome = self.attempt(request, credential).await;
            let kind = outcome.kind();

            match outcome {
                AttemptOutcome::Success(audio) => {
                    return DispatchResult::Success {
                        audio,
                        credential: credential.name().to_owned(),
                        attempted,
                    };
                }
                // Every failure moves on to the next credential
                failed @ (AttemptOutcome::Unauthorized
                | AttemptOutcome::QuotaExceeded
                | AttemptOutcome::ProviderError { .. }
                | AttemptOutcome::TransportError(_)) => {
                    last = Some((kind, format!("{}: {}", credential.name(), failed.describe())));
                }
            }
        }

        let (last_kind, last_detail) = last.map_or((None, String::new()), |(kind, detail)| (Some(kind), detail));

        tracing::warn!(
            attempts = attempted.len(),
            last = %last_detail,
            "all credentials exhausted"
        );

        DispatchResult::failure(
            ReasonCode::Exhausted,
            format!("all {} credentials failed; last {last_detail}", attempted.len()),
            last_kind,
            attempted,
        )
    }

    /// One downstream call, logged with its classification
    async fn attempt(&self, request: &SynthesisRequest, credential: &Credential) -> AttemptOutcome {
        let outcome = self.client.synthesize(request, credential, self.timeout).await;

        match &outcome {
            AttemptOutcome::Success(audio) => tracing::info!(
                provider = self.client.name(),
                credential = credential.name(),
                bytes = audio.bytes.len(),
                "speech synthesized"
            ),
            AttemptOutcome::Unauthorized | AttemptOutcome::QuotaExceeded => tracing::warn!(
                provider = self.client.name(),
                credential = credential.name(),
                outcome = %outcome.describe(),
                "credential unavailable"
            ),
            AttemptOutcome::ProviderError { .. } | AttemptOutcome::TransportError(_) => tracing::warn!(
                provider = self.client.name(),
                credential = credential.name(),
                outcome = %outcome.describe(),
                "downstream call failed"
            ),
        }

        outcome
    }
}
