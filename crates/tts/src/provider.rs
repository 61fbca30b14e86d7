pub mod elevenlabs;
pub mod openai_tts;

use std::time::Duration;

use async_trait::async_trait;
use http::StatusCode;

use crate::{
    credential::Credential,
    types::{SpeechAudio, SynthesisRequest},
};

/// Longest provider error body kept in an outcome
const MAX_DETAIL_BYTES: usize = 512;

/// Classified result of exactly one downstream call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success(SpeechAudio),
    /// The provider rejected the credential
    Unauthorized,
    /// The credential's usage allowance or rate limit is exhausted
    QuotaExceeded,
    /// Any other non-success status
    ProviderError { status: u16, detail: String },
    /// Connection failure, timeout, or an unreadable body
    TransportError(String),
}

/// Variant of an [`AttemptOutcome`] without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Success,
    Unauthorized,
    QuotaExceeded,
    ProviderError,
    TransportError,
}

impl AttemptOutcome {
    pub const fn kind(&self) -> OutcomeKind {
        match self {
            Self::Success(_) => OutcomeKind::Success,
            Self::Unauthorized => OutcomeKind::Unauthorized,
            Self::QuotaExceeded => OutcomeKind::QuotaExceeded,
            Self::ProviderError { .. } => OutcomeKind::ProviderError,
            Self::TransportError(_) => OutcomeKind::TransportError,
        }
    }

    /// Short description for logs and failure details
    pub fn describe(&self) -> String {
        match self {
            Self::Success(audio) => format!("success ({} bytes)", audio.bytes.len()),
            Self::Unauthorized => "unauthorized".to_string(),
            Self::QuotaExceeded => "quota exceeded".to_string(),
            Self::ProviderError { status, detail } => format!("provider error ({status}): {detail}"),
            Self::TransportError(detail) => format!("transport error: {detail}"),
        }
    }
}

/// One synthesis call against the downstream service
///
/// Implementations perform a single request with the given credential and
/// never retry; retry policy belongs to the dispatcher.
#[async_trait]
pub trait DownstreamClient: Send + Sync {
    /// Synthesize `request.text`, giving up after `timeout`
    async fn synthesize(&self, request: &SynthesisRequest, credential: &Credential, timeout: Duration)
    -> AttemptOutcome;

    /// Get the provider name
    fn name(&self) -> &str;
}

/// Generic classification of a non-success status
pub(crate) fn classify_status(status: StatusCode, body: &str) -> AttemptOutcome {
    match status {
        StatusCode::UNAUTHORIZED => AttemptOutcome::Unauthorized,
        StatusCode::TOO_MANY_REQUESTS => AttemptOutcome::QuotaExceeded,
        _ => AttemptOutcome::ProviderError {
            status: status.as_u16(),
            detail: truncate(body),
        },
    }
}

/// Map a `reqwest` send failure to a transport outcome
pub(crate) fn transport_error(provider: &str, error: &reqwest::Error, timeout: Duration) -> AttemptOutcome {
    if error.is_timeout() {
        AttemptOutcome::TransportError(format!("{provider} request timed out after {}ms", timeout.as_millis()))
    } else {
        AttemptOutcome::TransportError(format!("failed to reach {provider}: {error}"))
    }
}

/// Turn a downstream response into an outcome
///
/// `classify` decides non-success statuses; success bodies are read in full.
pub(crate) async fn read_response(
    provider: &str,
    response: reqwest::Response,
    timeout: Duration,
    classify: impl FnOnce(StatusCode, &str) -> AttemptOutcome,
) -> AttemptOutcome {
    let status = response.status();

    if !status.is_success() {
        let body = read_detail(response).await;
        return classify(status, &body);
    }

    let content_type = response
        .headers()
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("audio/mpeg")
        .to_string();

    match response.bytes().await {
        Ok(bytes) => AttemptOutcome::Success(SpeechAudio {
            bytes: bytes.to_vec(),
            content_type,
        }),
        Err(e) => transport_error(provider, &e, timeout),
    }
}

/// Read at most one byte past [`MAX_DETAIL_BYTES`] of an error body
///
/// The rest of the body is dropped unread.
async fn read_detail(mut response: reqwest::Response) -> String {
    let mut buf = Vec::with_capacity(MAX_DETAIL_BYTES + 1);

    while buf.len() <= MAX_DETAIL_BYTES {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                let take = chunk.len().min(MAX_DETAIL_BYTES + 1 - buf.len());
                buf.extend_from_slice(&chunk[..take]);
            }
            Ok(None) => break,
            Err(_) if buf.is_empty() => return "Unknown error".to_string(),
            Err(_) => break,
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

/// Cut `body` to at most [`MAX_DETAIL_BYTES`] on a char boundary
fn truncate(body: &str) -> String {
    let body = body.trim();
    if body.len() <= MAX_DETAIL_BYTES {
        return body.to_string();
    }

    let mut end = MAX_DETAIL_BYTES;
    while !body.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}...", &body[..end])
}
