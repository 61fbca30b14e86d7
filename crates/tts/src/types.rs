use serde::{Deserialize, Serialize};

/// Body of `POST /tts`
#[derive(Debug, Deserialize)]
pub struct SpeechRequest {
    /// Text to synthesize into speech
    #[serde(default)]
    pub text: String,
    /// Account to use; when absent every configured account is tried in order
    #[serde(default, alias = "credential")]
    pub account: Option<String>,
    /// Voice identifier, passed through to the provider
    #[serde(default)]
    pub voice: Option<String>,
    /// Model identifier, passed through to the provider
    #[serde(default)]
    pub model: Option<String>,
}

/// Validated input handed to the failover dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    /// Trimmed, non-empty text
    pub text: String,
    /// Explicitly requested credential name
    pub credential: Option<String>,
    pub voice: Option<String>,
    pub model: Option<String>,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            credential: None,
            voice: None,
            model: None,
        }
    }

    #[must_use]
    pub fn with_credential(mut self, name: impl Into<String>) -> Self {
        self.credential = Some(name.into());
        self
    }
}

/// Audio returned by a successful downstream call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechAudio {
    /// Raw audio bytes
    pub bytes: Vec<u8>,
    /// Content type of the audio (e.g. "audio/mpeg")
    pub content_type: String,
}

/// Header naming the account that served the request
pub const ACCOUNT_HEADER: &str = "x-tts-account";

/// Successful gateway response
#[derive(Debug)]
pub struct SpeechResponse {
    pub audio: SpeechAudio,
    /// Name of the credential that absorbed the usage
    pub account: String,
}

impl SpeechResponse {
    /// Convert into an attachment response carrying the account header
    pub fn into_response(self) -> axum::response::Response {
        use axum::response::IntoResponse;

        axum::response::Response::builder()
            .header(http::header::CONTENT_TYPE, self.audio.content_type)
            .header(http::header::CONTENT_DISPOSITION, "attachment; filename=\"speech.mp3\"")
            .header(ACCOUNT_HEADER, self.account)
            .body(axum::body::Body::from(self.audio.bytes))
            .unwrap_or_else(|e| {
                tracing::error!("failed to build speech response: {e}");
                http::StatusCode::INTERNAL_SERVER_ERROR.into_response()
            })
    }
}

/// Body of `GET /`
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub status: &'static str,
    pub provider: &'static str,
    pub endpoint: &'static str,
    pub accounts: usize,
    pub message: String,
}
