use std::time::Duration;

use async_trait::async_trait;
use http::StatusCode;
use reqwest::{Client, Url};
use secrecy::ExposeSecret;

use crate::{credential::Credential, http_client::http_client, types::SynthesisRequest};

use super::{AttemptOutcome, DownstreamClient, classify_status, read_response, transport_error};

const DEFAULT_ELEVENLABS_API_URL: &str = "https://api.elevenlabs.io/v1";
const DEFAULT_VOICE: &str = "21m00Tcm4TlvDq8ikWAM";
const DEFAULT_MODEL: &str = "eleven_multilingual_v2";

/// `ElevenLabs` text-to-speech client
pub struct ElevenLabsClient {
    client: Client,
    base_url: String,
    voice: String,
    model: String,
}

impl ElevenLabsClient {
    pub fn new(base_url: Option<String>, voice: Option<String>, model: Option<String>) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_ELEVENLABS_API_URL.to_string()),
            voice: voice.unwrap_or_else(|| DEFAULT_VOICE.to_string()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }
}

#[derive(serde::Serialize)]
struct ElevenLabsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

/// Speech endpoint for `voice`
///
/// The voice is pushed as one percent-encoded path segment, so `/`, `?`
/// and `#` in it cannot reach another endpoint.
fn speech_url(base_url: &str, voice: &str) -> Result<Url, String> {
    let mut url = Url::parse(base_url).map_err(|e| format!("invalid base URL {base_url}: {e}"))?;

    url.path_segments_mut()
        .map_err(|()| format!("base URL {base_url} cannot carry a path"))?
        .pop_if_empty()
        .push("text-to-speech")
        .push(voice);

    Ok(url)
}

/// `ElevenLabs` reports an exhausted character quota as a 401 whose
/// `detail.status` is `quota_exceeded`, so that case is not a bad key
fn classify(status: StatusCode, body: &str) -> AttemptOutcome {
    if status == StatusCode::UNAUTHORIZED && body.contains("quota_exceeded") {
        return AttemptOutcome::QuotaExceeded;
    }

    classify_status(status, body)
}

#[async_trait]
impl DownstreamClient for ElevenLabsClient {
    async fn synthesize(
        &self,
        request: &SynthesisRequest,
        credential: &Credential,
        timeout: Duration,
    ) -> AttemptOutcome {
        let voice = request.voice.as_deref().unwrap_or(&self.voice);
        let model = request.model.as_deref().unwrap_or(&self.model);
        let url = match speech_url(&self.base_url, voice) {
            Ok(url) => url,
            Err(e) => return AttemptOutcome::TransportError(e),
        };

        tracing::debug!(
            credential = credential.name(),
            model,
            voice,
            input_len = request.text.len(),
            "ElevenLabs TTS request"
        );

        let body = ElevenLabsRequest {
            text: &request.text,
            model_id: model,
        };

        let response = self
            .client
            .post(url)
            .timeout(timeout)
            .header("xi-api-key", credential.secret().expose_secret())
            .header(http::header::ACCEPT, "audio/mpeg")
            .json(&body)
            .send()
            .await;

        match response {
            Ok(response) => read_response(self.name(), response, timeout, classify).await,
            Err(e) => transport_error(self.name(), &e, timeout),
        }
    }

    fn name(&self) -> &str {
        "elevenlabs"
    }
}
