use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;

use crate::{credential::Credential, http_client::http_client, types::SynthesisRequest};

use super::{AttemptOutcome, DownstreamClient, classify_status, read_response, transport_error};

const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1";
const DEFAULT_VOICE: &str = "alloy";
const DEFAULT_MODEL: &str = "tts-1";

/// `OpenAI` speech client
pub struct OpenAiTtsClient {
    client: Client,
    base_url: String,
    voice: String,
    model: String,
}

impl OpenAiTtsClient {
    pub fn new(base_url: Option<String>, voice: Option<String>, model: Option<String>) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_OPENAI_API_URL.to_string()),
            voice: voice.unwrap_or_else(|| DEFAULT_VOICE.to_string()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }
}

#[derive(serde::Serialize)]
struct OpenAiTtsRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

#[async_trait]
impl DownstreamClient for OpenAiTtsClient {
    async fn synthesize(
        &self,
        request: &SynthesisRequest,
        credential: &Credential,
        timeout: Duration,
    ) -> AttemptOutcome {
        let url = format!("{}/audio/speech", self.base_url);

        let body = OpenAiTtsRequest {
            model: request.model.as_deref().unwrap_or(&self.model),
            input: &request.text,
            voice: request.voice.as_deref().unwrap_or(&self.voice),
            response_format: "mp3",
        };

        tracing::debug!(
            credential = credential.name(),
            model = body.model,
            voice = body.voice,
            input_len = request.text.len(),
            "OpenAI TTS request"
        );

        let response = self
            .client
            .post(&url)
            .timeout(timeout)
            .bearer_auth(credential.secret().expose_secret())
            .json(&body)
            .send()
            .await;

        match response {
            Ok(response) => read_response(self.name(), response, timeout, classify_status).await,
            Err(e) => transport_error(self.name(), &e, timeout),
        }
    }

    fn name(&self) -> &str {
        "openai_tts"
    }
}
