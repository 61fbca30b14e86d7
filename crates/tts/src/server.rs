use std::{sync::Arc, time::Duration};

use voxgate_config::{TtsConfig, TtsProviderType};

use crate::{
    credential::CredentialPool,
    dispatch::{DispatchResult, FailoverDispatcher},
    error::TtsError,
    provider::{DownstreamClient, elevenlabs::ElevenLabsClient, openai_tts::OpenAiTtsClient},
    types::{ServiceInfo, SpeechRequest, SpeechResponse, SynthesisRequest},
};

/// Number of characters of input echoed into debug logs
const LOG_PREVIEW_CHARS: usize = 50;

/// TTS gateway: validates requests and relays them to the dispatcher
pub struct Server {
    dispatcher: FailoverDispatcher,
    provider: TtsProviderType,
    max_text_length: usize,
}

impl Server {
    /// Validate a speech request and dispatch it across the account pool
    ///
    /// Text is trimmed, must be non-empty and at most `max_text_length`
    /// characters. The response names the account that served it.
    pub async fn synthesize(&self, request: SpeechRequest) -> crate::error::Result<SpeechResponse> {
        let text = request.text.trim();

        if text.is_empty() {
            return Err(TtsError::InvalidRequest("No text provided".to_string()));
        }

        if text.chars().count() > self.max_text_length {
            return Err(TtsError::InvalidRequest(format!(
                "Text too long (max {} characters)",
                self.max_text_length
            )));
        }

        let preview: String = text.chars().take(LOG_PREVIEW_CHARS).collect();
        tracing::debug!(account = ?request.account, "generating speech for: {preview}");

        let synthesis = SynthesisRequest {
            text: text.to_owned(),
            credential: request.account,
            voice: request.voice,
            model: request.model,
        };

        let result = self.dispatcher.dispatch(&synthesis).await;

        tracing::debug!(
            success = result.is_success(),
            attempted = ?result.attempted(),
            "dispatch finished"
        );

        match result {
            DispatchResult::Success { audio, credential, .. } => Ok(SpeechResponse {
                audio,
                account: credential,
            }),
            DispatchResult::Failure(failure) => Err(TtsError::Dispatch(failure)),
        }
    }

    /// Service description served at `/`
    pub fn info(&self) -> ServiceInfo {
        ServiceInfo {
            status: "online",
            provider: self.provider.as_str(),
            endpoint: "/tts",
            accounts: self.dispatcher.pool().len(),
            message: "Send POST request to /tts with JSON body: {\"text\": \"your text here\"}".to_string(),
        }
    }
}

/// Builder for constructing the TTS server from configuration
pub struct TtsServerBuilder<'a> {
    config: &'a TtsConfig,
    client: Option<Arc<dyn DownstreamClient>>,
}

impl<'a> TtsServerBuilder<'a> {
    pub const fn new(config: &'a TtsConfig) -> Self {
        Self { config, client: None }
    }

    /// Use `client` instead of the provider named in configuration
    #[must_use]
    pub fn with_client(mut self, client: Arc<dyn DownstreamClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> crate::error::Result<Server> {
        let pool = CredentialPool::load(self.config).map_err(|e| TtsError::ConfigError(e.to_string()))?;

        let client = self.client.unwrap_or_else(|| provider_client(self.config));

        let dispatcher = FailoverDispatcher::new(Arc::new(pool), client, self.config.timeout);

        if dispatcher.pool().is_empty() {
            tracing::warn!("no TTS accounts configured, requests will fail until accounts are added");
        } else {
            tracing::info!(
                provider = self.config.provider.as_str(),
                accounts = dispatcher.pool().len(),
                timeout_ms = duration_ms(dispatcher.timeout()),
                worst_case_ms = duration_ms(dispatcher.worst_case_latency()),
                "TTS server initialized"
            );
        }

        Ok(Server {
            dispatcher,
            provider: self.config.provider,
            max_text_length: self.config.max_text_length,
        })
    }
}

fn provider_client(config: &TtsConfig) -> Arc<dyn DownstreamClient> {
    let (base_url, voice, model) = (config.base_url.clone(), config.voice.clone(), config.model.clone());

    match config.provider {
        TtsProviderType::Elevenlabs => Arc::new(ElevenLabsClient::new(base_url, voice, model)),
        TtsProviderType::OpenaiTts => Arc::new(OpenAiTtsClient::new(base_url, voice, model)),
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
