#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod credential;
mod dispatch;
mod error;
mod http_client;
mod provider;
mod request;
mod server;
mod types;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

pub use credential::{Credential, CredentialPool, PoolError};
pub use dispatch::{DispatchFailure, DispatchResult, FailoverDispatcher, ReasonCode};
pub use error::{Result, TtsError};
pub use provider::{
    AttemptOutcome, DownstreamClient, OutcomeKind, elevenlabs::ElevenLabsClient, openai_tts::OpenAiTtsClient,
};
pub use server::{Server, TtsServerBuilder};
pub use types::{ACCOUNT_HEADER, ServiceInfo, SpeechAudio, SpeechRequest, SpeechResponse, SynthesisRequest};
use request::ExtractPayload;

/// Build the TTS server from configuration
pub fn build_server(config: &voxgate_config::Config) -> anyhow::Result<Arc<Server>> {
    let server = Arc::new(
        TtsServerBuilder::new(&config.tts)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to initialize TTS server: {e}"))?,
    );
    Ok(server)
}

/// Create the endpoint router for TTS
pub fn endpoint_router() -> Router<Arc<Server>> {
    Router::new().route("/", get(info)).route("/tts", post(synthesize))
}

async fn info(State(server): State<Arc<Server>>) -> Json<ServiceInfo> {
    Json(server.info())
}

/// Handle speech synthesis requests
async fn synthesize(
    State(server): State<Arc<Server>>,
    ExtractPayload(request): ExtractPayload<SpeechRequest>,
) -> Result<axum::response::Response> {
    let response = server.synthesize(request).await?;

    tracing::debug!(account = %response.account, "speech synthesis complete");

    Ok(response.into_response())
}
