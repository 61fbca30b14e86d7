//! Mock downstream TTS backend for integration tests
//!
//! Serves both the `ElevenLabs` and `OpenAI` speech routes. The API key on
//! each request selects a scripted behavior, and every call is recorded so
//! tests can assert which accounts were tried and in what order.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use tokio_util::sync::CancellationToken;

/// Audio body returned for successful calls
pub const AUDIO: &[u8] = b"ID3-mock-audio";

/// Scripted response for one API key
#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    Ok,
    Unauthorized,
    /// 429
    RateLimited,
    /// `ElevenLabs`-style quota signal: 401 with `quota_exceeded`
    QuotaExhausted,
    ServerError,
    /// Sleep before answering successfully
    Slow(Duration),
    /// 200 whose body stream breaks after the first chunk
    BrokenBody,
}

/// Mock TTS backend
pub struct MockTts {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockTtsState>,
}

struct MockTtsState {
    behaviors: HashMap<String, Behavior>,
    /// API keys in the order they were received
    calls: Mutex<Vec<String>>,
    /// Last JSON body received
    last_body: Mutex<Option<serde_json::Value>>,
}

impl MockTts {
    /// Start the mock with `(api_key, behavior)` pairs
    pub async fn start(behaviors: &[(&str, Behavior)]) -> anyhow::Result<Self> {
        let state = Arc::new(MockTtsState {
            behaviors: behaviors.iter().map(|(key, b)| ((*key).to_owned(), *b)).collect(),
            calls: Mutex::default(),
            last_body: Mutex::default(),
        });

        let app = Router::new()
            .route("/v1/text-to-speech/{voice}", routing::post(handle_elevenlabs))
            .route("/v1/audio/speech", routing::post(handle_openai))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for configuring the mock as a provider
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// API keys received, in order
    pub fn calls(&self) -> Vec<String> {
        self.state.calls.lock().unwrap().clone()
    }

    /// Number of requests received with `api_key`
    pub fn call_count(&self, api_key: &str) -> usize {
        self.calls().iter().filter(|k| k.as_str() == api_key).count()
    }

    pub fn last_body(&self) -> Option<serde_json::Value> {
        self.state.last_body.lock().unwrap().clone()
    }
}

impl Drop for MockTts {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_elevenlabs(
    State(state): State<Arc<MockTtsState>>,
    Path(voice): Path<String>,
    headers: HeaderMap,
    Json(mut body): Json<serde_json::Value>,
) -> Response {
    let key = headers
        .get("xi-api-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();

    body["voice"] = serde_json::Value::String(voice);
    respond(&state, key, body).await
}

async fn handle_openai(
    State(state): State<Arc<MockTtsState>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let key = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default()
        .to_owned();

    respond(&state, key, body).await
}

async fn respond(state: &MockTtsState, key: String, body: serde_json::Value) -> Response {
    let behavior = state.behaviors.get(&key).copied();

    state.calls.lock().unwrap().push(key);
    *state.last_body.lock().unwrap() = Some(body);

    match behavior {
        Some(Behavior::Ok) => audio(),
        Some(Behavior::Slow(delay)) => {
            tokio::time::sleep(delay).await;
            audio()
        }
        Some(Behavior::BrokenBody) => broken_audio(),
        Some(Behavior::RateLimited) => (StatusCode::TOO_MANY_REQUESTS, "rate limited").into_response(),
        Some(Behavior::QuotaExhausted) => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "detail": {"status": "quota_exceeded", "message": "This request exceeds your quota."}
            })),
        )
            .into_response(),
        Some(Behavior::ServerError) => (StatusCode::INTERNAL_SERVER_ERROR, "internal failure").into_response(),
        Some(Behavior::Unauthorized) | None => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "detail": {"status": "invalid_api_key", "message": "Invalid API key"}
            })),
        )
            .into_response(),
    }
}

fn audio() -> Response {
    ([(header::CONTENT_TYPE, "audio/mpeg")], AUDIO).into_response()
}

fn broken_audio() -> Response {
    let chunks: [Result<&'static [u8], std::io::Error>; 2] =
        [Ok(&b"ID3"[..]), Err(std::io::Error::other("connection reset mid-body"))];

    (
        [(header::CONTENT_TYPE, "audio/mpeg")],
        Body::from_stream(futures_util::stream::iter(chunks)),
    )
        .into_response()
}
