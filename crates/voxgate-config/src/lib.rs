#![allow(clippy::must_use_candidate)]

mod env;
mod loader;
pub mod server;
pub mod telemetry;
pub mod tts;

use serde::Deserialize;

pub use server::*;
pub use telemetry::{LogFormat, TelemetryConfig};
pub use tts::*;

/// Top-level Voxgate configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// TTS provider and account configuration
    #[serde(default)]
    pub tts: TtsConfig,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
