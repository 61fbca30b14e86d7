use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use voxgate_core::HttpError;

use crate::dispatch::{DispatchFailure, ReasonCode};

pub type Result<T> = std::result::Result<T, TtsError>;

/// Gateway-facing TTS errors
#[derive(Debug, Error)]
pub enum TtsError {
    /// Rejected before any downstream call
    #[error("{0}")]
    InvalidRequest(String),

    /// The dispatcher could not produce audio
    #[error("{reason}: {detail}", reason = .0.reason, detail = .0.detail)]
    Dispatch(DispatchFailure),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl HttpError for TtsError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Dispatch(failure) => match failure.reason {
                ReasonCode::UnknownCredential => StatusCode::BAD_REQUEST,
                ReasonCode::Unauthorized => StatusCode::UNAUTHORIZED,
                ReasonCode::QuotaExceeded | ReasonCode::Exhausted => StatusCode::TOO_MANY_REQUESTS,
                ReasonCode::ProviderError | ReasonCode::TransportError => StatusCode::BAD_GATEWAY,
                ReasonCode::NoCredentials => StatusCode::SERVICE_UNAVAILABLE,
            },
            Self::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::InvalidRequest(_) => "invalid_request_error",
            Self::Dispatch(failure) => failure.reason.as_str(),
            Self::ConfigError(_) => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::InvalidRequest(message) => message.clone(),
            Self::Dispatch(failure) => failure.detail.clone(),
            Self::ConfigError(_) => "Internal server error".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorDetails,
}

#[derive(Debug, Serialize)]
struct ErrorDetails {
    message: String,
    r#type: String,
    code: u16,
}

impl IntoResponse for TtsError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error_response = ErrorResponse {
            error: ErrorDetails {
                message: self.client_message(),
                r#type: self.error_type().to_string(),
                code: status.as_u16(),
            },
        };

        (status, Json(error_response)).into_response()
    }
}
