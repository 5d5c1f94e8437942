//! Relay error taxonomy and its HTTP rendering.
//!
//! Handlers return `Result<T, RelayError>`; every variant renders as a
//! `{ "error": ... }` JSON body. Upstream and storage failures are logged in
//! full and reported to the caller with a generic message only.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::telemetry;

pub const MISSING_PROMPT: &str = "Prompt is required";
pub const UPSTREAM_EMPTY: &str = "No response from OpenAI";
pub const GENERIC_FAILURE: &str = "Something went wrong";

#[derive(Debug, Error)]
pub enum RelayError {
    /// The request carried no prompt, an empty one, or no readable body.
    #[error("prompt is required")]
    MissingPrompt,

    /// A message submitted for storage was rejected before reaching the table.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// The completion API answered without a usable first choice.
    #[error("completion API returned no content")]
    UpstreamEmpty,

    /// Network failure or unreadable completion body.
    #[error("completion request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// Message table write failed.
    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MissingPrompt | RelayError::InvalidMessage(_) => StatusCode::BAD_REQUEST,
            RelayError::UpstreamEmpty | RelayError::Upstream(_) | RelayError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /**
     * \brief Message exposed to the client.
     */
    pub fn client_message(&self) -> String {
        match self {
            RelayError::MissingPrompt => MISSING_PROMPT.to_string(),
            RelayError::InvalidMessage(reason) => reason.clone(),
            RelayError::UpstreamEmpty => UPSTREAM_EMPTY.to_string(),
            RelayError::Upstream(_) | RelayError::Store(_) => GENERIC_FAILURE.to_string(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match &self {
            RelayError::Upstream(e) => telemetry::log_error("relay.upstream", &e.to_string()),
            RelayError::Store(e) => telemetry::log_error("store.write", &format!("{:#}", e)),
            _ => {}
        }
        (self.status(), Json(json!({ "error": self.client_message() }))).into_response()
    }
}
