use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use uuid::Uuid;

use crate::{
    config::Config,
    db,
    error::RelayError,
    llm,
    models::{CompletionResponse, Message, PromptRequest, Role},
    store, telemetry,
};

/**
 * \brief State shared by every handler. Read-only after startup.
 */
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

/**
 * \brief Start the HTTP service: relay API, history API and the static page.
 * \param addr listen address, e.g. "127.0.0.1:5173"
 */
pub async fn run(addr: &str, config: Config) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    println!("Server listening on http://{}", listener.local_addr()?);
    serve(listener, config).await
}

/**
 * \brief Serve on an already-bound listener.
 */
pub async fn serve(listener: TcpListener, config: Config) -> Result<()> {
    telemetry::log_event(
        "server.start",
        &format!(
            "addr={} model={} db={}",
            listener.local_addr()?,
            config.model,
            config.db_path.display()
        ),
    );
    axum::serve(listener, router(config)).await?;
    Ok(())
}

pub fn router(config: Config) -> Router {
    let static_files = ServeDir::new(&config.ui_dir).append_index_html_on_directories(true);
    let state = AppState {
        config: Arc::new(config),
    };

    Router::new()
        .route("/api/chat", post(relay))
        .route("/api/messages", get(list_messages).post(create_message))
        .route("/api/health", get(health_check))
        .fallback_service(static_files)
        .with_state(state)
}

/**
 * \brief Relay endpoint: POST /api/chat `{ "prompt": "..." }`.
 * \details The body is parsed as JSON whatever its Content-Type.
 */
async fn relay(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CompletionResponse>, RelayError> {
    let prompt = prompt_from_body(&body)?;
    let response = llm::complete(&state.config, &prompt).await?;
    Ok(Json(CompletionResponse { response }))
}

fn prompt_from_body(body: &[u8]) -> Result<String, RelayError> {
    match serde_json::from_slice::<PromptRequest>(body) {
        Ok(req) => req.text().ok_or(RelayError::MissingPrompt),
        Err(e) => {
            telemetry::log_event("server.relay", &format!("unreadable body: {}", e));
            Err(RelayError::MissingPrompt)
        }
    }
}

#[derive(Serialize, Debug)]
struct MessagesResponse {
    messages: Vec<Message>,
}

/**
 * \brief Full ordered history. Read failures degrade to an empty list.
 */
async fn list_messages(State(state): State<AppState>) -> Json<MessagesResponse> {
    let config = state.config.clone();
    let messages = tokio::task::spawn_blocking(move || store::load_history(&config))
        .await
        .unwrap_or_else(|e| {
            telemetry::log_error("store.read", &format!("history task failed: {}", e));
            Vec::new()
        });
    Json(MessagesResponse { messages })
}

#[derive(Deserialize, Debug)]
struct NewMessage {
    /** \brief Client-generated id; the server generates one when absent. */
    #[serde(default)]
    id: Option<String>,
    role: Role,
    content: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    created_at: Option<OffsetDateTime>,
}

impl NewMessage {
    fn into_message(self) -> Result<Message, RelayError> {
        if self.content.is_empty() {
            return Err(RelayError::InvalidMessage("content is required".to_string()));
        }
        let id = match self.id {
            Some(id) if id.trim().is_empty() => {
                return Err(RelayError::InvalidMessage("id must not be blank".to_string()))
            }
            Some(id) => id,
            None => Uuid::new_v4().to_string(),
        };
        let created_at = self.created_at.unwrap_or_else(OffsetDateTime::now_utc);
        if db::timestamp_nanos(created_at).is_err() {
            return Err(RelayError::InvalidMessage(
                "created_at out of range".to_string(),
            ));
        }
        Ok(Message {
            id,
            role: self.role,
            content: self.content,
            created_at,
        })
    }
}

/**
 * \brief Append one message row: POST /api/messages.
 */
async fn create_message(
    State(state): State<AppState>,
    body: Result<Json<NewMessage>, JsonRejection>,
) -> Result<Json<Message>, RelayError> {
    let Json(input) = body.map_err(|e| RelayError::InvalidMessage(e.body_text()))?;
    let message = input.into_message()?;

    let config = state.config.clone();
    let stored = message.clone();
    tokio::task::spawn_blocking(move || store::record(&config, &stored))
        .await
        .map_err(|e| RelayError::Store(e.into()))??;
    Ok(Json(message))
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "ok": true,
        "model": state.config.model,
        "persistence": state.config.db_path.display().to_string(),
    }))
}
