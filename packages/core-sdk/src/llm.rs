use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::{json, Value};

use crate::{config::Config, error::RelayError, telemetry};

/**
 * \brief Forward one prompt to the completion API and return the first choice's text.
 * \details Exactly one request is sent. No retry, timeout or streaming.
 *          The body is parsed whatever the status code; a reply without a
 *          non-empty `choices[0].message.content` is `UpstreamEmpty`.
 */
pub async fn complete(config: &Config, prompt: &str) -> Result<String, RelayError> {
    if prompt.is_empty() {
        return Err(RelayError::MissingPrompt);
    }

    let client = reqwest::Client::builder().build()?;
    let body = completion_payload(&config.model, prompt);

    telemetry::log_event(
        "relay.request",
        &format!("model={} prompt_len={}", config.model, prompt.len()),
    );

    let resp = client
        .post(config.completions_url())
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {}", config.api_key))
        .json(&body)
        .send()
        .await?;

    let status = resp.status();
    let v: Value = resp.json().await?;
    if !status.is_success() {
        telemetry::log_error(
            "relay.upstream",
            &format!("status {} -> {}", status, upstream_error_message(&v)),
        );
    }

    match extract_openai_content(&v) {
        Some(content) => Ok(content),
        None => Err(RelayError::UpstreamEmpty),
    }
}

/**
 * \brief Single-message chat request body.
 */
pub fn completion_payload(model: &str, prompt: &str) -> Value {
    json!({
        "model": model,
        "messages": [{ "role": "user", "content": prompt }],
    })
}

fn extract_openai_content(v: &Value) -> Option<String> {
    v.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn upstream_error_message(v: &Value) -> String {
    v.get("error")
        .and_then(|e| e.get("message").or(Some(e)))
        .map(|m| m.as_str().map(str::to_string).unwrap_or_else(|| m.to_string()))
        .unwrap_or_else(|| "no error detail".to_string())
}
