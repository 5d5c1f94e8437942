use anyhow::Context;

use crate::{
    config::Config,
    db,
    error::RelayError,
    llm,
    models::{Message, Role},
    telemetry,
};

/**
 * \brief Result of one persisted chat turn.
 */
#[derive(Debug, Clone)]
pub struct Turn {
    pub user: Message,
    pub assistant: Message,
}

/**
 * \brief Load the stored history, oldest first.
 * \details Any failure (open, schema, row decode) is logged and yields an empty list.
 */
pub fn load_history(config: &Config) -> Vec<Message> {
    let result = db::open_db(&config.db_path).and_then(|conn| db::load_messages(&conn));
    match result {
        Ok(messages) => messages,
        Err(e) => {
            telemetry::log_error(
                "store.read",
                &format!("history load failed ({}): {:#}", config.db_path.display(), e),
            );
            Vec::new()
        }
    }
}

/**
 * \brief Persist one message row.
 */
pub fn record(config: &Config, message: &Message) -> anyhow::Result<()> {
    let conn = db::open_db(&config.db_path).context("open message store failed")?;
    db::insert_message(&conn, message)
        .with_context(|| format!("insert {} message {} failed", message.role.as_str(), message.id))
}

/**
 * \brief Run one persisted turn: store the user row, relay, store the assistant row.
 * \details The two writes are not transactional. A relay failure leaves the user row without a reply.
 */
pub async fn send_turn(config: &Config, prompt: &str) -> Result<Turn, RelayError> {
    if prompt.is_empty() {
        return Err(RelayError::MissingPrompt);
    }

    let user = Message::new(Role::User, prompt);
    record(config, &user)?;

    let reply = llm::complete(config, prompt).await?;

    let mut assistant = Message::new(Role::Assistant, reply);
    // Replies sort strictly after their prompt even on a coarse clock.
    if assistant.created_at <= user.created_at {
        assistant.created_at = user.created_at + time::Duration::nanoseconds(1);
    }
    record(config, &assistant)?;

    telemetry::log_event(
        "store.turn",
        &format!("user={} assistant={}", user.id, assistant.id),
    );
    Ok(Turn { user, assistant })
}
