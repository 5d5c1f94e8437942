pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod models;
pub mod server;
pub mod store;
pub mod telemetry;

/**
 * \brief Common imports for SDK consumers.
 */
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::RelayError;
    pub use crate::models::{Message, Role};
    pub use crate::{db, llm, server, store, telemetry};
}
