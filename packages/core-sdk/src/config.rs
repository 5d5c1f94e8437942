use std::path::PathBuf;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/**
 * \brief Process configuration, read once from the environment at startup.
 */
#[derive(Debug, Clone)]
pub struct Config {
    /** \brief Bearer credential for the completion API. */
    pub api_key: String,
    /** \brief Completion API base address, without the `/v1/...` suffix. */
    pub api_base: String,
    /** \brief Fixed model identifier sent with every request. */
    pub model: String,
    /** \brief SQLite file holding the message table. */
    pub db_path: PathBuf,
    /** \brief Static browser UI directory. */
    pub ui_dir: PathBuf,
    pub telemetry_enabled: bool,
    pub log_dir: PathBuf,
}

impl Config {
    /**
     * \brief Build the configuration from environment variables; only the API key lacks a usable default.
     */
    pub fn from_env() -> Self {
        Self {
            api_key: env_or("OPENAI_API_KEY", ""),
            api_base: env_or("RELAYCHAT_API_BASE", DEFAULT_API_BASE),
            model: env_or("RELAYCHAT_MODEL", DEFAULT_MODEL),
            db_path: PathBuf::from(env_or("RELAYCHAT_DB", "relaychat.db")),
            ui_dir: PathBuf::from(env_or("RELAYCHAT_UI_DIR", "web")),
            telemetry_enabled: env_flag("RELAYCHAT_TELEMETRY"),
            log_dir: PathBuf::from(env_or("RELAYCHAT_LOG_DIR", "logs")),
        }
    }

    /**
     * \brief Full chat completions URL for the configured base.
     */
    pub fn completions_url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.api_base.trim_end_matches('/')
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            db_path: PathBuf::from("relaychat.db"),
            ui_dir: PathBuf::from("web"),
            telemetry_enabled: false,
            log_dir: PathBuf::from("logs"),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
