use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
    sync::RwLock,
};

use anyhow::Result;
use once_cell::sync::Lazy;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::config::Config;

const LOG_FILE: &str = "relaychat.log";

struct Sink {
    enabled: bool,
    dir: PathBuf,
}

static SINK: Lazy<RwLock<Sink>> = Lazy::new(|| {
    RwLock::new(Sink {
        enabled: false,
        dir: PathBuf::from("logs"),
    })
});

/**
 * \brief Apply the telemetry switch and log directory from configuration.
 */
pub fn init(config: &Config) {
    if let Ok(mut guard) = SINK.write() {
        guard.enabled = config.telemetry_enabled;
        guard.dir = config.log_dir.clone();
    }
}

/**
 * \brief Record a routine event.
 */
pub fn log_event(category: &str, message: &str) {
    write_if_enabled("INFO", category, message);
}

/**
 * \brief Record a failure. Always echoed to stderr so failures stay visible with telemetry off.
 */
pub fn log_error(category: &str, message: &str) {
    eprintln!("[ERROR] {} - {}", category, message);
    write_if_enabled("ERROR", category, message);
}

fn write_if_enabled(level: &str, category: &str, message: &str) {
    let dir = match SINK.read() {
        Ok(guard) if guard.enabled => guard.dir.clone(),
        _ => return,
    };
    if let Err(err) = write_line(&dir, level, category, message) {
        eprintln!("telemetry write failed: {}", err);
    }
}

fn write_line(dir: &Path, level: &str, category: &str, message: &str) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
    }
    let timestamp = OffsetDateTime::now_utc().format(&Rfc3339)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))?;
    writeln!(file, "{} [{}] {} - {}", timestamp, level, category, message)?;
    Ok(())
}
