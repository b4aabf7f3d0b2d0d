//! Logging Infrastructure
//!
//! Console logging (plain or JSON) with optional daily rotating files under
//! `<log_dir>/app`. Only the binary installs a subscriber; the library just
//! emits `tracing` events.

use std::fs;
use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

/// Rotated application log files kept on disk
const MAX_LOG_FILES: usize = 14;

/// Logging options
///
/// | Variable | Default |
/// |----------|---------|
/// | LOG_LEVEL | info |
/// | LOG_JSON | false |
/// | LOG_DIR | - (console only) |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
    pub json: bool,
    pub log_dir: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            log_dir: None,
        }
    }
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            json: lookup("LOG_JSON").is_some_and(|v| matches!(v.trim(), "1" | "true" | "yes")),
            log_dir: lookup("LOG_DIR").filter(|d| !d.is_empty()).map(PathBuf::from),
        }
    }
}

fn app_appender(settings: &LogSettings) -> anyhow::Result<Option<RollingFileAppender>> {
    let Some(dir) = &settings.log_dir else {
        return Ok(None);
    };
    let app_dir = dir.join("app");
    fs::create_dir_all(&app_dir)?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("app")
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(app_dir)?;
    Ok(Some(appender))
}

/// Initialize the global subscriber
///
/// `RUST_LOG` overrides `settings.level` when set.
pub fn init_logger(settings: &LogSettings) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));
    let subscriber = tracing_subscriber::registry().with(env_filter);
    let appender = app_appender(settings)?;

    if settings.json {
        let console_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true);

        let file_layer = appender.map(|writer| {
            fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true)
                .with_thread_ids(true)
                .with_writer(std::sync::Mutex::new(writer))
                .with_filter(EnvFilter::new(&settings.level))
        });

        subscriber.with(console_layer).with(file_layer).try_init()?;
    } else {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true);

        let file_layer = appender.map(|writer| {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(writer))
                .with_filter(EnvFilter::new(&settings.level))
        });

        subscriber.with(console_layer).with(file_layer).try_init()?;
    }

    Ok(())
}
