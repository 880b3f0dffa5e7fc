use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing::Span;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

use crate::request::{GenerationMode, TaskHandle};

static INIT: OnceCell<()> = OnceCell::new();

const DEFAULT_JSON_LOG_FILE: &str = "testgen.logs.jsonl";

#[derive(Clone, Debug, PartialEq, Eq)]
enum LogSink {
    /// Compact lines on stderr, so stdout stays reserved for task logs.
    Console,
    JsonFile { dir: PathBuf, file_name: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct LogSettings {
    enabled: bool,
    filter: String,
    sink: LogSink,
}

impl LogSettings {
    fn from_env(default_level: &str) -> Self {
        Self::resolve(|key| std::env::var(key).ok(), default_level)
    }

    fn resolve(lookup: impl Fn(&str) -> Option<String>, default_level: &str) -> Self {
        let enabled = lookup("TESTGEN_OBSERVABILITY_ENABLED")
            .map(|value| parse_bool_env(&value).unwrap_or(true))
            .unwrap_or(true);
        let filter = ["TESTGEN_LOG_LEVEL", "RUST_LOG"]
            .into_iter()
            .filter_map(|key| lookup(key))
            .find(|candidate| tracing_subscriber::EnvFilter::try_new(candidate).is_ok())
            .unwrap_or_else(|| default_level.to_string());
        let sink = lookup("TESTGEN_JSON_LOG_PATH")
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| json_sink(Path::new(raw.trim())))
            .unwrap_or(LogSink::Console);
        Self {
            enabled,
            filter,
            sink,
        }
    }
}

fn parse_bool_env(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "enabled" => Some(true),
        "0" | "false" | "no" | "off" | "disabled" => Some(false),
        _ => None,
    }
}

fn json_sink(path: &Path) -> LogSink {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(DEFAULT_JSON_LOG_FILE);
    LogSink::JsonFile {
        dir: dir.to_path_buf(),
        file_name: file_name.to_string(),
    }
}

/// Initialize diagnostic logging once per process.
///
/// Environment variables:
/// - `TESTGEN_OBSERVABILITY_ENABLED`: optional enable/disable flag (default enabled).
/// - `TESTGEN_LOG_LEVEL`: optional level/filter override (`info`, `debug`, etc.).
/// - `RUST_LOG`: filter used when `TESTGEN_LOG_LEVEL` is unset or invalid.
/// - `TESTGEN_JSON_LOG_PATH`: optional log file path. If set, logs are JSONL in
///   that file and carry the enclosing session span fields.
///
/// `default_level` applies when no valid filter is configured.
pub fn init_observability(default_level: &str) {
    INIT.get_or_init(|| {
        let settings = LogSettings::from_env(default_level);
        if !settings.enabled {
            return;
        }

        let env_filter = tracing_subscriber::EnvFilter::new(&settings.filter);
        match settings.sink {
            LogSink::JsonFile { dir, file_name } => {
                let _ = std::fs::create_dir_all(&dir);
                let writer = tracing_appender::rolling::never(dir, file_name);
                let json_layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(false)
                    .with_writer(writer);
                let _ = tracing_subscriber::registry()
                    .with(env_filter)
                    .with(json_layer)
                    .try_init();
            }
            LogSink::Console => {
                let console_layer = tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr);
                let _ = tracing_subscriber::registry()
                    .with(env_filter)
                    .with(console_layer)
                    .try_init();
            }
        }
    });
}

/// Span covering one generation session. `task_id` is filled in once the
/// service has accepted an automatic request.
pub fn session_span(session_id: uuid::Uuid, mode: GenerationMode) -> Span {
    tracing::info_span!(
        "generation_session",
        session_id = %session_id,
        mode = %mode,
        task_id = tracing::field::Empty,
    )
}

/// Records `task` on the current session span, if one is entered.
pub(crate) fn record_task_id(task: &TaskHandle) {
    Span::current().record("task_id", task.as_str());
}
