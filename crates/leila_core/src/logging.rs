//! Logging bootstrap and named application loggers.
//!
//! # Responsibility
//! - Initialize file-based rolling logs exactly once per process.
//! - Hand out named loggers from an explicit, context-owned registry.
//!
//! # Invariants
//! - Logging init is idempotent for the same directory and level.
//! - Logging initialization must not panic.
//! - One `NamedLogger` instance exists per name within a registry.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::cell::Cell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

const LOG_FILE_BASENAME: &str = "leila";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;
const MAX_APP_LOG_CHARS: usize = 240;

/// Backend handle; dropping it would stop the file writer.
static BACKEND: OnceCell<Backend> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

struct Backend {
    level: &'static str,
    log_dir: PathBuf,
    _handle: LoggerHandle,
}

impl Backend {
    fn start(level: &'static str, log_dir: PathBuf) -> Result<Self, String> {
        std::fs::create_dir_all(&log_dir).map_err(|err| {
            format!(
                "failed to create log directory `{}`: {err}",
                log_dir.display()
            )
        })?;

        let handle = Logger::try_with_str(level)
            .map_err(|err| format!("invalid log level `{level}`: {err}"))?
            .log_to_file(
                FileSpec::default()
                    .directory(log_dir.as_path())
                    .basename(LOG_FILE_BASENAME),
            )
            .rotate(
                Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                Naming::Numbers,
                Cleanup::KeepLogFiles(MAX_LOG_FILES),
            )
            .write_mode(WriteMode::BufferAndFlush)
            .append()
            // [YYYY-MM-DD HH:MM:SS.ffffff TZ] LEVEL [target] file:line: message
            .format_for_files(flexi_logger::detailed_format)
            .start()
            .map_err(|err| format!("failed to start logger: {err}"))?;

        Ok(Self {
            level,
            log_dir,
            _handle: handle,
        })
    }

    fn ensure_matches(&self, level: &str, log_dir: &Path) -> Result<(), String> {
        if self.log_dir != log_dir {
            return Err(format!(
                "logging already initialized at `{}`; refusing to switch to `{}`",
                self.log_dir.display(),
                log_dir.display()
            ));
        }
        if self.level != level {
            return Err(format!(
                "logging already initialized with level `{}`; refusing to switch to `{level}`",
                self.level
            ));
        }
        Ok(())
    }
}

/// Starts the rolling file logger.
///
/// # Errors
/// - `level` is not one of trace|debug|info|warn|error.
/// - `log_dir` is blank, relative, or cannot be created.
/// - Logging is already active with another level or directory.
/// - The backend fails to start.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let level = normalize_level(level)?;
    let log_dir = normalize_log_dir(log_dir)?;

    let mut started_now = false;
    let backend = BACKEND.get_or_try_init(|| {
        started_now = true;
        Backend::start(level, log_dir.clone())
    })?;
    backend.ensure_matches(level, &log_dir)?;

    if started_now {
        install_panic_hook_once();
        info!(
            "event=core_init module=core status=ok level={level} build_mode={} version={} log_dir={}",
            build_mode(),
            env!("CARGO_PKG_VERSION"),
            log_dir.display()
        );
    }
    Ok(())
}

/// Active `(level, log_dir)`, or `None` before `init_logging` succeeds.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    BACKEND
        .get()
        .map(|backend| (backend.level, backend.log_dir.clone()))
}

/// `debug` in debug builds, `info` in release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Application logger addressed by name.
///
/// Lines go through the `log` facade with the logger name as target.
#[derive(Debug)]
pub struct NamedLogger {
    name: String,
    lines: Cell<u64>,
}

impl NamedLogger {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            lines: Cell::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn log(&self, text: &str) {
        info!(
            target: self.name.as_str(),
            "log---> {}",
            sanitize_message(text, MAX_APP_LOG_CHARS)
        );
        self.lines.set(self.lines.get() + 1);
    }

    /// Number of lines written through this logger.
    pub fn lines_written(&self) -> u64 {
        self.lines.get()
    }
}

/// Name-keyed registry of application loggers.
#[derive(Debug, Default)]
pub struct LoggerRegistry {
    loggers: BTreeMap<String, Rc<NamedLogger>>,
}

impl LoggerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the logger for `name`, creating it on first use.
    pub fn get_or_create(&mut self, name: &str) -> Rc<NamedLogger> {
        Rc::clone(
            self.loggers
                .entry(name.to_string())
                .or_insert_with(|| Rc::new(NamedLogger::new(name))),
        )
    }

    pub fn get(&self, name: &str) -> Option<Rc<NamedLogger>> {
        self.loggers.get(name).cloned()
    }

    /// Registered logger names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.loggers.keys().cloned().collect()
    }
}

fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
}

fn normalize_log_dir(log_dir: &str) -> Result<PathBuf, String> {
    let trimmed = log_dir.trim();
    if trimmed.is_empty() {
        return Err("log_dir cannot be empty".to_string());
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(format!("log_dir must be an absolute path, got `{trimmed}`"));
    }
    Ok(path.to_path_buf())
}

fn build_mode() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    }
}

fn install_panic_hook_once() {
    if PANIC_HOOK_INSTALLED.set(()).is_err() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        // Payloads may carry user text: single line, capped.
        error!(
            "event=panic_captured module=core status=error location={location} payload={}",
            sanitize_message(&payload, MAX_PANIC_PAYLOAD_CHARS)
        );
        previous_hook(panic_info);
    }));
}

fn sanitize_message(value: &str, max_chars: usize) -> String {
    let normalized = value.replace(['\n', '\r'], " ");
    let mut truncated = normalized.chars().take(max_chars).collect::<String>();
    if normalized.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}

#[cfg(test)]
mod tests {
    use super::{
        init_logging, logging_status, normalize_level, normalize_log_dir, sanitize_message,
        LoggerRegistry,
    };
    use std::rc::Rc;

    #[test]
    fn normalize_level_accepts_known_values() {
        assert_eq!(normalize_level("INFO").unwrap(), "info");
        assert_eq!(normalize_level(" warning ").unwrap(), "warn");
        assert!(normalize_level("verbose").is_err());
    }

    #[test]
    fn normalize_log_dir_rejects_relative_and_blank_paths() {
        assert!(normalize_log_dir("logs/dev").unwrap_err().contains("absolute"));
        assert!(normalize_log_dir("   ").unwrap_err().contains("empty"));
    }

    #[test]
    fn sanitize_message_removes_newlines_and_truncates() {
        let sanitized = sanitize_message("line1\nline2\rline3", 8);
        assert!(!sanitized.contains('\n'));
        assert!(!sanitized.contains('\r'));
        assert!(sanitized.ends_with("..."));
    }

    #[test]
    fn registry_returns_one_logger_per_name() {
        let mut registry = LoggerRegistry::new();
        let main = registry.get_or_create("main");
        let again = registry.get_or_create("main");
        let audit = registry.get_or_create("audit");

        assert!(Rc::ptr_eq(&main, &again));
        assert!(!Rc::ptr_eq(&main, &audit));
        assert_eq!(registry.names(), vec!["audit", "main"]);

        main.log("category list");
        again.log("article list");
        assert_eq!(main.lines_written(), 2);
        assert_eq!(audit.lines_written(), 0);
    }

    #[test]
    fn init_logging_is_idempotent_for_same_config_and_rejects_conflicts() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let first_dir = first.path().to_str().unwrap().to_string();
        let second_dir = second.path().to_str().unwrap().to_string();

        init_logging("info", &first_dir).unwrap();
        init_logging("info", &first_dir).unwrap();

        let level_error = init_logging("debug", &first_dir).unwrap_err();
        assert!(level_error.contains("refusing to switch"));

        let dir_error = init_logging("info", &second_dir).unwrap_err();
        assert!(dir_error.contains("refusing to switch"));

        let (active_level, active_dir) = logging_status().unwrap();
        assert_eq!(active_level, "info");
        assert_eq!(active_dir, first.path());
    }
}
