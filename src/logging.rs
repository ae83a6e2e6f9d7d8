//! Structured logging for lanshare.
//!
//! Requests, uploads and downloads are logged through `tracing`. Output goes
//! to stderr at the chosen verbosity and optionally to a log file.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// Log verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only
    Quiet,
    /// Normal logging (info level)
    #[default]
    Normal,
    /// Verbose logging (debug level)
    Verbose,
    /// Very verbose logging (trace level)
    Trace,
}

impl Verbosity {
    /// Map a `-v` count to a verbosity.
    pub fn from_occurrences(count: u8, quiet: bool) -> Self {
        if quiet {
            return Verbosity::Quiet;
        }
        match count {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Trace,
        }
    }

    /// Get the tracing level filter for this verbosity.
    pub fn as_level_filter(&self) -> LevelFilter {
        match self {
            Verbosity::Quiet => LevelFilter::ERROR,
            Verbosity::Normal => LevelFilter::INFO,
            Verbosity::Verbose => LevelFilter::DEBUG,
            Verbosity::Trace => LevelFilter::TRACE,
        }
    }
}

/// Configuration for the logging system.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Verbosity level for stderr output.
    pub verbosity: Verbosity,
    /// Optional path to log file.
    pub log_file: Option<String>,
}

/// Guard that must be kept alive for the duration of logging.
///
/// When this guard is dropped, the logging system will flush pending logs.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the logging system.
///
/// `RUST_LOG` overrides the default levels: the verbosity for stderr and
/// DEBUG for the log file.
/// Returns a guard that must be kept alive for the duration of logging.
///
/// ```ignore
/// use lanshare::logging::{init_logging, LogConfig, Verbosity};
///
/// let config = LogConfig {
///     verbosity: Verbosity::Verbose,
///     log_file: Some("/tmp/lanshare.log".to_string()),
/// };
/// let _guard = init_logging(&config);
/// tracing::info!("Logging initialized");
/// ```
pub fn init_logging(config: &LogConfig) -> LogGuard {
    let rust_log = std::env::var("RUST_LOG").ok();

    let (file_layer, file_guard) = if let Some(ref log_file_path) = config.log_file {
        let path = Path::new(log_file_path);
        let parent_dir = path.parent().unwrap_or(Path::new("."));
        let filename = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("lanshare.log");

        let file_appender = tracing_appender::rolling::never(parent_dir, filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        // DEBUG unless RUST_LOG says otherwise
        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true)
            .with_writer(non_blocking)
            .with_filter(layer_filter(LevelFilter::DEBUG, rust_log.as_deref()));

        (Some(file_layer), Some(guard))
    } else {
        (None, None)
    };

    let stderr_layer = fmt::layer()
        .with_ansi(true)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(layer_filter(
            config.verbosity.as_level_filter(),
            rust_log.as_deref(),
        ));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    LogGuard {
        _file_guard: file_guard,
    }
}

/// Per-layer filter: `rust_log` directives when present, else `default`.
fn layer_filter(default: LevelFilter, rust_log: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default.into())
        .parse_lossy(rust_log.unwrap_or_default())
}
