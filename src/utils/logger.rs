use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tauri::Manager;
use tracing::{info, Subscriber};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::error::{AppError, AppResult};

static LOGGER_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

const LOG_FILE_PREFIX: &str = "essay-evaluator.log";
const DEFAULT_LOG_DIRECTIVES: &str =
    "info,app::evaluator=debug,app::evaluator::http=debug,app::session=debug,app::payload=info";

/// Installs the global subscriber once; later calls are no-ops.
pub fn init_logging(app: &tauri::AppHandle) -> AppResult<()> {
    if LOGGER_GUARD.get().is_some() {
        return Ok(());
    }

    let log_dir = evaluation_log_dir(app)?;
    let (writer, guard) = rolling_writer(&log_dir)?;
    LOGGER_GUARD
        .set(guard)
        .map_err(|_| AppError::other("logging already initialised"))?;

    tracing_subscriber::registry()
        .with(log_filter()?)
        .with(file_layer(writer))
        .with(console_layer())
        .try_init()
        .map_err(|err| AppError::other(format!("cannot install log subscriber: {err}")))?;

    info!(
        target: "app::evaluator",
        log_dir = %log_dir.display(),
        version = env!("CARGO_PKG_VERSION"),
        "essay evaluator logging started"
    );
    Ok(())
}

fn evaluation_log_dir(app: &tauri::AppHandle) -> AppResult<PathBuf> {
    let log_dir = app
        .path()
        .app_log_dir()
        .map_err(|err| AppError::other(format!("cannot resolve log directory: {err}")))?
        .join("evaluations");
    std::fs::create_dir_all(&log_dir)?;
    Ok(log_dir)
}

fn rolling_writer(log_dir: &Path) -> AppResult<(NonBlocking, WorkerGuard)> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(log_dir)
        .map_err(|err| AppError::other(format!("cannot open log file: {err}")))?;
    Ok(tracing_appender::non_blocking(appender))
}

/// `RUST_LOG` wins over the built-in directives.
fn log_filter() -> AppResult<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_DIRECTIVES))
        .map_err(|err| AppError::other(format!("invalid log directives: {err}")))
}

fn file_layer<S>(writer: NonBlocking) -> impl Layer<S>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_timer(UtcTime::rfc_3339())
}

fn console_layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fmt::layer()
        .with_target(false)
        .with_timer(UtcTime::rfc_3339())
}
