//! Subscriber setup
//!
//! One log file per run, truncated at start. `RUST_LOG` overrides the
//! configured filter. `--verbose` mirrors events to stderr.

use crate::config::LoggingSettings;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, Layer, util::SubscriberInitExt, EnvFilter};

/// Build the filter from `RUST_LOG`, falling back to `default`
///
/// # Errors
/// Fails if `default` is not a valid directive.
pub fn filter(default: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default))
        .with_context(|| format!("invalid log filter {default:?}"))
}

/// Open the log file, creating its directory
///
/// # Errors
/// Fails if the file cannot be created.
pub fn open_log_file(settings: &LoggingSettings) -> Result<File> {
    if let Some(parent) = settings.file.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create log directory {}", parent.display()))?;
    }
    File::create(&settings.file)
        .with_context(|| format!("cannot create log file {}", settings.file.display()))
}

/// Install the global subscriber
///
/// # Errors
/// Fails on an invalid filter, an unwritable log file, or if a subscriber
/// is already installed.
pub fn init(settings: &LoggingSettings, verbose: bool) -> Result<()> {
    let filter = filter(&settings.filter)?;
    let writer = Mutex::new(open_log_file(settings)?);

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(writer);
    let file: Box<dyn Layer<_> + Send + Sync> = if settings.json {
        file_layer.json().boxed()
    } else {
        file_layer.boxed()
    };
    let stderr = verbose.then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file)
        .with(stderr)
        .try_init()
        .context("logging already initialised")
}
