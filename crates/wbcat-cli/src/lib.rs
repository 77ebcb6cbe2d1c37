//! wbcat command line
//!
//! Wires the workspace crates into the `wbcat` binary:
//! - [`config`]: TOML settings with defaults for every field
//! - [`logging`]: tracing subscriber writing to the run's log file
//! - [`prompt`]: interactive choice of indentation
//! - [`run`]: the pipeline stages and the run summary
//! - [`cli`]: argument parsing and dispatch

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod cli;
pub mod config;
pub mod logging;
pub mod prompt;
pub mod run;

pub use config::{CatalogueSettings, LoggingSettings, Settings, DEFAULT_CONFIG_FILE};
pub use run::{write_json, LoadedCatalogue, Pipeline, RunSummary};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
