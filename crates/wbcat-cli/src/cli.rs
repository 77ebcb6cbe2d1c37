//! Command line
//!
//! ```text
//! wbcat [--config PATH] [--log-file PATH] [--verbose] <COMMAND>
//!   run      fetch, flatten, export (default)
//!   fetch    refresh the cached catalogue only
//!   flatten  flatten and print or save the records as JSON
//! ```

use crate::config::Settings;
use crate::prompt::ask_indent;
use crate::run::{write_json, LoadedCatalogue, Pipeline, RunSummary};
use anyhow::{Context, Result};
use chrono::Local;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use wbcat_http::HttpFacetFetcher;

/// Exit status of a cancelled run
pub const EXIT_CANCELLED: u8 = 130;

fn refresh_arg() -> Arg {
    Arg::new("refresh")
        .long("refresh")
        .action(ArgAction::SetTrue)
        .help("Download the catalogue even if today's copy is cached")
}

fn max_in_flight_arg() -> Arg {
    Arg::new("max-in-flight")
        .long("max-in-flight")
        .value_parser(value_parser!(usize))
        .help("Concurrent facet lookups")
}

/// Build the command tree
#[must_use]
pub fn command() -> Command {
    Command::new("wbcat")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Flatten the storefront category tree into depth-annotated sheets")
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Settings file (default: wbcat.toml if present)"),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Log file, truncated at start"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Also log to stderr"),
        )
        .subcommand(
            Command::new("run")
                .about("Fetch, flatten and export the catalogue")
                .arg(
                    Arg::new("indent")
                        .long("indent")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("no-indent")
                        .help("Shift rows right by their level"),
                )
                .arg(
                    Arg::new("no-indent")
                        .long("no-indent")
                        .action(ArgAction::SetTrue)
                        .help("Write every row from the first column"),
                )
                .arg(refresh_arg())
                .arg(max_in_flight_arg())
                .arg(
                    Arg::new("output-dir")
                        .long("output-dir")
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory the workbook is created in"),
                )
                .arg(
                    Arg::new("stem")
                        .long("stem")
                        .help("Workbook name before the date suffix"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .value_parser(value_parser!(PathBuf))
                        .help("Also write the records as JSON"),
                ),
        )
        .subcommand(
            Command::new("fetch")
                .about("Refresh the cached catalogue")
                .arg(refresh_arg()),
        )
        .subcommand(
            Command::new("flatten")
                .about("Flatten the catalogue and dump the records as JSON")
                .arg(refresh_arg())
                .arg(max_in_flight_arg())
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_parser(value_parser!(PathBuf))
                        .help("Write to a file instead of stdout"),
                ),
        )
}

/// Settings from the file named on the command line, with flag overrides
///
/// # Errors
/// Fails if the settings file cannot be loaded.
pub fn settings_from(matches: &ArgMatches) -> Result<Settings> {
    let mut settings = Settings::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;

    if let Some(file) = matches.get_one::<PathBuf>("log-file") {
        settings.logging.file.clone_from(file);
    }
    if let Some((_, sub)) = matches.subcommand() {
        if let Ok(Some(max)) = sub.try_get_one::<usize>("max-in-flight") {
            settings.engine.max_in_flight = *max;
        }
        if let Ok(Some(dir)) = sub.try_get_one::<PathBuf>("output-dir") {
            settings.export.output_dir.clone_from(dir);
        }
        if let Ok(Some(stem)) = sub.try_get_one::<String>("stem") {
            settings.export.stem.clone_from(stem);
        }
    }
    Ok(settings)
}

/// Indentation chosen by flags, settings, or the prompt
///
/// # Errors
/// Fails if the prompt cannot read an answer.
pub fn indent_mode(sub: Option<&ArgMatches>, settings: &Settings) -> Result<bool> {
    let flag = |name: &str| {
        sub.is_some_and(|m| m.try_get_one::<bool>(name).ok().flatten() == Some(&true))
    };
    if flag("indent") {
        return Ok(true);
    }
    if flag("no-indent") {
        return Ok(false);
    }

    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        ask_indent(stdin.lock(), std::io::stdout()).context("no indentation answer")
    } else {
        Ok(settings.export.indent)
    }
}

fn refresh(sub: Option<&ArgMatches>) -> bool {
    sub.is_some_and(|m| m.get_flag("refresh"))
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

async fn load(
    pipeline: &Pipeline,
    sub: Option<&ArgMatches>,
) -> Result<(LoadedCatalogue, HttpFacetFetcher)> {
    let (downloader, fetcher) = pipeline.http_transport()?;
    let catalogue = pipeline.load_catalogue(downloader, refresh(sub)).await?;
    Ok((catalogue, fetcher))
}

/// Execute parsed arguments, returning the process exit status
///
/// # Errors
/// Fails on any fatal pipeline error.
pub async fn dispatch(matches: &ArgMatches, settings: Settings) -> Result<u8> {
    let pipeline = Pipeline::new(settings);

    match matches.subcommand() {
        Some(("fetch", sub)) => {
            let (catalogue, _) = load(&pipeline, Some(sub)).await?;
            println!(
                "Catalogue: {} ({} top-level categories)",
                catalogue.path.display(),
                catalogue.nodes.len()
            );
            Ok(0)
        }
        Some(("flatten", sub)) => {
            let (catalogue, fetcher) = load(&pipeline, Some(sub)).await?;
            let flattened = pipeline
                .flatten(Arc::new(fetcher), &catalogue.nodes, ctrl_c())
                .await?;
            write_json(sub.get_one::<PathBuf>("output").map(PathBuf::as_path), &flattened.records)?;
            Ok(if flattened.cancelled { EXIT_CANCELLED } else { 0 })
        }
        other => {
            let sub = other.map(|(_, sub)| sub);
            let indent = indent_mode(sub, pipeline.settings())?;
            let (catalogue, fetcher) = load(&pipeline, sub).await?;

            let flattened = pipeline
                .flatten(Arc::new(fetcher), &catalogue.nodes, ctrl_c())
                .await?;
            let export = pipeline.export_run(&flattened, indent, Local::now().date_naive())?;

            let json = sub.and_then(|m| m.get_one::<PathBuf>("json")).cloned();
            if let Some(path) = &json {
                write_json(Some(path), &flattened.records)?;
            }

            let summary = RunSummary {
                catalogue: catalogue.path,
                status: catalogue.status,
                stats: flattened.stats,
                export,
                json,
                cancelled: flattened.cancelled,
            };
            print!("{summary}");
            Ok(if summary.cancelled { EXIT_CANCELLED } else { 0 })
        }
    }
}
