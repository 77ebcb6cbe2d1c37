use std::process::ExitCode;
use wbcat_cli::{cli, logging};

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli::command().get_matches();

    let settings = match cli::settings_from(&matches) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = logging::init(&settings.logging, matches.get_flag("verbose")) {
        eprintln!("error: {err:#}");
        return ExitCode::FAILURE;
    }
    tracing::info!(version = wbcat_cli::VERSION, "wbcat started");

    match cli::dispatch(&matches, settings).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "run failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
