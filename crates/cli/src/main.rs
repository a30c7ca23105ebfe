mod args;
mod runner;

use clap::error::ErrorKind;
use clap::Parser;
use std::process::ExitCode;
use tracing::error;

use args::Cli;
use runner::run_triage;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    if let Err(e) = triager_telemetry::init_logging(cli.verbose, &cli.log_file) {
        eprintln!("{:#}", e);
        return ExitCode::FAILURE;
    }
    triager_telemetry::describe_metrics();

    match run_triage(cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
