use clap::Parser;
use std::path::PathBuf;

use triager_common::DEFAULT_USER_AGENT;
use triager_storage::{DEFAULT_DATABASE_URL, DEFAULT_UNRESOLVED_FILE};
use triager_telemetry::DEFAULT_LOG_FILE;

#[derive(Parser, Debug)]
#[command(name = "triager")]
#[command(version)]
#[command(about = "Bulk HTTP(S) reachability prober for domain lists", long_about = None)]
pub struct Cli {
    /// File with one domain per line
    pub domains_file: PathBuf,

    /// Ports to probe. Examples: 80,443 or 8000-8010 or 80,443,8080-8090
    #[arg(short, long, default_value = "80,443")]
    pub ports: String,

    /// Max probers doing network I/O at once
    #[arg(short, long, default_value = "500")]
    pub concurrency: usize,

    /// Whole-request timeout in seconds, body read included
    #[arg(long, default_value = "60")]
    pub timeout: u64,

    /// Capacity of each result channel
    #[arg(long, default_value = "100")]
    pub channel_capacity: usize,

    /// SQLite database receiving the probe results
    #[arg(long, env = "TRIAGER_DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    pub database_url: String,

    /// Where domains that fail resolution are written (truncated each run)
    #[arg(long, default_value = DEFAULT_UNRESOLVED_FILE)]
    pub unresolved_file: PathBuf,

    /// Diagnostic log, appended to across runs
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// User-Agent header sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Output format: csv, json
    #[arg(short, long, default_value = "csv")]
    pub output_format: String,

    /// Accept invalid TLS certificates
    #[arg(long)]
    pub insecure: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["triager", "domains.txt"]).unwrap();
        assert_eq!(cli.domains_file, PathBuf::from("domains.txt"));
        assert_eq!(cli.ports, "80,443");
        assert_eq!(cli.concurrency, 500);
        assert_eq!(cli.timeout, 60);
        assert_eq!(cli.channel_capacity, 100);
        assert_eq!(cli.unresolved_file, PathBuf::from("unresolved_domains.txt"));
        assert_eq!(cli.log_file, PathBuf::from("triager_error_log.txt"));
        assert_eq!(cli.user_agent, DEFAULT_USER_AGENT);
        assert!(!cli.insecure);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn overrides() {
        let cli = Cli::try_parse_from([
            "triager",
            "list.txt",
            "--ports",
            "8080",
            "--concurrency",
            "8",
            "--output-format",
            "json",
            "--insecure",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.ports, "8080");
        assert_eq!(cli.concurrency, 8);
        assert_eq!(cli.output_format, "json");
        assert!(cli.insecure);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn domains_file_is_required() {
        assert!(Cli::try_parse_from(["triager"]).is_err());
        assert!(Cli::try_parse_from(["triager", "a.txt", "b.txt"]).is_err());
    }
}
