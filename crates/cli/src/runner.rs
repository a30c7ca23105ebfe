// runner.rs
use anyhow::{anyhow, Context, Result};
use std::{sync::Arc, time::Duration};
use tracing::info;
use triager_common::{PortTable, ProbeOptions};
use triager_orchestrator::{Orchestrator, OutputFormat, RunSummary, Sinks};
use triager_scanner_http::HttpProber;
use triager_storage::{SqliteStore, UnresolvedFile};
use triager_target_resolver::{read_domains, TargetResolver};

use crate::args::Cli;

pub async fn run_triage(cli: Cli) -> Result<RunSummary> {
    info!("Starting triage...");
    info!("Domains file: {}", cli.domains_file.display());
    info!("Ports: {}", cli.ports);
    info!("Concurrency: {}", cli.concurrency);
    info!("Timeout: {}s", cli.timeout);

    let ports = port_table(&cli.ports)?;
    let format: OutputFormat = cli.output_format.parse()?;
    let domains = read_domains(&cli.domains_file)
        .with_context(|| format!("Error reading domains file {}", cli.domains_file.display()))?;
    info!("Loaded {} domain(s)", domains.len());

    let options = ProbeOptions {
        timeout: Duration::from_secs(cli.timeout),
        user_agent: cli.user_agent,
        accept_invalid_certs: cli.insecure,
        max_concurrency: cli.concurrency,
        channel_capacity: cli.channel_capacity,
    };

    let resolver = Arc::new(TargetResolver::from_system_conf());
    let prober = HttpProber::new(resolver, &options)?;
    let store = SqliteStore::connect(&cli.database_url).await?;
    let unresolved = UnresolvedFile::create(&cli.unresolved_file)?;

    info!("Probing {} port/protocol pair(s) per domain", ports.len());
    let orchestrator = Orchestrator::new(Arc::new(prober), ports, options);

    let store = Arc::new(store);
    let sinks = Sinks {
        store: store.clone(),
        unresolved: Box::new(unresolved),
        rows: Box::new(std::io::stdout()),
        format,
    };
    let summary = orchestrator.run(domains, sinks).await?;

    info!("Result store holds {} row(s)", store.count().await?);
    store.close().await;
    Ok(summary)
}

/// Build the probe table from a `--ports` value such as "80,443,8000-8010".
/// Repeated ports are probed once, in first-seen order.
fn port_table(spec: &str) -> Result<PortTable> {
    let mut ports: Vec<u16> = Vec::new();

    for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (start, end) = match part.split_once('-') {
            Some((lo, hi)) => (parse_port(lo)?, parse_port(hi)?),
            None => {
                let port = parse_port(part)?;
                (port, port)
            }
        };
        if start > end {
            return Err(anyhow!("Port range {} runs backwards", part));
        }
        for port in start..=end {
            if !ports.contains(&port) {
                ports.push(port);
            }
        }
    }

    if ports.is_empty() {
        return Err(anyhow!("No ports to probe in '{}'", spec));
    }
    Ok(PortTable::from_ports(&ports))
}

fn parse_port(raw: &str) -> Result<u16> {
    match raw.trim().parse::<u16>() {
        Ok(0) => Err(anyhow!("Port 0 cannot be probed")),
        Ok(port) => Ok(port),
        Err(e) => Err(anyhow!("Invalid port '{}': {}", raw.trim(), e)),
    }
}
