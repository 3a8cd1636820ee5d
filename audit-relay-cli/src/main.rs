use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use audit_relay::prelude::*;

/// audit-relay - relay workflow audit events to the message queue
///
/// Reads newline-delimited JSON log records from stdin and publishes one
/// XML audit event per auditable record. Exits with a documented status on
/// the first fatal error: 111 (configuration unreadable), 112 (broker
/// unreachable), 113 (publish failed).
#[derive(Parser)]
#[command(name = "audit-relay")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (TOML)
    #[arg(short, long, env = "AUDIT_RELAY_CONFIG")]
    config: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => fatal(e),
    };

    if let Err(e) = init_tracing(&config) {
        fatal(e);
    }

    let relay = match AuditRelay::connect(&config).await {
        Ok(relay) => relay,
        Err(e) => fatal(e),
    };

    if let Err(e) = run(&relay).await {
        fatal(e);
    }

    relay.shutdown().await;
}

fn load_config(path: Option<&str>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Relay records from stdin until the stream ends.
///
/// A line that does not decode as a record is skipped with a warning; a
/// failed publish aborts the loop and the process.
async fn run(relay: &AuditRelay) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let record: LogRecord = match serde_json::from_str(&line) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("skipping undecodable record: {}", e);
                continue;
            }
        };

        relay.process(&record).await?;
    }

    Ok(())
}

fn fatal(err: Error) -> ! {
    // Tracing may not be initialized yet, so the diagnostic goes to stderr
    // directly as well.
    eprintln!("Error: {err}");
    tracing::error!("fatal: {}", err);
    std::process::exit(err.exit_code());
}
