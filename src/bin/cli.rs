//! CLI for replicated writes

use anyhow::Context;
use clap::{Parser, Subcommand};
use minits::common::{parse_duration, parse_field, parse_key_value, Config};
use minits::{ConsistencyLevel, DataNode, Point, WriteRequest};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "minits")]
#[command(about = "minits replicated write CLI")]
#[command(version)]
struct Cli {
    /// Config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one point to the replica set
    Write {
        /// Target database
        #[arg(long)]
        database: String,

        /// Target retention policy
        #[arg(long, default_value = "")]
        retention_policy: String,

        /// Consistency level (any, one, quorum, owner, all)
        #[arg(long)]
        level: Option<ConsistencyLevel>,

        /// Remote replica base URL (repeatable)
        #[arg(long = "replica")]
        replicas: Vec<String>,

        /// Do not include the in-process local writer
        #[arg(long)]
        no_local: bool,

        /// Write timeout (e.g. 500ms, 5s)
        #[arg(long, value_parser = parse_timeout)]
        timeout: Option<Duration>,

        /// Measurement name
        #[arg(long)]
        measurement: String,

        /// Tag as key=value (repeatable)
        #[arg(long = "tag", value_parser = parse_tag)]
        tags: Vec<(String, String)>,

        /// Field as key=number (repeatable)
        #[arg(long = "field", value_parser = parse_number_field, required = true)]
        fields: Vec<(String, f64)>,
    },
}

fn parse_timeout(s: &str) -> Result<Duration, String> {
    parse_duration(s).map_err(|e| e.to_string())
}

fn timeout_millis(timeout: Duration) -> anyhow::Result<u64> {
    u64::try_from(timeout.as_millis()).context("--timeout is too large")
}

fn parse_tag(s: &str) -> Result<(String, String), String> {
    parse_key_value(s).map_err(|e| e.to_string())
}

fn parse_number_field(s: &str) -> Result<(String, f64), String> {
    parse_field(s).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Write {
            database,
            retention_policy,
            level,
            replicas,
            no_local,
            timeout,
            measurement,
            tags,
            fields,
        } => {
            if !replicas.is_empty() {
                config.coordinator.replicas = replicas;
            }
            if no_local {
                config.coordinator.local_replica = false;
            }
            if let Some(timeout) = timeout {
                config.coordinator.write_timeout_ms = timeout_millis(timeout)?;
            }
            let level = level.unwrap_or(config.coordinator.default_consistency);

            let point = tags
                .into_iter()
                .fold(Point::new(measurement), |p, (k, v)| p.with_tag(k, v));
            let point = fields
                .into_iter()
                .fold(point, |p, (k, v)| p.with_field(k, v));

            let node = DataNode::from_config(&config).context("invalid write configuration")?;
            let request = Arc::new(WriteRequest::new(
                database,
                retention_policy,
                level,
                vec![point],
            ));
            let request_id = request.id();

            match node.write(request).await {
                Ok(()) => println!(
                    "✓ wrote 1 point ({} writers, level {}, request {})",
                    node.coordinator().writer_count(),
                    level,
                    request_id
                ),
                Err(e) if e.is_timeout() => {
                    anyhow::bail!("write outcome unknown, replicas may have applied it: {}", e)
                }
                Err(e) => return Err(e).context("write failed"),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_timeout_flag() {
        let cli = Cli::try_parse_from([
            "minits",
            "write",
            "--database",
            "db",
            "--measurement",
            "cpu",
            "--field",
            "usage=1.5",
            "--timeout",
            "750ms",
        ])
        .unwrap();
        let Commands::Write { timeout, .. } = cli.command;
        let timeout = timeout.unwrap();
        assert_eq!(timeout, Duration::from_millis(750));
        assert_eq!(timeout_millis(timeout).unwrap(), 750);
    }

    #[test]
    fn test_oversized_timeout_rejected() {
        assert!(timeout_millis(Duration::MAX).is_err());
    }
}
