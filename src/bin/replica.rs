//! Replica binary

use clap::{Parser, Subcommand};
use minits::common::Config;
use minits::coordinator::ReplicaServer;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "minits-replica")]
#[command(about = "minits replica accepting replicated point writes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start replica server
    Serve {
        /// Config file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Node ID
        #[arg(long)]
        id: Option<String>,

        /// Bind address for the write API
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, id, bind } => {
            // CLI arguments take priority over the config file
            let mut config = Config::load(config.as_deref())?;
            if let Some(id) = id {
                config.node_id = id;
            }
            if let Some(bind) = bind {
                config.replica.bind_addr = bind;
            }

            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| config.log_level.clone().into()),
                )
                .with(tracing_subscriber::fmt::layer())
                .init();

            ReplicaServer::new(config.replica, config.node_id)
                .serve()
                .await?;
        }
    }

    Ok(())
}
