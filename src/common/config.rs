//! Configuration for minits components

use crate::common::{ConsistencyLevel, Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix, e.g. `MINITS_COORDINATOR__WRITE_TIMEOUT_MS`.
const ENV_PREFIX: &str = "MINITS";

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Node ID (unique identifier)
    #[serde(default = "default_node_id")]
    pub node_id: String,

    /// Write coordination config
    #[serde(default)]
    pub coordinator: CoordinatorConfig,

    /// Replica endpoint config
    #[serde(default)]
    pub replica: ReplicaConfig,

    /// UDP ingestion config
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingest: Option<IngestConfig>,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_node_id() -> String {
    "node-1".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            coordinator: CoordinatorConfig::default(),
            replica: ReplicaConfig::default(),
            ingest: None,
            log_level: default_log_level(),
        }
    }
}

/// Write coordination configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Maximum wait for a consistency decision, measured from dispatch
    #[serde(default = "default_write_timeout")]
    pub write_timeout_ms: u64,

    /// Index of the writer whose answer decides `owner` writes
    #[serde(default)]
    pub owner_index: usize,

    /// Level used when a front-end does not pick one
    #[serde(default = "default_consistency")]
    pub default_consistency: ConsistencyLevel,

    /// Include an in-process local writer (always writer 0 when enabled)
    #[serde(default = "default_local_replica")]
    pub local_replica: bool,

    /// Remote replica base URLs, e.g. `http://10.0.0.2:7000`
    #[serde(default)]
    pub replicas: Vec<String>,
}

fn default_write_timeout() -> u64 {
    5_000
}
fn default_consistency() -> ConsistencyLevel {
    ConsistencyLevel::One
}
fn default_local_replica() -> bool {
    true
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            write_timeout_ms: default_write_timeout(),
            owner_index: 0,
            default_consistency: default_consistency(),
            local_replica: default_local_replica(),
            replicas: Vec::new(),
        }
    }
}

impl CoordinatorConfig {
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    /// Number of writers a node built from this config dispatches to.
    pub fn writer_count(&self) -> usize {
        self.replicas.len() + usize::from(self.local_replica)
    }
}

/// Replica endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicaConfig {
    /// Bind address for the internal write API
    #[serde(default = "default_replica_bind")]
    pub bind_addr: SocketAddr,
}

fn default_replica_bind() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 7000))
}

impl Default for ReplicaConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_replica_bind(),
        }
    }
}

/// UDP line ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    pub bind_addr: String,
    pub database: String,
    #[serde(default)]
    pub retention_policy: String,
    /// Level stamped on ingested writes; unset means
    /// `coordinator.default_consistency`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consistency: Option<ConsistencyLevel>,
}

impl Config {
    /// Load configuration from an optional TOML file, overridden by
    /// `MINITS_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("coordinator.replicas")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let coord = &self.coordinator;
        if coord.write_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "coordinator.write_timeout_ms must be positive".into(),
            ));
        }
        let writers = coord.writer_count();
        if writers > 0 && coord.owner_index >= writers {
            return Err(Error::InvalidConfig(format!(
                "coordinator.owner_index {} out of range for {} writers",
                coord.owner_index, writers
            )));
        }
        if let Some(ingest) = &self.ingest {
            if ingest.database.is_empty() {
                return Err(Error::InvalidConfig("ingest.database is required".into()));
            }
        }
        Ok(())
    }

    /// Level used for UDP-ingested writes, if ingestion is configured.
    pub fn ingest_consistency(&self) -> Option<ConsistencyLevel> {
        self.ingest.as_ref().map(|ingest| {
            ingest
                .consistency
                .unwrap_or(self.coordinator.default_consistency)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.coordinator.write_timeout(), Duration::from_secs(5));
        assert_eq!(config.coordinator.owner_index, 0);
        assert_eq!(config.coordinator.default_consistency, ConsistencyLevel::One);
        assert_eq!(config.coordinator.writer_count(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
node_id = "ts-2"

[coordinator]
write_timeout_ms = 250
default_consistency = "quorum"
replicas = ["http://10.0.0.2:7000", "http://10.0.0.3:7000"]

[ingest]
bind_addr = "127.0.0.1:2003"
database = "graphite"
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.node_id, "ts-2");
        assert_eq!(config.coordinator.write_timeout(), Duration::from_millis(250));
        assert_eq!(config.coordinator.default_consistency, ConsistencyLevel::Quorum);
        assert_eq!(config.coordinator.writer_count(), 3);
        assert_eq!(config.ingest_consistency(), Some(ConsistencyLevel::Quorum));
        let ingest = config.ingest.unwrap();
        assert_eq!(ingest.database, "graphite");
        assert_eq!(ingest.consistency, None);
    }

    #[test]
    fn test_ingest_consistency_overrides_default() {
        let mut config = Config::default();
        assert_eq!(config.ingest_consistency(), None);

        config.ingest = Some(IngestConfig {
            bind_addr: "127.0.0.1:2003".into(),
            database: "graphite".into(),
            retention_policy: String::new(),
            consistency: Some(ConsistencyLevel::All),
        });
        config.coordinator.default_consistency = ConsistencyLevel::Quorum;
        assert_eq!(config.ingest_consistency(), Some(ConsistencyLevel::All));
    }

    #[test]
    fn test_owner_index_out_of_range() {
        let mut config = Config::default();
        config.coordinator.owner_index = 1;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.coordinator.write_timeout_ms = 0;
        assert!(config.validate().is_err());
    }
}
