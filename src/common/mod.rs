//! Common utilities and types shared across minits

pub mod config;
pub mod error;
pub mod level;
pub mod metrics;
pub mod point;
pub mod utils;

pub use config::{Config, CoordinatorConfig, IngestConfig, ReplicaConfig};
pub use error::{Error, Result};
pub use level::ConsistencyLevel;
pub use metrics::WriteMetrics;
pub use point::Point;
pub use utils::{parse_duration, parse_field, parse_key_value};
