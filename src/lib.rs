//! # minits
//!
//! Replicated point writes for a small time-series node:
//! - Tunable write consistency (`any`, `one`, `quorum`, `owner`, `all`)
//! - Concurrent fan-out to replica writers with fail-fast decisions
//! - Bounded wait with a distinct timeout error
//! - HTTP replica endpoint and UDP line ingestion
//!
//! ## Architecture
//!
//! ```text
//!   UDP lines / CLI
//!         │
//! ┌───────▼──────────┐
//! │     DataNode      │
//! │ WriteCoordinator  │── ConsistencyPolicy
//! └──┬──────┬──────┬──┘
//!    │      │      │  one task per writer
//! ┌──▼──┐ ┌─▼───┐ ┌▼────┐
//! │local│ │HTTP │ │HTTP │
//! │     │ │repl.│ │repl.│
//! └─────┘ └─────┘ └─────┘
//! ```
//!
//! ## Usage
//!
//! ### Start a replica
//! ```bash
//! minits-replica serve --id replica-2 --bind 0.0.0.0:7000
//! ```
//!
//! ### Write a point
//! ```bash
//! minits write --database metrics --level quorum \
//!   --replica http://10.0.0.2:7000 --replica http://10.0.0.3:7000 \
//!   --measurement cpu --tag host=a --field value=0.64
//! ```

pub mod common;
pub mod coordinator;
pub mod ingest;

// Re-export commonly used types
pub use common::{Config, ConsistencyLevel, Error, Point, Result};
pub use coordinator::{DataNode, PointsWriter, WriteCoordinator, WriteRequest};

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
