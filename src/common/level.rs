//! Write consistency levels
//!
//! Shared by the ingestion front-ends (which stamp a level on each request)
//! and the write coordinator (which turns a level into an acknowledgement
//! policy).

use crate::common::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How many (or which) replicas must acknowledge a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsistencyLevel {
    /// Hinted hand-off: successful once handed to the writers, possibly
    /// before any replica has stored it.
    Any,
    One,
    Quorum,
    /// Only the designated owner replica's answer counts.
    Owner,
    All,
}

impl ConsistencyLevel {
    /// Acknowledgements required out of `writers` for the counting levels.
    /// `None` for levels that do not count (`Any`, `Owner`).
    pub fn required_acks(&self, writers: usize) -> Option<usize> {
        match self {
            ConsistencyLevel::One => Some(1),
            ConsistencyLevel::Quorum => Some(writers / 2 + 1),
            ConsistencyLevel::All => Some(writers),
            ConsistencyLevel::Any | ConsistencyLevel::Owner => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsistencyLevel::Any => "any",
            ConsistencyLevel::One => "one",
            ConsistencyLevel::Quorum => "quorum",
            ConsistencyLevel::Owner => "owner",
            ConsistencyLevel::All => "all",
        }
    }
}

impl fmt::Display for ConsistencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsistencyLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" => Ok(ConsistencyLevel::Any),
            "one" => Ok(ConsistencyLevel::One),
            "quorum" => Ok(ConsistencyLevel::Quorum),
            "owner" => Ok(ConsistencyLevel::Owner),
            "all" => Ok(ConsistencyLevel::All),
            other => Err(Error::InvalidConfig(format!(
                "unknown consistency level: {}",
                other
            ))),
        }
    }
}
