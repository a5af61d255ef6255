//! Replica writer capability and the in-process local writer

use crate::common::{Error, Point, Result};
use crate::coordinator::WriteRequest;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Something that can durably accept a write and report success or failure.
///
/// Implementations must tolerate concurrent calls carrying the same request.
#[async_trait]
pub trait PointsWriter: Send + Sync {
    async fn write(&self, request: Arc<WriteRequest>) -> Result<()>;
}

/// Points accepted by this node, grouped by (database, retention policy).
///
/// Kept in memory only.
#[derive(Debug, Default)]
pub struct LocalWriter {
    shards: Mutex<HashMap<(String, String), Vec<Point>>>,
}

impl LocalWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the points stored for `database` / `retention_policy`.
    pub fn points(&self, database: &str, retention_policy: &str) -> Result<Vec<Point>> {
        let shards = self.lock()?;
        Ok(shards
            .get(&(database.to_string(), retention_policy.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    /// Total points across all shards.
    pub fn point_count(&self) -> Result<usize> {
        Ok(self.lock()?.values().map(Vec::len).sum())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<(String, String), Vec<Point>>>> {
        self.shards
            .lock()
            .map_err(|_| Error::Internal("local store lock poisoned".into()))
    }
}

#[async_trait]
impl PointsWriter for LocalWriter {
    async fn write(&self, request: Arc<WriteRequest>) -> Result<()> {
        if request.database().is_empty() {
            return Err(Error::Rejected("database name required".into()));
        }

        let mut shards = self.lock()?;
        shards
            .entry((
                request.database().to_string(),
                request.retention_policy().to_string(),
            ))
            .or_default()
            .extend(request.points().iter().cloned());

        tracing::trace!(
            request_id = %request.id(),
            points = request.len(),
            "stored points locally"
        );
        Ok(())
    }
}
