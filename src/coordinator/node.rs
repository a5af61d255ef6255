//! Data node: the write entry point used by ingestion front-ends

use crate::common::{Config, Error, Result};
use crate::coordinator::{LocalWriter, PointsWriter, RemoteWriter, WriteCoordinator, WriteRequest};
use async_trait::async_trait;
use std::sync::Arc;

pub struct DataNode {
    node_id: String,
    local: Option<Arc<LocalWriter>>,
    coordinator: WriteCoordinator,
}

impl DataNode {
    pub fn new(node_id: String, coordinator: WriteCoordinator, local: Option<Arc<LocalWriter>>) -> Self {
        Self {
            node_id,
            local,
            coordinator,
        }
    }

    /// Build the writer set from configuration: the local writer first (when
    /// enabled), then each remote replica in configured order.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let coord = &config.coordinator;

        let local = coord.local_replica.then(|| Arc::new(LocalWriter::new()));
        let mut writers: Vec<Arc<dyn PointsWriter>> = Vec::with_capacity(coord.writer_count());
        if let Some(local) = &local {
            writers.push(local.clone());
        }
        for url in &coord.replicas {
            writers.push(Arc::new(RemoteWriter::new(url.as_str(), coord.write_timeout())?));
        }

        tracing::info!(
            node_id = %config.node_id,
            writers = writers.len(),
            timeout = ?coord.write_timeout(),
            "data node configured"
        );

        let coordinator = WriteCoordinator::new(writers)
            .with_timeout(coord.write_timeout())
            .with_owner(coord.owner_index);
        Ok(Self::new(config.node_id.clone(), coordinator, local))
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// The in-process writer, when this node stores points itself.
    pub fn local(&self) -> Option<&Arc<LocalWriter>> {
        self.local.as_ref()
    }

    pub fn coordinator(&self) -> &WriteCoordinator {
        &self.coordinator
    }

    pub async fn write(&self, request: Arc<WriteRequest>) -> Result<()> {
        if request.database().is_empty() {
            return Err(Error::InvalidRequest("database name required".into()));
        }
        if request.is_empty() {
            tracing::debug!(request_id = %request.id(), "empty batch, nothing to write");
            return Ok(());
        }
        self.coordinator.execute(request).await
    }
}

#[async_trait]
impl PointsWriter for DataNode {
    async fn write(&self, request: Arc<WriteRequest>) -> Result<()> {
        DataNode::write(self, request).await
    }
}
