//! Replicated write execution
//!
//! [`WriteCoordinator::execute`] fans one request out to every writer of a
//! replica set, one task per writer, and collects outcomes in arrival order
//! into a [`ConsistencyPolicy`]. The first of these ends the call:
//!
//! - the policy settles (success, or the writer error that made success
//!   unreachable);
//! - the write timeout elapses ([`Error::WriteTimeout`]).
//!
//! Attempts still in flight at that point are not cancelled. Their outcomes
//! are drained in the background and only logged.

use crate::common::{ConsistencyLevel, Error, Result, WriteMetrics};
use crate::coordinator::policy::{ConsistencyPolicy, Verdict};
use crate::coordinator::{PointsWriter, WriteRequest};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{timeout_at, Instant};
use uuid::Uuid;

/// Default bound on how long a write waits for its consistency decision.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

struct Outcome {
    writer_id: usize,
    result: Result<()>,
}

/// Executes writes against a fixed, already-resolved replica set.
pub struct WriteCoordinator {
    writers: Vec<Arc<dyn PointsWriter>>,
    timeout: Duration,
    owner_id: usize,
    metrics: Arc<WriteMetrics>,
}

impl WriteCoordinator {
    /// Writer indices follow the order of `writers`; index 0 is the owner
    /// unless [`with_owner`](Self::with_owner) says otherwise.
    pub fn new(writers: Vec<Arc<dyn PointsWriter>>) -> Self {
        Self {
            writers,
            timeout: DEFAULT_WRITE_TIMEOUT,
            owner_id: 0,
            metrics: Arc::new(WriteMetrics::new()),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_owner(mut self, owner_id: usize) -> Self {
        self.owner_id = owner_id;
        self
    }

    /// Share outcome counters with other components, e.g. a `/metrics` route.
    pub fn with_metrics(mut self, metrics: Arc<WriteMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Arc<WriteMetrics> {
        &self.metrics
    }

    pub fn writer_count(&self) -> usize {
        self.writers.len()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Write `request` to every writer and wait until its consistency level
    /// is settled or the timeout elapses.
    pub async fn execute(&self, request: Arc<WriteRequest>) -> Result<()> {
        let level = request.consistency();
        let result = self.replicate(request).await;
        self.metrics.record(level, &result);
        result
    }

    #[tracing::instrument(
        name = "replicated_write",
        skip_all,
        fields(request_id = %request.id(), level = %request.consistency(), writers = self.writers.len())
    )]
    async fn replicate(&self, request: Arc<WriteRequest>) -> Result<()> {
        let level = request.consistency();
        if self.writers.is_empty() {
            if level == ConsistencyLevel::Any {
                tracing::debug!("no writers, nothing to hand off");
                return Ok(());
            }
            return Err(Error::InvalidConfig(format!(
                "no writers available for consistency level {}",
                level
            )));
        }

        let mut policy = ConsistencyPolicy::for_level(level, self.writers.len(), self.owner_id)?;

        // One slot per writer: an attempt never blocks on reporting, even
        // after the collector has stopped listening.
        let (tx, mut rx) = mpsc::channel(self.writers.len());
        let deadline = Instant::now() + self.timeout;
        for (writer_id, writer) in self.writers.iter().enumerate() {
            let writer = Arc::clone(writer);
            let request = Arc::clone(&request);
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = writer.write(request).await;
                let _ = tx.send(Outcome { writer_id, result }).await;
            });
        }
        drop(tx);
        tracing::debug!("dispatched to all writers");

        if policy.verdict() == Verdict::Succeeded {
            drain_late_outcomes(rx, request.id(), true);
            return Ok(());
        }

        let mut representative: Option<Error> = None;
        loop {
            let outcome = match timeout_at(deadline, rx.recv()).await {
                Ok(Some(outcome)) => outcome,
                Ok(None) => {
                    // every sender is gone without the policy settling: an
                    // attempt panicked before reporting
                    return Err(Error::Internal(
                        "writer attempt ended without reporting an outcome".into(),
                    ));
                }
                Err(_) => {
                    tracing::warn!(
                        observed = policy.observed(),
                        timeout = ?self.timeout,
                        "write timed out before consistency was reached"
                    );
                    drain_late_outcomes(rx, request.id(), false);
                    return Err(Error::WriteTimeout(self.timeout));
                }
            };

            let Outcome { writer_id, result } = outcome;
            if let Err(e) = &result {
                tracing::warn!(writer_id, error = %e, "replica write failed");
            }

            if !policy.is_done(writer_id, &result) {
                if let Err(e) = result {
                    representative.get_or_insert(Error::writer(writer_id, e));
                }
                continue;
            }

            drain_late_outcomes(rx, request.id(), false);
            return match (policy.verdict(), result) {
                (Verdict::Succeeded, _) => {
                    tracing::debug!(
                        succeeded = policy.succeeded(),
                        failed = policy.failed(),
                        "write settled"
                    );
                    Ok(())
                }
                (_, Err(e)) => Err(Error::writer(writer_id, e)),
                (_, Ok(())) => Err(representative.unwrap_or(Error::QuorumUnreachable {
                    need: policy.need().unwrap_or(1),
                    succeeded: policy.succeeded(),
                })),
            };
        }
    }
}

#[async_trait]
impl PointsWriter for WriteCoordinator {
    async fn write(&self, request: Arc<WriteRequest>) -> Result<()> {
        self.execute(request).await
    }
}

/// Consume outcomes the caller no longer waits for. Under hinted hand-off
/// (`handoff`) a late failure means the write may be lost, so it is a warning.
fn drain_late_outcomes(mut rx: mpsc::Receiver<Outcome>, request_id: Uuid, handoff: bool) {
    tokio::spawn(async move {
        while let Some(Outcome { writer_id, result }) = rx.recv().await {
            match result {
                Ok(()) => tracing::debug!(%request_id, writer_id, "late replica write succeeded"),
                Err(e) if handoff => {
                    tracing::warn!(%request_id, writer_id, error = %e, "handed-off write failed")
                }
                Err(e) => {
                    tracing::debug!(%request_id, writer_id, error = %e, "late replica write failed")
                }
            }
        }
    });
}
