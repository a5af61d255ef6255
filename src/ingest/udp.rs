//! UDP line listener
//!
//! Each datagram may carry several newline-separated lines. Lines are turned
//! into points by a [`LineParser`]; the points of one datagram are forwarded
//! as a single write request.

use crate::common::{Config, ConsistencyLevel, Error, Point, Result};
use crate::coordinator::{PointsWriter, WriteRequest};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const UDP_BUFFER_SIZE: usize = 65536;

/// Converts one text line into a point.
pub trait LineParser: Send + Sync {
    fn parse(&self, line: &str) -> Result<Point>;
}

pub struct UdpServer {
    parser: Arc<dyn LineParser>,
    writer: Arc<dyn PointsWriter>,
    database: String,
    retention_policy: String,
    consistency: ConsistencyLevel,
    local_addr: Option<SocketAddr>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl UdpServer {
    pub fn new(
        parser: Arc<dyn LineParser>,
        writer: Arc<dyn PointsWriter>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            parser,
            writer,
            database: database.into(),
            retention_policy: String::new(),
            consistency: ConsistencyLevel::One,
            local_addr: None,
            shutdown: None,
            handle: None,
        }
    }

    /// Build from the `ingest` section of `config`. Without an explicit
    /// `ingest.consistency` the coordinator's default level is used.
    pub fn from_config(
        config: &Config,
        parser: Arc<dyn LineParser>,
        writer: Arc<dyn PointsWriter>,
    ) -> Result<Self> {
        let (Some(ingest), Some(consistency)) = (&config.ingest, config.ingest_consistency())
        else {
            return Err(Error::InvalidConfig("ingest section required".into()));
        };
        Ok(Self::new(parser, writer, ingest.database.clone())
            .with_retention_policy(ingest.retention_policy.clone())
            .with_consistency(consistency))
    }

    pub fn with_retention_policy(mut self, retention_policy: impl Into<String>) -> Self {
        self.retention_policy = retention_policy.into();
        self
    }

    pub fn with_consistency(mut self, consistency: ConsistencyLevel) -> Self {
        self.consistency = consistency;
        self
    }

    /// Bind `iface` (`host:port`) and start processing datagrams in the
    /// background. Returns the bound address.
    pub async fn listen_and_serve(&mut self, iface: &str) -> Result<SocketAddr> {
        if iface.is_empty() {
            return Err(Error::InvalidConfig("bind address required".into()));
        }
        if self.handle.is_some() {
            return Err(Error::InvalidConfig("udp server already running".into()));
        }

        let socket = UdpSocket::bind(iface).await?;
        let addr = socket.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let receive_loop = ReceiveLoop {
            socket,
            parser: Arc::clone(&self.parser),
            writer: Arc::clone(&self.writer),
            database: self.database.clone(),
            retention_policy: self.retention_policy.clone(),
            consistency: self.consistency,
        };
        self.handle = Some(tokio::spawn(receive_loop.run(shutdown_rx)));
        self.shutdown = Some(shutdown_tx);
        self.local_addr = Some(addr);

        tracing::info!(%addr, database = %self.database, "udp listener started");
        Ok(addr)
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Stop the receive loop and wait for it to exit.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle
                .await
                .map_err(|e| Error::Internal(format!("udp receive loop failed: {}", e)))?;
        }
        Ok(())
    }
}

struct ReceiveLoop {
    socket: UdpSocket,
    parser: Arc<dyn LineParser>,
    writer: Arc<dyn PointsWriter>,
    database: String,
    retention_policy: String,
    consistency: ConsistencyLevel,
}

impl ReceiveLoop {
    async fn run(self, mut shutdown: oneshot::Receiver<()>) {
        let mut buf = vec![0u8; UDP_BUFFER_SIZE];
        loop {
            let n = tokio::select! {
                _ = &mut shutdown => break,
                recv = self.socket.recv_from(&mut buf) => match recv {
                    Ok((n, _peer)) => n,
                    Err(e) => {
                        tracing::warn!(error = %e, "udp receive failed, stopping listener");
                        break;
                    }
                },
            };

            let points = parse_datagram(self.parser.as_ref(), &buf[..n]);
            if points.is_empty() {
                continue;
            }

            let request = Arc::new(WriteRequest::new(
                self.database.clone(),
                self.retention_policy.clone(),
                self.consistency,
                points,
            ));
            if let Err(e) = self.writer.write(request).await {
                tracing::warn!(error = %e, "failed to write data points");
            }
        }
        tracing::info!("udp listener stopped");
    }
}

fn parse_datagram(parser: &dyn LineParser, data: &[u8]) -> Vec<Point> {
    String::from_utf8_lossy(data)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match parser.parse(line) {
            Ok(point) => Some(point),
            Err(e) => {
                tracing::debug!(line, error = %e, "skipping unparsable line");
                None
            }
        })
        .collect()
}
