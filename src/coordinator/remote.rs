//! Writer that forwards requests to a remote replica over HTTP

use crate::common::{Error, Result};
use crate::coordinator::{PointsWriter, WriteRequest};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Path served by [`crate::coordinator::replica::create_router`].
pub const INTERNAL_WRITE_PATH: &str = "/internal/write";

pub struct RemoteWriter {
    base_url: String,
    client: reqwest::Client,
}

impl RemoteWriter {
    /// `timeout` bounds each HTTP round trip, independently of the
    /// coordinator's own write timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn write_url(&self) -> String {
        format!("{}{}", self.base_url, INTERNAL_WRITE_PATH)
    }
}

#[async_trait]
impl PointsWriter for RemoteWriter {
    async fn write(&self, request: Arc<WriteRequest>) -> Result<()> {
        let response = self
            .client
            .post(self.write_url())
            .json(request.as_ref())
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        if status.is_server_error() {
            return Err(Error::Http(format!(
                "{} returned {}: {}",
                self.base_url, status, body
            )));
        }
        Err(Error::Rejected(format!(
            "{} returned {}: {}",
            self.base_url, status, body
        )))
    }
}
