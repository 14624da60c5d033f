// Influx service - Data access bound to one provisioned org/bucket
use crate::application::data_api::{DataApi, PingStatus, QueryRow};
use crate::domain::connection::{Organization, WriteOptions};
use crate::domain::error::{BestEffort, RemoteError, ServiceError};
use crate::domain::point::{DataPoint, DeleteRequest};
use crate::infrastructure::write_buffer::WriteBuffer;
use std::sync::Arc;

/// Only `query` returns errors. Writes, close, ping and delete log failures
/// and hand back a `BestEffort` instead.
pub struct InfluxService {
    api: Arc<dyn DataApi>,
    org: Organization,
    bucket: String,
    writer: WriteBuffer,
}

impl InfluxService {
    /// Spawns the write buffer, so this needs a running tokio runtime
    pub fn new(
        api: Arc<dyn DataApi>,
        org: Organization,
        bucket: String,
        write_options: WriteOptions,
    ) -> Self {
        let writer =
            WriteBuffer::spawn(api.clone(), org.name.clone(), bucket.clone(), write_options);
        Self {
            api,
            org,
            bucket,
            writer,
        }
    }

    pub fn org(&self) -> &str {
        &self.org.name
    }

    pub fn org_id(&self) -> &str {
        &self.org.id
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Run a Flux query and collect all rows in order. No partial results on error.
    pub async fn query(&self, query: &str) -> Result<Vec<QueryRow>, RemoteError> {
        self.api.execute_query(&self.org.name, query).await
    }

    /// Queue a point for batched transmission. Call `close_write_api` to
    /// observe that it actually reached the server.
    pub fn write_point(&self, point: DataPoint) -> BestEffort<()> {
        let result = point
            .to_line_protocol()
            .and_then(|line| self.writer.enqueue(line));
        suppress("Error writing point", result)
    }

    /// Flush buffered points and close the write channel
    pub async fn close_write_api(&self) -> BestEffort<()> {
        suppress("Error closing write API", self.writer.close().await)
    }

    pub async fn ping(&self) -> BestEffort<PingStatus> {
        let result = self.api.ping().await.map_err(ServiceError::from);
        suppress("Error pinging InfluxDB", result)
    }

    pub async fn delete_data(&self, request: DeleteRequest) -> BestEffort<()> {
        let result = self
            .api
            .delete_range(&self.org.name, &self.bucket, &request)
            .await
            .map_err(ServiceError::from);
        suppress("Error deleting data", result)
    }
}

fn suppress<T>(context: &str, result: Result<T, ServiceError>) -> BestEffort<T> {
    if let Err(e) = &result {
        tracing::error!("{}: {}", context, e);
    }
    result.into()
}
