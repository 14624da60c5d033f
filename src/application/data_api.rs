// Data API trait for querying, writing, pinging and deleting
use crate::domain::error::RemoteError;
use crate::domain::point::DeleteRequest;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;

/// One query result row: column name to value
pub type QueryRow = BTreeMap<String, String>;

/// Liveness information reported by the instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PingStatus {
    pub version: Option<String>,
    pub build: Option<String>,
}

#[async_trait]
pub trait DataApi: Send + Sync {
    /// Execute a Flux query and collect every row in server order
    async fn execute_query(&self, org: &str, query: &str) -> Result<Vec<QueryRow>, RemoteError>;

    /// Write newline-separated line protocol to a bucket
    async fn write_lines(&self, org: &str, bucket: &str, lines: &str) -> Result<(), RemoteError>;

    async fn ping(&self) -> Result<PingStatus, RemoteError>;

    async fn delete_range(
        &self,
        org: &str,
        bucket: &str,
        request: &DeleteRequest,
    ) -> Result<(), RemoteError>;
}
