// Administrative API trait for instance setup, organizations and buckets
use crate::domain::error::RemoteError;
use async_trait::async_trait;

/// Result of the setup-status check. `allowed` is `None` when the instance
/// omitted the flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupStatus {
    pub allowed: Option<bool>,
}

/// First-time setup payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupRequest {
    pub org: String,
    pub bucket: String,
    pub token: String,
    pub username: String,
    pub password: Option<String>,
}

/// Organization as listed by the API; the id may be missing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgRecord {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketRecord {
    pub name: String,
    pub org_id: Option<String>,
}

#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn setup_status(&self) -> Result<SetupStatus, RemoteError>;

    async fn post_setup(&self, request: &SetupRequest) -> Result<(), RemoteError>;

    /// List organizations filtered by name. May fail with `RemoteError::NotFound`.
    async fn list_orgs(&self, name: &str) -> Result<Vec<OrgRecord>, RemoteError>;

    async fn create_org(&self, name: &str) -> Result<OrgRecord, RemoteError>;

    async fn list_buckets(&self, org_id: &str) -> Result<Vec<BucketRecord>, RemoteError>;

    async fn create_bucket(&self, org_id: &str, name: &str) -> Result<(), RemoteError>;
}
