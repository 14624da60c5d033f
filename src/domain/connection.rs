// Connection and provisioning target models
use reqwest::Url;
use std::time::Duration;

/// Everything needed to reach an instance and the org/bucket to provision.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub endpoint: Url,
    pub token: String,
    pub org: String,
    pub bucket: String,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub write: WriteOptions,
}

impl ConnectionConfig {
    pub fn new(
        endpoint: Url,
        token: impl Into<String>,
        org: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            endpoint,
            token: token.into(),
            org: org.into(),
            bucket: bucket.into(),
            admin_username: None,
            admin_password: None,
            write: WriteOptions::default(),
        }
    }

    /// Credentials used only when the instance still needs initial setup
    pub fn with_admin(mut self, username: impl Into<String>, password: Option<String>) -> Self {
        self.admin_username = Some(username.into());
        self.admin_password = password;
        self
    }

    pub fn with_write_options(mut self, write: WriteOptions) -> Self {
        self.write = write;
        self
    }
}

/// Batching thresholds for the write buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    pub batch_size: usize,
    pub flush_interval: Duration,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            flush_interval: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub name: String,
    pub org_id: String,
}
