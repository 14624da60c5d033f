// Provisioner - Ensures setup, organization and bucket exist before use
use crate::application::admin_api::{AdminApi, SetupRequest};
use crate::domain::connection::{Bucket, ConnectionConfig, Organization};
use crate::domain::error::{ProvisionError, RemoteError};
use std::sync::Arc;

/// What a provisioning run found or created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provisioned {
    pub organization: Organization,
    pub bucket: Bucket,
    pub setup_performed: bool,
    pub org_created: bool,
    pub bucket_created: bool,
}

#[derive(Clone)]
pub struct Provisioner {
    admin: Arc<dyn AdminApi>,
}

impl Provisioner {
    pub fn new(admin: Arc<dyn AdminApi>) -> Self {
        Self { admin }
    }

    /// Run the whole provisioning sequence. Safe to repeat: against a ready
    /// instance only list calls are made. Concurrent runs from several
    /// processes are not coordinated.
    pub async fn provision(
        &self,
        config: &ConnectionConfig,
    ) -> Result<Provisioned, ProvisionError> {
        let setup_performed = self.ensure_setup(config).await?;

        let (org_id, org_created) = match self.find_organization_id(&config.org).await? {
            Some(id) => (id, false),
            None => (self.create_organization(&config.org).await?, true),
        };

        let bucket_created = self
            .create_bucket_if_missing(&org_id, &config.bucket)
            .await
            .inspect_err(|e| tracing::error!("Error creating bucket {}: {}", config.bucket, e))?;

        Ok(Provisioned {
            organization: Organization {
                id: org_id.clone(),
                name: config.org.clone(),
            },
            bucket: Bucket {
                name: config.bucket.clone(),
                org_id,
            },
            setup_performed,
            org_created,
            bucket_created,
        })
    }

    /// Returns whether initial setup was submitted
    async fn ensure_setup(&self, config: &ConnectionConfig) -> Result<bool, ProvisionError> {
        let status = self.admin.setup_status().await?;
        // An absent flag counts as "setup still required"
        let setup_required = status.allowed.unwrap_or(true);
        tracing::debug!(
            "Instance setup required: {} (reported {:?})",
            setup_required,
            status.allowed
        );

        if !setup_required {
            return Ok(false);
        }

        let username = config
            .admin_username
            .clone()
            .ok_or(ProvisionError::Configuration)?;

        tracing::info!("Running initial setup for org {} and bucket {}", config.org, config.bucket);
        self.admin
            .post_setup(&SetupRequest {
                org: config.org.clone(),
                bucket: config.bucket.clone(),
                token: config.token.clone(),
                username,
                password: config.admin_password.clone(),
            })
            .await?;

        Ok(true)
    }

    async fn find_organization_id(&self, name: &str) -> Result<Option<String>, ProvisionError> {
        let orgs = match self.admin.list_orgs(name).await {
            Ok(orgs) => orgs,
            Err(RemoteError::NotFound(_)) => {
                tracing::debug!("Organization {} not found", name);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        match orgs.into_iter().next() {
            Some(org) => {
                let id = org
                    .id
                    .ok_or_else(|| ProvisionError::Integrity(name.to_string()))?;
                tracing::debug!("Found organization {} with id {}", name, id);
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }

    async fn create_organization(&self, name: &str) -> Result<String, ProvisionError> {
        let org = self.admin.create_org(name).await?;
        let id = org
            .id
            .ok_or_else(|| ProvisionError::Creation(name.to_string()))?;
        tracing::info!("Created organization {} with id {}", name, id);
        Ok(id)
    }

    /// Returns whether the bucket had to be created
    async fn create_bucket_if_missing(
        &self,
        org_id: &str,
        name: &str,
    ) -> Result<bool, RemoteError> {
        let buckets = self.admin.list_buckets(org_id).await?;
        if buckets.iter().any(|bucket| bucket.name == name) {
            tracing::debug!("Bucket {} already exists in organization {}", name, org_id);
            return Ok(false);
        }

        self.admin.create_bucket(org_id, name).await?;
        tracing::info!("Created bucket {} in organization {}", name, org_id);
        Ok(true)
    }
}
