// Bootstrap - Provision the instance, then hand out a bound service
use crate::application::admin_api::AdminApi;
use crate::application::data_api::DataApi;
use crate::application::influx_service::InfluxService;
use crate::application::provisioner::Provisioner;
use crate::domain::connection::ConnectionConfig;
use crate::domain::error::ProvisionError;
use crate::infrastructure::influx_http::InfluxHttpClient;
use std::sync::Arc;

/// Provision the configured org/bucket over HTTP and return a ready service.
/// Any provisioning failure is returned and no service is built.
pub async fn connect(config: &ConnectionConfig) -> Result<InfluxService, ProvisionError> {
    let client = Arc::new(InfluxHttpClient::new(&config.endpoint, config.token.clone()));
    connect_with(client.clone(), client, config).await
}

/// Same as `connect`, with explicitly supplied API implementations
pub async fn connect_with(
    admin: Arc<dyn AdminApi>,
    data: Arc<dyn DataApi>,
    config: &ConnectionConfig,
) -> Result<InfluxService, ProvisionError> {
    let provisioned = Provisioner::new(admin).provision(config).await?;
    tracing::info!(
        "Provisioned org {} ({}) and bucket {}",
        provisioned.organization.name,
        provisioned.organization.id,
        provisioned.bucket.name
    );

    Ok(InfluxService::new(
        data,
        provisioned.organization,
        provisioned.bucket.name,
        config.write.clone(),
    ))
}
