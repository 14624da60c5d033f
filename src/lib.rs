// Provisioning and data access for an InfluxDB 2.x org/bucket
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use application::bootstrap::{connect, connect_with};
pub use application::data_api::{PingStatus, QueryRow};
pub use application::influx_service::InfluxService;
pub use application::provisioner::{Provisioned, Provisioner};
pub use domain::connection::{Bucket, ConnectionConfig, Organization, WriteOptions};
pub use domain::error::{BestEffort, ProvisionError, RemoteError, ServiceError};
pub use domain::point::{DataPoint, DeleteRequest, FieldValue};
