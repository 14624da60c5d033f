// Application layer - Provisioning protocol and data access service
pub mod admin_api;
pub mod bootstrap;
pub mod data_api;
pub mod influx_service;
pub mod provisioner;

#[cfg(test)]
pub(crate) mod fakes;
