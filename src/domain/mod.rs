// Domain layer - Provisioning targets, data points and errors
pub mod connection;
pub mod error;
pub mod point;
