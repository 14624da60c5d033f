// Presentation layer - HTTP surface of the service binary
pub mod app_state;
pub mod handlers;
