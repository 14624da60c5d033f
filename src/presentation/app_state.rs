// Application state for HTTP handlers
use crate::application::influx_service::InfluxService;

pub struct AppState {
    pub influx: InfluxService,
}
