// Error types for provisioning and data access
use thiserror::Error;

/// Failure reported by the remote InfluxDB API.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("failed to send request to InfluxDB: {0}")]
    Transport(#[from] reqwest::Error),

    /// Distinguished 404 response. Only organization lookup treats it as a
    /// negative result; everywhere else it is a plain failure.
    #[error("InfluxDB resource not found: {0}")]
    NotFound(String),

    #[error("InfluxDB request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("InfluxDB query error: {0}")]
    Query(String),

    #[error("failed to parse InfluxDB response: {0}")]
    Decode(String),
}

impl RemoteError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::NotFound(_))
    }
}

/// Errors that abort provisioning. None of them are retried.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("admin username required to initialize a fresh instance")]
    Configuration,

    #[error("organization {0} exists, but doesn't have an id")]
    Integrity(String),

    #[error("failed to create organization {0}: no id returned")]
    Creation(String),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Failures the data-access service logs and suppresses.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("invalid data point: {0}")]
    InvalidPoint(String),

    #[error("write channel is closed")]
    WriteChannelClosed,
}

/// Outcome of an operation whose failures are logged instead of returned.
///
/// Not an `Err`, so it cannot be propagated with `?`, but the suppressed
/// failure stays inspectable.
#[derive(Debug)]
pub enum BestEffort<T> {
    Done(T),
    Suppressed(ServiceError),
}

impl<T> BestEffort<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            BestEffort::Done(value) => Some(value),
            BestEffort::Suppressed(_) => None,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, BestEffort::Done(_))
    }

    pub fn failure(&self) -> Option<&ServiceError> {
        match self {
            BestEffort::Done(_) => None,
            BestEffort::Suppressed(error) => Some(error),
        }
    }
}

impl<T> From<Result<T, ServiceError>> for BestEffort<T> {
    fn from(result: Result<T, ServiceError>) -> Self {
        match result {
            Ok(value) => BestEffort::Done(value),
            Err(error) => BestEffort::Suppressed(error),
        }
    }
}
