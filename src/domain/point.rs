// Data point and delete request models
use chrono::{DateTime, Utc};
use influxdb2::models::WriteDataPoint;
use std::collections::BTreeMap;

use crate::domain::error::ServiceError;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Integer(i64),
    Text(String),
    Boolean(bool),
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<FieldValue> for influxdb2::models::FieldValue {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Float(v) => influxdb2::models::FieldValue::F64(v),
            FieldValue::Integer(v) => influxdb2::models::FieldValue::I64(v),
            FieldValue::Text(v) => influxdb2::models::FieldValue::String(v),
            FieldValue::Boolean(v) => influxdb2::models::FieldValue::Bool(v),
        }
    }
}

/// One timestamped measurement record. Without a timestamp the server
/// assigns its own receive time.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub measurement: String,
    pub tags: BTreeMap<String, String>,
    pub fields: BTreeMap<String, FieldValue>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl DataPoint {
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: BTreeMap::new(),
            fields: BTreeMap::new(),
            timestamp: None,
        }
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Encode as a single line of line protocol with nanosecond precision
    pub fn to_line_protocol(&self) -> Result<String, ServiceError> {
        let mut builder = influxdb2::models::DataPoint::builder(self.measurement.as_str());
        for (key, value) in &self.tags {
            builder = builder.tag(key.as_str(), value.as_str());
        }
        for (key, value) in &self.fields {
            builder = builder.field(key.as_str(), value.clone());
        }
        if let Some(timestamp) = self.timestamp {
            let nanos = timestamp.timestamp_nanos_opt().ok_or_else(|| {
                ServiceError::InvalidPoint(format!("timestamp {} out of range", timestamp))
            })?;
            builder = builder.timestamp(nanos);
        }

        let point = builder
            .build()
            .map_err(|e| ServiceError::InvalidPoint(e.to_string()))?;

        let mut buffer = Vec::new();
        point
            .write_data_point_to(&mut buffer)
            .map_err(|e| ServiceError::InvalidPoint(e.to_string()))?;

        let line = String::from_utf8(buffer)
            .map_err(|e| ServiceError::InvalidPoint(e.to_string()))?;
        Ok(line.trim_end().to_string())
    }
}

/// Time range (and optional predicate) to delete from the bound bucket
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteRequest {
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
    pub predicate: Option<String>,
}

impl DeleteRequest {
    pub fn new(start: DateTime<Utc>, stop: DateTime<Utc>) -> Self {
        Self {
            start,
            stop,
            predicate: None,
        }
    }

    pub fn with_predicate(mut self, predicate: impl Into<String>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }
}
