// In-memory API fakes for unit tests
use crate::application::admin_api::{AdminApi, BucketRecord, OrgRecord, SetupRequest, SetupStatus};
use crate::application::data_api::{DataApi, PingStatus, QueryRow};
use crate::domain::error::RemoteError;
use crate::domain::point::DeleteRequest;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;

fn injected_failure(call: &str) -> RemoteError {
    RemoteError::Status {
        status: 500,
        body: format!("injected failure in {}", call),
    }
}

#[derive(Debug, Default)]
struct AdminState {
    setup_allowed: Option<bool>,
    orgs: Vec<OrgRecord>,
    buckets: Vec<BucketRecord>,
    next_id: u32,
    orgs_not_found: bool,
    create_without_id: bool,
    fail_on: Option<String>,
    last_setup: Option<SetupRequest>,
    calls: Vec<String>,
}

impl AdminState {
    fn record(&mut self, call: &str) -> Result<(), RemoteError> {
        self.calls.push(call.to_string());
        if self.fail_on.as_deref() == Some(call) {
            return Err(injected_failure(call));
        }
        Ok(())
    }

    fn new_id(&mut self) -> String {
        self.next_id += 1;
        format!("org-{}", self.next_id)
    }
}

/// Admin API backed by in-memory orgs/buckets, recording every call
#[derive(Debug, Default)]
pub struct FakeAdminApi {
    state: Mutex<AdminState>,
}

impl FakeAdminApi {
    /// Instance that still needs initial setup
    pub fn fresh() -> Self {
        let fake = Self::default();
        fake.set_setup_allowed(Some(true));
        fake
    }

    /// Instance that is set up but has no orgs or buckets
    pub fn ready() -> Self {
        let fake = Self::default();
        fake.set_setup_allowed(Some(false));
        fake
    }

    fn state(&self) -> std::sync::MutexGuard<'_, AdminState> {
        self.state.lock().unwrap()
    }

    pub fn set_setup_allowed(&self, allowed: Option<bool>) {
        self.state().setup_allowed = allowed;
    }

    pub fn add_org(&self, org: OrgRecord) {
        self.state().orgs.push(org);
    }

    pub fn add_bucket(&self, bucket: BucketRecord) {
        self.state().buckets.push(bucket);
    }

    pub fn respond_not_found_for_orgs(&self) {
        self.state().orgs_not_found = true;
    }

    pub fn create_orgs_without_id(&self) {
        self.state().create_without_id = true;
    }

    pub fn fail_on(&self, call: &str) {
        self.state().fail_on = Some(call.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Number of setup/org/bucket creation calls made
    pub fn creation_calls(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| matches!(call.as_str(), "post_setup" | "create_org" | "create_bucket"))
            .count()
    }

    pub fn last_setup(&self) -> Option<SetupRequest> {
        self.state().last_setup.clone()
    }

    pub fn org_id(&self, name: &str) -> Option<String> {
        self.state()
            .orgs
            .iter()
            .find(|org| org.name == name)
            .and_then(|org| org.id.clone())
    }

    pub fn bucket_count(&self, org_id: &str) -> usize {
        self.state()
            .buckets
            .iter()
            .filter(|bucket| bucket.org_id.as_deref() == Some(org_id))
            .count()
    }
}

#[async_trait]
impl AdminApi for FakeAdminApi {
    async fn setup_status(&self) -> Result<SetupStatus, RemoteError> {
        let mut state = self.state();
        state.record("setup_status")?;
        Ok(SetupStatus {
            allowed: state.setup_allowed,
        })
    }

    async fn post_setup(&self, request: &SetupRequest) -> Result<(), RemoteError> {
        let mut state = self.state();
        state.record("post_setup")?;
        let id = state.new_id();
        state.orgs.push(OrgRecord {
            id: Some(id.clone()),
            name: request.org.clone(),
        });
        state.buckets.push(BucketRecord {
            name: request.bucket.clone(),
            org_id: Some(id),
        });
        state.setup_allowed = Some(false);
        state.last_setup = Some(request.clone());
        Ok(())
    }

    async fn list_orgs(&self, name: &str) -> Result<Vec<OrgRecord>, RemoteError> {
        let mut state = self.state();
        state.record("list_orgs")?;
        let matches: Vec<OrgRecord> = state
            .orgs
            .iter()
            .filter(|org| org.name == name)
            .cloned()
            .collect();
        if matches.is_empty() && state.orgs_not_found {
            return Err(RemoteError::NotFound(format!("organization name \"{}\" not found", name)));
        }
        Ok(matches)
    }

    async fn create_org(&self, name: &str) -> Result<OrgRecord, RemoteError> {
        let mut state = self.state();
        state.record("create_org")?;
        let id = state.new_id();
        state.orgs.push(OrgRecord {
            id: Some(id.clone()),
            name: name.to_string(),
        });
        let id = if state.create_without_id { None } else { Some(id) };
        Ok(OrgRecord {
            id,
            name: name.to_string(),
        })
    }

    async fn list_buckets(&self, org_id: &str) -> Result<Vec<BucketRecord>, RemoteError> {
        let mut state = self.state();
        state.record("list_buckets")?;
        Ok(state
            .buckets
            .iter()
            .filter(|bucket| bucket.org_id.as_deref() == Some(org_id))
            .cloned()
            .collect())
    }

    async fn create_bucket(&self, org_id: &str, name: &str) -> Result<(), RemoteError> {
        let mut state = self.state();
        state.record("create_bucket")?;
        state.buckets.push(BucketRecord {
            name: name.to_string(),
            org_id: Some(org_id.to_string()),
        });
        Ok(())
    }
}

/// A stored field value decoded from line protocol
#[derive(Debug, Clone)]
struct StoredRow {
    org: String,
    bucket: String,
    time: Option<DateTime<Utc>>,
    row: QueryRow,
}

#[derive(Debug, Default)]
struct DataState {
    rows: Vec<StoredRow>,
    write_bodies: Vec<String>,
    deletes: Vec<DeleteRequest>,
    unreachable: bool,
    fail_on: Option<String>,
}

/// Data API that keeps written points in memory and serves them to queries.
/// Queries ignore the Flux text and return every row stored for the org.
#[derive(Debug, Default)]
pub struct FakeDataApi {
    state: Mutex<DataState>,
}

impl FakeDataApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unreachable() -> Self {
        let fake = Self::default();
        fake.state().unreachable = true;
        fake
    }

    fn state(&self) -> std::sync::MutexGuard<'_, DataState> {
        self.state.lock().unwrap()
    }

    pub fn fail_on(&self, call: &str) {
        self.state().fail_on = Some(call.to_string());
    }

    /// Request bodies received by `write_lines`, one per flushed batch
    pub fn write_bodies(&self) -> Vec<String> {
        self.state().write_bodies.clone()
    }

    pub fn deletes(&self) -> Vec<DeleteRequest> {
        self.state().deletes.clone()
    }

    fn check(&self, state: &DataState, call: &str) -> Result<(), RemoteError> {
        if state.unreachable {
            return Err(RemoteError::Decode(format!("connection refused during {}", call)));
        }
        if state.fail_on.as_deref() == Some(call) {
            return Err(injected_failure(call));
        }
        Ok(())
    }
}

/// Decode `measurement,tag=v field=v,field=v ts` into one row per field
fn decode_line(line: &str) -> Vec<(Option<DateTime<Utc>>, QueryRow)> {
    let mut parts = line.split(' ');
    let (Some(series), Some(fields)) = (parts.next(), parts.next()) else {
        return Vec::new();
    };
    let time = parts
        .next()
        .and_then(|ts| ts.parse::<i64>().ok())
        .map(DateTime::<Utc>::from_timestamp_nanos);

    let mut series_parts = series.split(',');
    let measurement = series_parts.next().unwrap_or_default();
    let mut base = QueryRow::new();
    base.insert("_measurement".to_string(), measurement.to_string());
    for tag in series_parts {
        if let Some((key, value)) = tag.split_once('=') {
            base.insert(key.to_string(), value.to_string());
        }
    }
    if let Some(time) = time {
        base.insert("_time".to_string(), time.to_rfc3339());
    }

    fields
        .split(',')
        .filter_map(|field| field.split_once('='))
        .map(|(key, value)| {
            let mut row = base.clone();
            row.insert("_field".to_string(), key.to_string());
            row.insert(
                "_value".to_string(),
                value.trim_end_matches('i').trim_matches('"').to_string(),
            );
            (time, row)
        })
        .collect()
}

#[async_trait]
impl DataApi for FakeDataApi {
    async fn execute_query(&self, org: &str, _query: &str) -> Result<Vec<QueryRow>, RemoteError> {
        let state = self.state();
        self.check(&state, "execute_query")?;
        Ok(state
            .rows
            .iter()
            .filter(|stored| stored.org == org)
            .map(|stored| stored.row.clone())
            .collect())
    }

    async fn write_lines(&self, org: &str, bucket: &str, lines: &str) -> Result<(), RemoteError> {
        let mut state = self.state();
        self.check(&state, "write_lines")?;
        state.write_bodies.push(lines.to_string());
        for line in lines.lines() {
            for (time, row) in decode_line(line) {
                state.rows.push(StoredRow {
                    org: org.to_string(),
                    bucket: bucket.to_string(),
                    time,
                    row,
                });
            }
        }
        Ok(())
    }

    async fn ping(&self) -> Result<PingStatus, RemoteError> {
        let state = self.state();
        self.check(&state, "ping")?;
        Ok(PingStatus {
            version: Some("v2.7.6".to_string()),
            build: Some("OSS".to_string()),
        })
    }

    async fn delete_range(
        &self,
        org: &str,
        bucket: &str,
        request: &DeleteRequest,
    ) -> Result<(), RemoteError> {
        let mut state = self.state();
        self.check(&state, "delete_range")?;
        state.deletes.push(request.clone());
        state.rows.retain(|stored| {
            let in_range = stored
                .time
                .is_some_and(|time| time >= request.start && time <= request.stop);
            !(stored.org == org && stored.bucket == bucket && in_range)
        });
        Ok(())
    }
}
