// InfluxDB v2 HTTP API client implementation
use crate::application::admin_api::{AdminApi, BucketRecord, OrgRecord, SetupRequest, SetupStatus};
use crate::application::data_api::{DataApi, PingStatus, QueryRow};
use crate::domain::error::RemoteError;
use crate::domain::point::DeleteRequest;
use crate::infrastructure::flux_csv::parse_query_response;
use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct InfluxHttpClient {
    host: String,
    token: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SetupStatusResponse {
    #[serde(default)]
    allowed: Option<bool>,
}

#[derive(Debug, Serialize)]
struct SetupBody<'a> {
    username: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    org: &'a str,
    bucket: &'a str,
    token: &'a str,
}

#[derive(Debug, Deserialize)]
struct OrgsResponse {
    #[serde(default)]
    orgs: Vec<OrgResponse>,
}

#[derive(Debug, Deserialize)]
struct OrgResponse {
    #[serde(default)]
    id: Option<String>,
    name: String,
}

#[derive(Debug, Serialize)]
struct OrgBody<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct BucketsResponse {
    #[serde(default)]
    buckets: Vec<BucketResponse>,
}

#[derive(Debug, Deserialize)]
struct BucketResponse {
    name: String,
    #[serde(rename = "orgID", default)]
    org_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct BucketBody<'a> {
    #[serde(rename = "orgID")]
    org_id: &'a str,
    name: &'a str,
    #[serde(rename = "retentionRules")]
    retention_rules: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct QueryBody<'a> {
    query: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    dialect: QueryDialect,
}

#[derive(Debug, Serialize)]
struct QueryDialect {
    header: bool,
    delimiter: &'static str,
    annotations: Vec<String>,
}

#[derive(Debug, Serialize)]
struct DeleteBody {
    start: String,
    stop: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    predicate: Option<String>,
}

impl From<OrgResponse> for OrgRecord {
    fn from(org: OrgResponse) -> Self {
        OrgRecord {
            id: org.id,
            name: org.name,
        }
    }
}

impl InfluxHttpClient {
    pub fn new(endpoint: &Url, token: impl Into<String>) -> Self {
        Self {
            host: endpoint.as_str().trim_end_matches('/').to_string(),
            token: token.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Build an absolute URL from a path and already-unencoded query pairs
    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> String {
        let mut url = format!("{}{}", self.host, path);
        for (i, (key, value)) in params.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(AUTHORIZATION, format!("Token {}", self.token))
    }

    async fn send(&self, request: RequestBuilder, path: &str) -> Result<Response, RemoteError> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound(format!("{}: {}", path, body)));
        }
        Err(RemoteError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, RemoteError> {
        let url = self.build_url(path, params);
        let response = self
            .send(self.http.get(&url).header(ACCEPT, "application/json"), path)
            .await?;
        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::Decode(format!("{}: {}", path, e)))
    }

    async fn post_json<B: Serialize + Sync>(
        &self,
        path: &str,
        params: &[(&str, &str)],
        body: &B,
    ) -> Result<Response, RemoteError> {
        let url = self.build_url(path, params);
        self.send(self.http.post(&url).json(body), path).await
    }
}

#[async_trait]
impl AdminApi for InfluxHttpClient {
    async fn setup_status(&self) -> Result<SetupStatus, RemoteError> {
        let status: SetupStatusResponse = self.get_json("/api/v2/setup", &[]).await?;
        Ok(SetupStatus {
            allowed: status.allowed,
        })
    }

    async fn post_setup(&self, request: &SetupRequest) -> Result<(), RemoteError> {
        let body = SetupBody {
            username: &request.username,
            password: request.password.as_deref(),
            org: &request.org,
            bucket: &request.bucket,
            token: &request.token,
        };
        self.post_json("/api/v2/setup", &[], &body).await?;
        Ok(())
    }

    async fn list_orgs(&self, name: &str) -> Result<Vec<OrgRecord>, RemoteError> {
        let response: OrgsResponse = self.get_json("/api/v2/orgs", &[("org", name)]).await?;
        Ok(response.orgs.into_iter().map(OrgRecord::from).collect())
    }

    async fn create_org(&self, name: &str) -> Result<OrgRecord, RemoteError> {
        let response = self
            .post_json("/api/v2/orgs", &[], &OrgBody { name })
            .await?;
        let org = response
            .json::<OrgResponse>()
            .await
            .map_err(|e| RemoteError::Decode(format!("/api/v2/orgs: {}", e)))?;
        Ok(org.into())
    }

    async fn list_buckets(&self, org_id: &str) -> Result<Vec<BucketRecord>, RemoteError> {
        let response: BucketsResponse = self
            .get_json("/api/v2/buckets", &[("orgID", org_id)])
            .await?;
        Ok(response
            .buckets
            .into_iter()
            .map(|bucket| BucketRecord {
                name: bucket.name,
                org_id: bucket.org_id,
            })
            .collect())
    }

    async fn create_bucket(&self, org_id: &str, name: &str) -> Result<(), RemoteError> {
        let body = BucketBody {
            org_id,
            name,
            retention_rules: Vec::new(),
        };
        self.post_json("/api/v2/buckets", &[], &body).await?;
        Ok(())
    }
}

#[async_trait]
impl DataApi for InfluxHttpClient {
    async fn execute_query(&self, org: &str, query: &str) -> Result<Vec<QueryRow>, RemoteError> {
        tracing::debug!("Executing flux query: {}", query);
        let body = QueryBody {
            query,
            kind: "flux",
            dialect: QueryDialect {
                header: true,
                delimiter: ",",
                annotations: vec![
                    "datatype".to_string(),
                    "group".to_string(),
                    "default".to_string(),
                ],
            },
        };
        let url = self.build_url("/api/v2/query", &[("org", org)]);
        let response = self
            .send(
                self.http
                    .post(&url)
                    .header(ACCEPT, "application/csv")
                    .json(&body),
                "/api/v2/query",
            )
            .await?;

        let text = response.text().await?;
        parse_query_response(&text)
    }

    async fn write_lines(&self, org: &str, bucket: &str, lines: &str) -> Result<(), RemoteError> {
        let url = self.build_url(
            "/api/v2/write",
            &[("org", org), ("bucket", bucket), ("precision", "ns")],
        );
        self.send(
            self.http
                .post(&url)
                .header(CONTENT_TYPE, "text/plain; charset=utf-8")
                .body(lines.to_string()),
            "/api/v2/write",
        )
        .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<PingStatus, RemoteError> {
        let url = self.build_url("/ping", &[]);
        let response = self.send(self.http.get(&url), "/ping").await?;
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Ok(PingStatus {
            version: header("x-influxdb-version"),
            build: header("x-influxdb-build"),
        })
    }

    async fn delete_range(
        &self,
        org: &str,
        bucket: &str,
        request: &DeleteRequest,
    ) -> Result<(), RemoteError> {
        let body = DeleteBody {
            start: request.start.to_rfc3339_opts(SecondsFormat::Nanos, true),
            stop: request.stop.to_rfc3339_opts(SecondsFormat::Nanos, true),
            predicate: request.predicate.clone(),
        };
        self.post_json("/api/v2/delete", &[("org", org), ("bucket", bucket)], &body)
            .await?;
        Ok(())
    }
}
