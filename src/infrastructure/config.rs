use crate::domain::connection::{ConnectionConfig, WriteOptions};
use anyhow::Context;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxConfig {
    pub influx: InfluxSettings,
    #[serde(default)]
    pub write: WriteSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    pub url: String,
    pub token: String,
    pub org: String,
    pub bucket: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WriteSettings {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,
}

impl Default for WriteSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            flush_interval_ms: default_flush_interval_ms(),
        }
    }
}

fn default_batch_size() -> usize {
    WriteOptions::default().batch_size
}

fn default_flush_interval_ms() -> u64 {
    WriteOptions::default().flush_interval.as_millis() as u64
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

impl InfluxConfig {
    pub fn connection(&self) -> anyhow::Result<ConnectionConfig> {
        let endpoint = Url::parse(&self.influx.url)
            .with_context(|| format!("Invalid InfluxDB url {}", self.influx.url))?;

        if self.write.flush_interval_ms == 0 {
            anyhow::bail!("write.flush_interval_ms must be greater than zero");
        }
        if self.write.batch_size == 0 {
            anyhow::bail!("write.batch_size must be greater than zero");
        }

        let mut connection = ConnectionConfig::new(
            endpoint,
            self.influx.token.clone(),
            self.influx.org.clone(),
            self.influx.bucket.clone(),
        )
        .with_write_options(WriteOptions {
            batch_size: self.write.batch_size,
            flush_interval: Duration::from_millis(self.write.flush_interval_ms),
        });

        if let Some(username) = &self.influx.username {
            connection = connection.with_admin(username.clone(), self.influx.password.clone());
        }

        Ok(connection)
    }
}

/// Load `config/influx.*` (optional) overlaid with `PROVISIONER_` environment
/// variables, e.g. `PROVISIONER_INFLUX__TOKEN`.
pub fn load_influx_config() -> anyhow::Result<InfluxConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/influx").required(false))
        .add_source(
            config::Environment::with_prefix("PROVISIONER")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
