use crate::error::{OutreachError, OutreachResult};
use crate::types::TimeRange;
use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `OUTREACH__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub reporting: ReportingConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportingConfig {
    /// IANA zone used for day bucketing when a request names none.
    #[serde(default = "default_timezone")]
    pub default_timezone: String,
    #[serde(default = "default_time_range")]
    pub default_time_range: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_seed_demo_data")]
    pub seed_demo_data: bool,
}

// Default functions
fn default_node_id() -> String {
    "node-01".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_metrics_port() -> u16 {
    9091
}
fn default_timezone() -> String {
    "UTC".to_string()
}
fn default_time_range() -> String {
    "7d".to_string()
}
fn default_seed_demo_data() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            port: default_metrics_port(),
        }
    }
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            default_timezone: default_timezone(),
            default_time_range: default_time_range(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            seed_demo_data: default_seed_demo_data(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
            reporting: ReportingConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl ReportingConfig {
    pub fn timezone(&self) -> OutreachResult<chrono_tz::Tz> {
        self.default_timezone.parse().map_err(|_| {
            OutreachError::Config(format!(
                "unknown reporting timezone '{}'",
                self.default_timezone
            ))
        })
    }

    pub fn time_range(&self) -> OutreachResult<TimeRange> {
        self.default_time_range
            .parse()
            .map_err(|e: OutreachError| OutreachError::Config(e.to_string()))
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> OutreachResult<Self> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("OUTREACH")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Reject settings that would only fail later, at request time.
    pub fn validate(&self) -> OutreachResult<()> {
        self.reporting.timezone()?;
        self.reporting.time_range()?;
        Ok(())
    }
}
