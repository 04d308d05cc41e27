use config::{Config, Environment};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    #[serde(default)]
    pub telemetry_enabled: bool,
    #[serde(default = "default_telemetry_service_name")]
    pub telemetry_service_name: String,
    #[serde(default = "default_telemetry_service_version")]
    pub telemetry_service_version: String,
    #[serde(default = "default_telemetry_environment")]
    pub telemetry_environment: String,
    #[serde(default = "default_telemetry_otlp_endpoint")]
    pub telemetry_otlp_endpoint: String,
    #[serde(default = "default_notification_retention_days")]
    pub notification_retention_days: i64,
    #[serde(default = "default_notification_purge_interval_secs")]
    pub notification_purge_interval_secs: u64,
}

fn default_telemetry_service_name() -> String {
    "inventory-api".to_string()
}

fn default_telemetry_service_version() -> String {
    "1.0.0".to_string()
}

fn default_telemetry_environment() -> String {
    "production".to_string()
}

fn default_telemetry_otlp_endpoint() -> String {
    "http://otel-collector.observability.svc.cluster.local:4317".to_string()
}

fn default_notification_retention_days() -> i64 {
    30
}

fn default_notification_purge_interval_secs() -> u64 {
    3600
}

impl AppConfig {
    pub fn from_env() -> Self {
        Config::builder()
            .set_default("database_max_connections", 5)
            .unwrap()
            .add_source(Environment::default())
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }
}
