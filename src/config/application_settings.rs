use ::config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::domain::services::fanout_service::{FanoutSettings, DEFAULT_MAX_IN_FLIGHT};
use crate::domain::services::proximity_service::{
    ProximityPolicy, ProximitySettings, DEFAULT_DELTA_DEGREES, DEFAULT_RADIUS_METERS,
};
use crate::infrastructure::adapters::directory::PostgrestConfig;
use crate::infrastructure::adapters::notifications::fcm_push_adapter::{FcmConfig, FCM_SEND_ENDPOINT};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryBackend {
    Postgrest,
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    pub backend: DirectoryBackend,
    /// PostgREST project URL
    pub url: String,
    /// PostgREST service-role key
    pub service_key: String,
    /// sqlx connection string for the sqlite backend
    pub database_url: String,
    pub max_connections: u32,
    pub timeout_seconds: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            backend: DirectoryBackend::Postgrest,
            url: String::new(),
            service_key: String::new(),
            database_url: "sqlite://user_locations.db".to_string(),
            max_connections: 5,
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    pub endpoint: String,
    pub server_key: String,
    pub timeout_seconds: u64,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            endpoint: FCM_SEND_ENDPOINT.to_string(),
            server_key: String::new(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FanoutConfig {
    pub delta_degrees: f64,
    pub radius_meters: f64,
    pub proximity: ProximityPolicy,
    pub max_in_flight: usize,
    /// Zero disables the fan-out deadline.
    pub deadline_seconds: u64,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            delta_degrees: DEFAULT_DELTA_DEGREES,
            radius_meters: DEFAULT_RADIUS_METERS,
            proximity: ProximityPolicy::BoundingBox,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            deadline_seconds: 25,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub directory: DirectoryConfig,
    pub push: PushConfig,
    pub fanout: FanoutConfig,
}

impl Settings {
    /// Load settings from `path` (any format the `config` crate detects by
    /// extension; the file is optional), then `APP_*` environment variables
    /// such as `APP_PUSH__SERVER_KEY`, then the deployment's plain variables
    /// `FCM_SERVER_KEY`, `SUPABASE_URL` and `SUPABASE_SERVICE_ROLE_KEY`.
    pub fn load(path: &str) -> Result<Self, SettingsError> {
        let mut settings: Settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        settings.apply_overrides(|name| std::env::var(name).ok());
        settings.validate()?;
        Ok(settings)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("FCM_SERVER_KEY") {
            self.push.server_key = key;
        }
        if let Some(url) = lookup("SUPABASE_URL") {
            self.directory.url = url;
        }
        if let Some(key) = lookup("SUPABASE_SERVICE_ROLE_KEY") {
            self.directory.service_key = key;
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let invalid = |msg: &str| Err(SettingsError::Invalid(msg.to_string()));

        if self.push.server_key.trim().is_empty() {
            return invalid("push.server_key (or FCM_SERVER_KEY) must be set");
        }
        if !self.push.endpoint.starts_with("http") {
            return invalid("push.endpoint must start with http or https");
        }
        if !(self.fanout.delta_degrees.is_finite() && self.fanout.delta_degrees > 0.0) {
            return invalid("fanout.delta_degrees must be a positive number");
        }
        if !(self.fanout.radius_meters.is_finite() && self.fanout.radius_meters > 0.0) {
            return invalid("fanout.radius_meters must be a positive number");
        }
        if self.fanout.max_in_flight == 0 {
            return invalid("fanout.max_in_flight must be at least 1");
        }
        match self.directory.backend {
            DirectoryBackend::Postgrest => {
                if self.directory.url.trim().is_empty() {
                    return invalid("directory.url (or SUPABASE_URL) must be set for the postgrest backend");
                }
                if self.directory.service_key.trim().is_empty() {
                    return invalid(
                        "directory.service_key (or SUPABASE_SERVICE_ROLE_KEY) must be set for the postgrest backend",
                    );
                }
            }
            DirectoryBackend::Sqlite => {
                if self.directory.database_url.trim().is_empty() {
                    return invalid("directory.database_url must be set for the sqlite backend");
                }
                // Each pooled connection to an in-memory database sees its own empty copy.
                if is_in_memory_sqlite(&self.directory.database_url) && self.directory.max_connections > 1 {
                    return invalid("directory.max_connections must be 1 for an in-memory sqlite database");
                }
            }
        }
        Ok(())
    }

    pub fn proximity_settings(&self) -> ProximitySettings {
        ProximitySettings {
            delta_degrees: self.fanout.delta_degrees,
            radius_meters: self.fanout.radius_meters,
            policy: self.fanout.proximity,
        }
    }

    pub fn fanout_settings(&self) -> FanoutSettings {
        FanoutSettings {
            max_in_flight: self.fanout.max_in_flight,
            deadline: match self.fanout.deadline_seconds {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
        }
    }

    pub fn fcm_config(&self) -> FcmConfig {
        FcmConfig {
            endpoint: self.push.endpoint.clone(),
            server_key: self.push.server_key.clone(),
            timeout: Duration::from_secs(self.push.timeout_seconds),
        }
    }

    pub fn postgrest_config(&self) -> PostgrestConfig {
        PostgrestConfig {
            url: self.directory.url.clone(),
            service_key: self.directory.service_key.clone(),
            timeout: Duration::from_secs(self.directory.timeout_seconds),
        }
    }
}

fn is_in_memory_sqlite(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}
