use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading error: {message}")]
    LoadError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Unknown store backend: {value} (expected dynamodb or memory)")]
    UnknownBackend { value: String },
}

/// Environment variables as a key/value map, for loading from a fixed source
pub type EnvSource = config::Map<String, String>;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub store: StoreConfig,
    pub observability: ObservabilityConfig,
}

/// `HOST` / `PORT`
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// `DATABASE_URL` / `DATABASE_NAME` / `AWS_REGION`
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// DynamoDB endpoint override, e.g. DynamoDB Local
    #[serde(default)]
    pub database_url: Option<String>,
    /// Table-name prefix; the DynamoDB store is only built when this is set
    #[serde(default)]
    pub database_name: Option<String>,
    #[serde(default = "default_region")]
    pub aws_region: String,
}

/// `CAFE_STORE_BACKEND` / `CAFE_CREATE_COLLECTIONS`
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_backend")]
    pub store_backend: String,
    #[serde(default)]
    pub create_collections: bool,
}

/// `CAFE_SERVICE_NAME`, `CAFE_OTLP_ENDPOINT`, `CAFE_ENABLE_JSON_LOGGING`, `CAFE_LOG_LEVEL`
#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_service_version")]
    pub service_version: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub enable_json_logging: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    DynamoDb,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dynamodb" => Ok(StoreBackend::DynamoDb),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::UnknownBackend {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::DynamoDb => write!(f, "dynamodb"),
            StoreBackend::Memory => write!(f, "memory"),
        }
    }
}

impl Config {
    /// Load and validate configuration from the process environment
    pub fn from_environment() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load and validate configuration from an explicit variable map
    pub fn from_env_source(source: EnvSource) -> Result<Self, ConfigError> {
        Self::load(Some(source))
    }

    fn load(source: Option<EnvSource>) -> Result<Self, ConfigError> {
        let config = Config {
            server: load_section("server", None, source.clone())?,
            database: load_section("database", None, source.clone())?,
            store: load_section("store", Some("CAFE"), source.clone())?,
            observability: load_section("observability", Some("CAFE"), source)?,
        };

        config.validate()?;

        info!(
            host = %config.server.host,
            port = config.server.port,
            backend = %config.store.store_backend,
            "Configuration loaded successfully"
        );
        debug!("Configuration: {:?}", config);

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError {
                message: "Server port cannot be 0".to_string(),
            });
        }

        if self.observability.service_name.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "Service name cannot be empty".to_string(),
            });
        }

        self.store.backend()?;
        Ok(())
    }
}

impl StoreConfig {
    pub fn backend(&self) -> Result<StoreBackend, ConfigError> {
        self.store_backend.parse()
    }
}

impl DatabaseConfig {
    /// Configured database name, treating an empty value as unset
    pub fn database_name(&self) -> Option<&str> {
        non_empty(&self.database_name)
    }

    pub fn database_url(&self) -> Option<&str> {
        non_empty(&self.database_url)
    }

    /// Build a DynamoDB client for the configured region and endpoint
    pub async fn dynamodb_client(&self) -> DynamoDbClient {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(self.aws_region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_dynamodb::config::Builder::from(&sdk_config);
        if let Some(url) = self.database_url() {
            info!("Using DynamoDB endpoint override: {}", url);
            builder = builder.endpoint_url(url);
        }

        DynamoDbClient::from_conf(builder.build())
    }
}

impl ObservabilityConfig {
    pub fn otlp_endpoint(&self) -> Option<&str> {
        non_empty(&self.otlp_endpoint)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn load_section<T: DeserializeOwned>(
    section: &str,
    prefix: Option<&str>,
    source: Option<EnvSource>,
) -> Result<T, ConfigError> {
    let environment = match prefix {
        Some(prefix) => config::Environment::with_prefix(prefix),
        None => config::Environment::default(),
    };

    let settings = config::Config::builder()
        .add_source(environment.source(source))
        .build()
        .map_err(|e| ConfigError::LoadError {
            message: format!("Failed to load {} config: {}", section, e),
        })?;

    settings
        .try_deserialize()
        .map_err(|e| ConfigError::LoadError {
            message: format!("Failed to deserialize {} config: {}", section, e),
        })
}

// Default value functions
pub(crate) fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub(crate) fn default_port() -> u16 {
    8000
}

pub(crate) fn default_region() -> String {
    "us-east-1".to_string()
}

pub(crate) fn default_store_backend() -> String {
    StoreBackend::DynamoDb.to_string()
}

pub(crate) fn default_service_name() -> String {
    "beachside-cafe".to_string()
}

pub(crate) fn default_service_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

pub(crate) fn default_log_level() -> String {
    "info".to_string()
}
