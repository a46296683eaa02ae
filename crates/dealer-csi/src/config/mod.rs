use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::workflows::survey::scoring::{
    SurveyRules, DEFAULT_DISSATISFIED_BELOW, DEFAULT_FALLBACK_LABEL, DEFAULT_NUMERIC_PREFIX,
};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the report service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub survey: SurveyRules,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            survey: survey_rules_from_env()?,
        })
    }
}

fn survey_rules_from_env() -> Result<SurveyRules, ConfigError> {
    let numeric_prefix =
        env::var("CSI_NUMERIC_PREFIX").unwrap_or_else(|_| DEFAULT_NUMERIC_PREFIX.to_string());
    if numeric_prefix.trim().is_empty() {
        return Err(ConfigError::EmptyNumericPrefix);
    }

    let dissatisfied_below = match env::var("CSI_DISSATISFIED_BELOW") {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| (0.0..=10.0).contains(value))
            .ok_or(ConfigError::InvalidThreshold { value: raw })?,
        Err(_) => DEFAULT_DISSATISFIED_BELOW,
    };

    let fallback_label =
        env::var("CSI_FALLBACK_LABEL").unwrap_or_else(|_| DEFAULT_FALLBACK_LABEL.to_string());

    Ok(SurveyRules {
        numeric_prefix,
        dissatisfied_below,
        fallback_label,
        ..SurveyRules::default()
    })
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidThreshold { value: String },
    EmptyNumericPrefix,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidThreshold { value } => write!(
                f,
                "CSI_DISSATISFIED_BELOW must be a number between 0 and 10, got '{}'",
                value
            ),
            ConfigError::EmptyNumericPrefix => {
                write!(f, "CSI_NUMERIC_PREFIX must not be empty")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidThreshold { .. }
            | ConfigError::EmptyNumericPrefix => None,
        }
    }
}
