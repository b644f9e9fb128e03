use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::dashboard::analytics::{AggregateParams, DateRange, InsightThresholds};

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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub dashboard: DashboardConfig,
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
            dashboard: DashboardConfig::from_env()?,
        })
    }
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

/// Default trend window and insight thresholds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DashboardConfig {
    pub default_range: DateRange,
    pub insights: InsightThresholds,
}

impl DashboardConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = InsightThresholds::default();

        let range_days = read_var("DASHBOARD_RANGE_DAYS", DateRange::default().days())?;
        let default_range = DateRange::try_from(range_days)
            .map_err(|_| ConfigError::InvalidRange { days: range_days })?;

        let insights = InsightThresholds {
            low_conversion_pct: read_var(
                "INSIGHT_LOW_CONVERSION_PCT",
                defaults.low_conversion_pct,
            )?,
            recent_window_days: read_var(
                "INSIGHT_RECENT_WINDOW_DAYS",
                defaults.recent_window_days,
            )?,
            backlog_pending: read_var("INSIGHT_BACKLOG_THRESHOLD", defaults.backlog_pending)?,
        };

        Ok(Self {
            default_range,
            insights,
        })
    }

    pub fn params(&self) -> AggregateParams {
        AggregateParams {
            range: self.default_range,
            thresholds: self.insights,
            ..AggregateParams::default()
        }
    }
}

fn read_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { name, value: raw }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidRange { days: u32 },
    InvalidNumber { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidRange { days } => write!(
                f,
                "DASHBOARD_RANGE_DAYS must be one of 7, 30, 90 or 365 (got {days})"
            ),
            ConfigError::InvalidNumber { name, value } => {
                write!(f, "{name} must be numeric (got '{value}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidRange { .. }
            | ConfigError::InvalidNumber { .. } => None,
        }
    }
}
