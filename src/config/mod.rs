use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::workflows::assessment::domain::DEFAULT_PPA_RATE_NGN;
use crate::workflows::assessment::GatePolicy;

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
    pub assessment: AssessmentConfig,
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
            assessment: AssessmentConfig::load()?,
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Business constants for the assessment wizard, overridable via env so
/// product can retune them without a code change.
#[derive(Debug, Clone)]
pub struct AssessmentConfig {
    /// Compliance gate: minimum percentage of mandatory items satisfied.
    pub mandatory_gate_pct: u8,
    /// Grid tariff in ₦/kWh (Band A reference).
    pub grid_tariff_ngn: u32,
    /// Fixed PPA rate in ₦/kWh.
    pub ppa_rate_ngn: u32,
    /// Bound on outstanding geo lookups.
    pub geo_timeout_secs: u64,
}

impl AssessmentConfig {
    pub const DEFAULT_MANDATORY_GATE_PCT: u8 = 80;
    pub const DEFAULT_GRID_TARIFF_NGN: u32 = 225;
    pub const DEFAULT_GEO_TIMEOUT_SECS: u64 = 10;

    fn load() -> Result<Self, ConfigError> {
        let mandatory_gate_pct = parse_env_or(
            "ASSESS_MANDATORY_GATE_PCT",
            Self::DEFAULT_MANDATORY_GATE_PCT,
        )?;
        if mandatory_gate_pct > 100 {
            return Err(ConfigError::InvalidAssessmentValue {
                var: "ASSESS_MANDATORY_GATE_PCT",
            });
        }

        Ok(Self {
            mandatory_gate_pct,
            grid_tariff_ngn: parse_env_or("ASSESS_GRID_TARIFF_NGN", Self::DEFAULT_GRID_TARIFF_NGN)?,
            ppa_rate_ngn: parse_env_or("ASSESS_PPA_RATE_NGN", DEFAULT_PPA_RATE_NGN)?,
            geo_timeout_secs: parse_env_or(
                "ASSESS_GEO_TIMEOUT_SECS",
                Self::DEFAULT_GEO_TIMEOUT_SECS,
            )?,
        })
    }

    pub fn gate_policy(&self) -> GatePolicy {
        GatePolicy {
            mandatory_gate_pct: self.mandatory_gate_pct,
        }
    }

    pub fn geo_timeout(&self) -> Duration {
        Duration::from_secs(self.geo_timeout_secs)
    }
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            mandatory_gate_pct: Self::DEFAULT_MANDATORY_GATE_PCT,
            grid_tariff_ngn: Self::DEFAULT_GRID_TARIFF_NGN,
            ppa_rate_ngn: DEFAULT_PPA_RATE_NGN,
            geo_timeout_secs: Self::DEFAULT_GEO_TIMEOUT_SECS,
        }
    }
}

fn parse_env_or<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidAssessmentValue { var }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidAssessmentValue { var: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidAssessmentValue { var } => {
                write!(f, "{var} must be a valid in-range number")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidAssessmentValue { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
