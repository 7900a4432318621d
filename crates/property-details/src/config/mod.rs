use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_OPENCAGE_URL: &str = "https://api.opencagedata.com";
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de";
pub const DEFAULT_USER_AGENT: &str = "PropertyInfoService/1.0";
pub const DEFAULT_CORS_ORIGINS: [&str; 2] = [
    "https://property-details-client.vercel.app",
    "http://localhost:4321",
];

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

/// Top-level configuration for the lookup service and its HTTP surface.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub cors: CorsConfig,
    pub upstream: UpstreamConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let allowed_origins = match env::var("APP_CORS_ORIGINS") {
            Ok(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
            Err(_) => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            cors: CorsConfig { allowed_origins },
            upstream: UpstreamConfig::from_env()?,
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

/// Browser origins allowed to call the `/property` endpoint.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// Which input the structured-geocoding provider is queried with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailsLookupMode {
    Address,
    Coordinates,
}

/// Endpoints and client settings for the three upstream collaborators.
///
/// Built once at startup and handed to each client; nothing downstream reads
/// the environment.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub nominatim_url: String,
    pub opencage_url: String,
    pub overpass_url: String,
    pub opencage_api_key: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub school_radius_m: u32,
    pub details_lookup: DetailsLookupMode,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            opencage_url: DEFAULT_OPENCAGE_URL.to_string(),
            overpass_url: DEFAULT_OVERPASS_URL.to_string(),
            opencage_api_key: String::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(60),
            school_radius_m: 2000,
            details_lookup: DetailsLookupMode::Address,
        }
    }
}

impl UpstreamConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let timeout_secs = positive_u32("UPSTREAM_TIMEOUT_SECS")?;
        let school_radius_m = positive_u32("SCHOOL_SEARCH_RADIUS_M")?;

        let details_lookup = match env::var("DETAILS_LOOKUP") {
            Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "address" => DetailsLookupMode::Address,
                "coordinates" | "coords" => DetailsLookupMode::Coordinates,
                _ => return Err(ConfigError::InvalidDetailsLookup { value: raw }),
            },
            Err(_) => defaults.details_lookup,
        };

        Ok(Self {
            nominatim_url: env::var("NOMINATIM_URL").unwrap_or(defaults.nominatim_url),
            opencage_url: env::var("OPENCAGE_URL").unwrap_or(defaults.opencage_url),
            overpass_url: env::var("OVERPASS_URL").unwrap_or(defaults.overpass_url),
            opencage_api_key: env::var("OPENCAGE_API_KEY").unwrap_or_default(),
            user_agent: env::var("UPSTREAM_USER_AGENT").unwrap_or(defaults.user_agent),
            timeout: timeout_secs
                .map(|secs| Duration::from_secs(u64::from(secs)))
                .unwrap_or(defaults.timeout),
            school_radius_m: school_radius_m.unwrap_or(defaults.school_radius_m),
            details_lookup,
        })
    }
}

fn positive_u32(name: &'static str) -> Result<Option<u32>, ConfigError> {
    let Ok(raw) = env::var(name) else {
        return Ok(None);
    };

    match raw.trim().parse::<u32>() {
        Ok(value) if value > 0 => Ok(Some(value)),
        _ => Err(ConfigError::InvalidNumber { name, value: raw }),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { name: &'static str, value: String },
    InvalidDetailsLookup { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { name, value } => {
                write!(f, "{name} must be a positive integer (got '{value}')")
            }
            ConfigError::InvalidDetailsLookup { value } => write!(
                f,
                "DETAILS_LOOKUP must be 'address' or 'coordinates' (got '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidDetailsLookup { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_CORS_ORIGINS",
            "OPENCAGE_API_KEY",
            "NOMINATIM_URL",
            "OPENCAGE_URL",
            "OVERPASS_URL",
            "UPSTREAM_TIMEOUT_SECS",
            "UPSTREAM_USER_AGENT",
            "SCHOOL_SEARCH_RADIUS_M",
            "DETAILS_LOOKUP",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.cors.allowed_origins.len(), 2);
        assert_eq!(config.upstream.nominatim_url, DEFAULT_NOMINATIM_URL);
        assert_eq!(config.upstream.timeout, Duration::from_secs(60));
        assert_eq!(config.upstream.school_radius_m, 2000);
        assert_eq!(config.upstream.details_lookup, DetailsLookupMode::Address);
        assert!(config.upstream.opencage_api_key.is_empty());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 8080));
    }

    #[test]
    fn reads_upstream_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("OPENCAGE_API_KEY", "secret");
        env::set_var("UPSTREAM_TIMEOUT_SECS", "10");
        env::set_var("SCHOOL_SEARCH_RADIUS_M", "1500");
        env::set_var("DETAILS_LOOKUP", "coordinates");
        env::set_var("APP_CORS_ORIGINS", "https://a.example, ,https://b.example");
        let config = AppConfig::load().expect("config loads");
        reset_env();

        assert_eq!(config.upstream.opencage_api_key, "secret");
        assert_eq!(config.upstream.timeout, Duration::from_secs(10));
        assert_eq!(config.upstream.school_radius_m, 1500);
        assert_eq!(
            config.upstream.details_lookup,
            DetailsLookupMode::Coordinates
        );
        assert_eq!(
            config.cors.allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn rejects_zero_timeout() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("UPSTREAM_TIMEOUT_SECS", "0");
        let result = AppConfig::load();
        reset_env();

        match result {
            Err(ConfigError::InvalidNumber { name, .. }) => {
                assert_eq!(name, "UPSTREAM_TIMEOUT_SECS")
            }
            other => panic!("expected invalid number, got {other:?}"),
        }
    }
}
