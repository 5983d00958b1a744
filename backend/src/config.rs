use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::elevation::{DEFAULT_PACING, DEFAULT_TIMEOUT, MAX_BATCH_SIZE};
use crate::simulation::default_base_elevation;

pub const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8080);
pub const DEFAULT_ROUTE_SOURCE: &str = "data/ruta_pla.geojson";
pub const DEFAULT_ROUTE_NAME: &str = "Ruta Pla";
pub const DEFAULT_POIS_SOURCE: &str = "data/talayots.geojson";
pub const DEFAULT_ELEVATION_API_URL: &str = "https://api.open-elevation.com/api/v1/lookup";
pub const DEFAULT_MAX_API_POINTS: usize = 200;
pub const DEFAULT_CHART_POINTS: usize = 500;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElevationConfig {
    pub api_url: String,
    pub batch_size: usize,
    pub pacing: Duration,
    /// Per-request limit, covering connect through the last body byte.
    pub timeout: Duration,
}

impl Default for ElevationConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_ELEVATION_API_URL.to_string(),
            batch_size: MAX_BATCH_SIZE,
            pacing: DEFAULT_PACING,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Knobs for turning a route into a chart profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileSettings {
    /// Upper bound (approximate) on points sent to the elevation service.
    pub max_api_points: usize,
    /// Approximate number of points emitted for the chart.
    pub chart_points: usize,
    /// Base level for simulated profiles, in metres.
    pub base_elevation: f64,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            max_api_points: DEFAULT_MAX_API_POINTS,
            chart_points: DEFAULT_CHART_POINTS,
            base_elevation: default_base_elevation(DEFAULT_ROUTE_NAME),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub route_source: String,
    pub route_name: String,
    pub pois_source: Option<String>,
    pub elevation: ElevationConfig,
    pub profile: ProfileSettings,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let route_name = get("ROUTE_NAME").unwrap_or_else(|| DEFAULT_ROUTE_NAME.to_string());
        let base_elevation = match get("SIM_BASE_ELEVATION") {
            Some(raw) => parse("SIM_BASE_ELEVATION", raw)?,
            None => default_base_elevation(&route_name),
        };

        let pois_source = match lookup("POIS_SOURCE") {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(v),
            None => Some(DEFAULT_POIS_SOURCE.to_string()),
        };

        let batch_size: usize = parse_or(&get, "ELEVATION_BATCH_SIZE", MAX_BATCH_SIZE)?;
        let pacing_ms: u64 = parse_or(&get, "ELEVATION_PACING_MS", 200)?;
        let timeout_ms: u64 = parse_or(&get, "ELEVATION_TIMEOUT_MS", 10_000)?;

        Ok(Self {
            bind_addr: parse_or(&get, "BIND_ADDR", DEFAULT_BIND_ADDR)?,
            route_source: get("ROUTE_SOURCE").unwrap_or_else(|| DEFAULT_ROUTE_SOURCE.to_string()),
            route_name,
            pois_source,
            elevation: ElevationConfig {
                api_url: get("ELEVATION_API_URL")
                    .unwrap_or_else(|| DEFAULT_ELEVATION_API_URL.to_string()),
                batch_size: batch_size.clamp(1, MAX_BATCH_SIZE),
                pacing: Duration::from_millis(pacing_ms),
                timeout: Duration::from_millis(timeout_ms.max(1)),
            },
            profile: ProfileSettings {
                max_api_points: parse_or(&get, "ELEVATION_MAX_POINTS", DEFAULT_MAX_API_POINTS)?
                    .max(1),
                chart_points: parse_or(&get, "PROFILE_CHART_POINTS", DEFAULT_CHART_POINTS)?.max(1),
                base_elevation,
            },
        })
    }
}

fn parse<T: FromStr>(key: &'static str, raw: String) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value: raw })
}

fn parse_or<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(key) {
        Some(raw) => parse(key, raw),
        None => Ok(default),
    }
}
