//! Configuration loader for the `aero-guardian` backend service.
//!
//! This module centralizes all runtime configuration values and their
//! defaults, loading from environment variables (with optional `.env` file
//! support provided by the caller). By consolidating configuration logic
//! here, we avoid scattering `env::var` calls throughout the codebase.
//!
//! Everything is optional and has a working default, so the demo pipeline
//! starts with no environment at all.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};

use crate::models::{RiskThresholds, RouteOffsets};

// ---

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u64 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u64>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse an optional float environment variable with a default value.
macro_rules! parse_env_f64 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<f64>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Read an optional string environment variable with a default value.
macro_rules! env_or {
    ($var_name:expr, $default:expr) => {
        env::var($var_name).unwrap_or_else(|_| $default.to_string())
    };
}

/// A monitored city: the entity the generator produces readings for, plus
/// the map position the dashboard joins into API responses.
#[derive(Debug, Clone)]
pub struct CityConfig {
    // ---
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Which pipeline components this process runs. All three by default; a
/// deployment can split them into separate processes, coordinated only
/// through the two store files.
#[derive(Debug, Clone, Copy)]
pub struct Components {
    // ---
    pub generator: bool,
    pub transformer: bool,
    pub api: bool,
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent
/// configuration snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Append-only raw store written by the generator.
    pub raw_store: PathBuf,

    /// Derived store rewritten by the transformer, read by the API.
    pub derived_store: PathBuf,

    /// Interval between generator ticks.
    pub generator_interval: Duration,

    /// Interval between transformer passes.
    pub transformer_interval: Duration,

    /// Lower bound of the simulated pollutant range.
    pub pollutant_min: f64,

    /// Upper bound of the simulated pollutant range.
    pub pollutant_max: f64,

    /// Risk-classification thresholds.
    pub thresholds: RiskThresholds,

    /// Additive route-exposure offsets.
    pub route_offsets: RouteOffsets,

    /// Monitored cities with their map positions.
    pub cities: Vec<CityConfig>,

    /// Port the viewer-facing HTTP API binds to.
    pub http_port: u16,

    /// Components this process runs.
    pub components: Components,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            raw_store: PathBuf::from("pollution.csv"),
            derived_store: PathBuf::from("dashboard.csv"),
            generator_interval: Duration::from_secs(10),
            transformer_interval: Duration::from_secs(5),
            pollutant_min: 50.0,
            pollutant_max: 450.0,
            thresholds: RiskThresholds::default(),
            route_offsets: RouteOffsets::default(),
            cities: default_cities(),
            http_port: 8080,
            components: Components {
                generator: true,
                transformer: true,
                api: true,
            },
        }
    }
}

/// Load configuration from environment variables with defaults.
///
/// All variables are optional:
/// - `AERO_RAW_STORE` – raw store path (default: `pollution.csv`)
/// - `AERO_DERIVED_STORE` – derived store path (default: `dashboard.csv`)
/// - `AERO_GENERATOR_INTERVAL_SECS` – generator cadence (default: 10)
/// - `AERO_TRANSFORMER_INTERVAL_SECS` – transformer cadence (default: 5)
/// - `AERO_POLLUTANT_MIN` / `AERO_POLLUTANT_MAX` – simulated range (default: 50/450)
/// - `AERO_THRESHOLD_MODERATE` / `_UNHEALTHY` / `_VERY_UNHEALTHY` / `_HAZARDOUS`
///   – risk thresholds (default: 100/150/200/300, strictly ascending)
/// - `AERO_ROUTE_A_OFFSET` / `_B_OFFSET` / `_C_OFFSET` – route offsets
///   (default: 20/-30/10)
/// - `AERO_CITIES` – `Name:lat:lon` triples, comma separated
/// - `AERO_HTTP_PORT` – API port (default: 8080)
/// - `AERO_COMPONENTS` – subset of `generator,transformer,api`
///
/// Returns an error if any variable is present but invalid, or if the
/// resulting configuration is inconsistent.
pub fn load_from_env() -> Result<Config> {
    // ---
    let defaults = Config::default();

    let generator_interval = Duration::from_secs(parse_env_u64!("AERO_GENERATOR_INTERVAL_SECS", 10));
    let transformer_interval =
        Duration::from_secs(parse_env_u64!("AERO_TRANSFORMER_INTERVAL_SECS", 5));

    let thresholds = RiskThresholds {
        moderate: parse_env_f64!("AERO_THRESHOLD_MODERATE", defaults.thresholds.moderate),
        unhealthy: parse_env_f64!("AERO_THRESHOLD_UNHEALTHY", defaults.thresholds.unhealthy),
        very_unhealthy: parse_env_f64!(
            "AERO_THRESHOLD_VERY_UNHEALTHY",
            defaults.thresholds.very_unhealthy
        ),
        hazardous: parse_env_f64!("AERO_THRESHOLD_HAZARDOUS", defaults.thresholds.hazardous),
    };

    let route_offsets = RouteOffsets {
        route_a: parse_env_f64!("AERO_ROUTE_A_OFFSET", defaults.route_offsets.route_a),
        route_b: parse_env_f64!("AERO_ROUTE_B_OFFSET", defaults.route_offsets.route_b),
        route_c: parse_env_f64!("AERO_ROUTE_C_OFFSET", defaults.route_offsets.route_c),
    };

    let cities = match env::var("AERO_CITIES") {
        Ok(spec) => parse_cities(&spec)?,
        Err(_) => default_cities(),
    };

    let components = parse_components(&env_or!("AERO_COMPONENTS", "generator,transformer,api"))?;

    let http_port = u16::try_from(parse_env_u64!("AERO_HTTP_PORT", 8080))
        .map_err(|_| anyhow!("Invalid AERO_HTTP_PORT: not a valid port number"))?;

    let config = Config {
        raw_store: PathBuf::from(env_or!("AERO_RAW_STORE", "pollution.csv")),
        derived_store: PathBuf::from(env_or!("AERO_DERIVED_STORE", "dashboard.csv")),
        generator_interval,
        transformer_interval,
        pollutant_min: parse_env_f64!("AERO_POLLUTANT_MIN", defaults.pollutant_min),
        pollutant_max: parse_env_f64!("AERO_POLLUTANT_MAX", defaults.pollutant_max),
        thresholds,
        route_offsets,
        cities,
        http_port,
        components,
    };

    config.validate()?;
    Ok(config)
}

/// The default monitored cities, matching the demo feed.
pub fn default_cities() -> Vec<CityConfig> {
    // ---
    vec![
        CityConfig {
            name: "Delhi".to_string(),
            lat: 28.6139,
            lon: 77.2090,
        },
        CityConfig {
            name: "Mumbai".to_string(),
            lat: 19.0760,
            lon: 72.8777,
        },
        CityConfig {
            name: "Kanpur".to_string(),
            lat: 26.4499,
            lon: 80.3319,
        },
    ]
}

/// Parse an `AERO_CITIES` value: comma-separated `Name:lat:lon` triples.
fn parse_cities(spec: &str) -> Result<Vec<CityConfig>> {
    // ---
    let mut cities = Vec::new();
    for entry in spec.split(',').filter(|e| !e.trim().is_empty()) {
        let parts: Vec<&str> = entry.trim().split(':').collect();
        if parts.len() != 3 {
            bail!("Invalid AERO_CITIES entry '{}': expected Name:lat:lon", entry);
        }
        let lat = parts[1]
            .parse::<f64>()
            .map_err(|e| anyhow!("Invalid latitude in AERO_CITIES entry '{}': {}", entry, e))?;
        let lon = parts[2]
            .parse::<f64>()
            .map_err(|e| anyhow!("Invalid longitude in AERO_CITIES entry '{}': {}", entry, e))?;
        cities.push(CityConfig {
            name: parts[0].to_string(),
            lat,
            lon,
        });
    }
    Ok(cities)
}

/// Parse an `AERO_COMPONENTS` value: comma-separated component names.
fn parse_components(spec: &str) -> Result<Components> {
    // ---
    let mut components = Components {
        generator: false,
        transformer: false,
        api: false,
    };
    for name in spec.split(',').filter(|n| !n.trim().is_empty()) {
        match name.trim() {
            "generator" => components.generator = true,
            "transformer" => components.transformer = true,
            "api" => components.api = true,
            other => bail!(
                "Unknown component '{}' in AERO_COMPONENTS (expected generator, transformer, api)",
                other
            ),
        }
    }
    if !components.generator && !components.transformer && !components.api {
        bail!("AERO_COMPONENTS selects no components");
    }
    Ok(components)
}

impl Config {
    /// Reject configurations that parse but cannot run.
    fn validate(&self) -> Result<()> {
        // ---
        if self.cities.is_empty() {
            bail!("AERO_CITIES must name at least one city");
        }
        if self.pollutant_min < 0.0 {
            bail!("AERO_POLLUTANT_MIN must be non-negative");
        }
        if self.pollutant_min >= self.pollutant_max {
            bail!(
                "Pollutant range is empty: min {} >= max {}",
                self.pollutant_min,
                self.pollutant_max
            );
        }
        let t = &self.thresholds;
        if !(t.moderate < t.unhealthy && t.unhealthy < t.very_unhealthy
            && t.very_unhealthy < t.hazardous)
        {
            bail!(
                "Risk thresholds must be strictly ascending, got {}/{}/{}/{}",
                t.moderate,
                t.unhealthy,
                t.very_unhealthy,
                t.hazardous
            );
        }
        if self.generator_interval.is_zero() || self.transformer_interval.is_zero() {
            bail!("Component intervals must be at least one second");
        }
        Ok(())
    }

    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        let city_names: Vec<&str> = self.cities.iter().map(|c| c.name.as_str()).collect();
        let mut enabled = Vec::new();
        if self.components.generator {
            enabled.push("generator");
        }
        if self.components.transformer {
            enabled.push("transformer");
        }
        if self.components.api {
            enabled.push("api");
        }

        tracing::info!("Configuration loaded:");
        tracing::info!("  AERO_RAW_STORE            : {}", self.raw_store.display());
        tracing::info!("  AERO_DERIVED_STORE        : {}", self.derived_store.display());
        tracing::info!(
            "  AERO_GENERATOR_INTERVAL   : {}s",
            self.generator_interval.as_secs()
        );
        tracing::info!(
            "  AERO_TRANSFORMER_INTERVAL : {}s",
            self.transformer_interval.as_secs()
        );
        tracing::info!(
            "  Pollutant range           : [{}, {}]",
            self.pollutant_min,
            self.pollutant_max
        );
        tracing::info!(
            "  Risk thresholds           : {}/{}/{}/{}",
            self.thresholds.moderate,
            self.thresholds.unhealthy,
            self.thresholds.very_unhealthy,
            self.thresholds.hazardous
        );
        tracing::info!(
            "  Route offsets             : {}/{}/{}",
            self.route_offsets.route_a,
            self.route_offsets.route_b,
            self.route_offsets.route_c
        );
        tracing::info!("  Cities                    : {}", city_names.join(", "));
        tracing::info!("  AERO_HTTP_PORT            : {}", self.http_port);
        tracing::info!("  Components                : {}", enabled.join(", "));
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_parse_cities() {
        // ---
        let cities = parse_cities("Delhi:28.6139:77.2090,Mumbai:19.0760:72.8777").unwrap();
        assert_eq!(cities.len(), 2);
        assert_eq!(cities[0].name, "Delhi");
        assert_eq!(cities[0].lat, 28.6139);
        assert_eq!(cities[1].lon, 72.8777);

        assert!(parse_cities("Delhi:28.6139").is_err());
        assert!(parse_cities("Delhi:north:77.2").is_err());
    }

    #[test]
    fn test_parse_components() {
        // ---
        let all = parse_components("generator,transformer,api").unwrap();
        assert!(all.generator && all.transformer && all.api);

        let api_only = parse_components("api").unwrap();
        assert!(!api_only.generator && !api_only.transformer && api_only.api);

        assert!(parse_components("viewer").is_err());
        assert!(parse_components("").is_err());
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        // ---
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.pollutant_min = 500.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.thresholds.unhealthy = 90.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.cities.clear();
        assert!(config.validate().is_err());
    }
}
