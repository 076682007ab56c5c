//! Application configuration loaded once at startup.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::models::GridPoint;

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "HAULAGE_CONFIG";

/// Directory under the platform config/data roots used by the application.
pub const APP_DIR: &str = "haulage";

/// Top-level configuration consumed by the dispatcher and cost engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Location of the depot every delivery starts from.
    pub company: CompanyConfig,
    /// Bounds accepted for new customer coordinates.
    pub grid_limits: GridLimits,
    /// Per-vehicle speed and delay parameters.
    pub vehicles: VehicleConfig,
    /// Persistent user collection.
    pub users: StorageConfig,
    /// Persistent customer collection.
    pub customers: StorageConfig,
}

/// Grid position of the company depot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CompanyConfig {
    /// Horizontal coordinate.
    pub grid_x: i64,
    /// Vertical coordinate.
    pub grid_y: i64,
}

impl CompanyConfig {
    /// Depot position as a grid point.
    pub fn origin(&self) -> GridPoint {
        GridPoint {
            x: self.grid_x,
            y: self.grid_y,
        }
    }
}

/// Inclusive coordinate bounds for customer locations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GridLimits {
    /// Smallest accepted X.
    pub min_x: i64,
    /// Largest accepted X.
    pub max_x: i64,
    /// Smallest accepted Y.
    pub min_y: i64,
    /// Largest accepted Y.
    pub max_y: i64,
}

/// Parameters for every supported transport method.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct VehicleConfig {
    /// Road haulage.
    pub lorry: LorryConfig,
    /// Waterway haulage.
    pub canal_boat: CanalBoatConfig,
    /// Air delivery.
    pub helicopter: HelicopterConfig,
}

/// Lorry speed and traffic model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LorryConfig {
    /// Grid units per hour.
    pub speed: f64,
    /// Minutes lost at each traffic stop.
    pub traffic_delay_time: f64,
    /// Grid units travelled between traffic stops.
    pub traffic_delay_frequency: f64,
}

/// Canal boat speed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CanalBoatConfig {
    /// Grid units per hour.
    pub speed: f64,
}

/// Helicopter speed and fixed start-up delay.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HelicopterConfig {
    /// Grid units per hour.
    pub speed: f64,
    /// Minutes spent before take-off.
    pub initial_delay: f64,
}

/// Location of a JSON-backed record collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Path to the collection file.
    pub file_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_root = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR);
        Self {
            company: CompanyConfig {
                grid_x: 0,
                grid_y: 0,
            },
            grid_limits: GridLimits {
                min_x: -100,
                max_x: 100,
                min_y: -100,
                max_y: 100,
            },
            vehicles: VehicleConfig {
                lorry: LorryConfig {
                    speed: 30.0,
                    traffic_delay_time: 15.0,
                    traffic_delay_frequency: 10.0,
                },
                canal_boat: CanalBoatConfig { speed: 5.0 },
                helicopter: HelicopterConfig {
                    speed: 100.0,
                    initial_delay: 10.0,
                },
            },
            users: StorageConfig {
                file_path: data_root.join("users.json"),
            },
            customers: StorageConfig {
                file_path: data_root.join("customers.json"),
            },
        }
    }
}

impl AppConfig {
    /// Resolve the configuration file location.
    pub fn default_path() -> PathBuf {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.json")
    }

    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path())
    }

    /// Load configuration from `path`, applying `HAULAGE__SECTION__KEY` overrides.
    ///
    /// Files written with camelCase keys (`gridLimits`, `filePath`) load the
    /// same as snake_case ones.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = read_normalized(path)?;
        let settings = Config::builder()
            .add_source(File::from_str(&source, FileFormat::Json))
            .add_source(
                Environment::with_prefix("HAULAGE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: AppConfig = settings
            .try_deserialize()
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the cost engine and input validation cannot work with.
    pub fn validate(&self) -> Result<()> {
        let vehicles = &self.vehicles;
        for (name, speed) in [
            ("lorry", vehicles.lorry.speed),
            ("canal_boat", vehicles.canal_boat.speed),
            ("helicopter", vehicles.helicopter.speed),
        ] {
            if !(speed.is_finite() && speed > 0.0) {
                bail!("vehicles.{name}.speed must be positive, got {speed}");
            }
        }
        let frequency = vehicles.lorry.traffic_delay_frequency;
        if !(frequency.is_finite() && frequency > 0.0) {
            bail!("vehicles.lorry.traffic_delay_frequency must be positive, got {frequency}");
        }
        for (name, minutes) in [
            ("lorry.traffic_delay_time", vehicles.lorry.traffic_delay_time),
            ("helicopter.initial_delay", vehicles.helicopter.initial_delay),
        ] {
            if !(minutes.is_finite() && minutes >= 0.0) {
                bail!("vehicles.{name} must not be negative, got {minutes}");
            }
        }
        let limits = &self.grid_limits;
        if limits.min_x > limits.max_x || limits.min_y > limits.max_y {
            bail!(
                "grid_limits are inverted: x {}..{}, y {}..{}",
                limits.min_x,
                limits.max_x,
                limits.min_y,
                limits.max_y
            );
        }
        Ok(())
    }

    /// Write this configuration as pretty JSON, creating parent directories.
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create config directory {}", parent.display())
            })?;
        }
        let serialized =
            serde_json::to_string_pretty(self).context("failed to serialize configuration")?;
        fs::write(path, serialized)
            .with_context(|| format!("failed to write config {}", path.display()))
    }
}

fn read_normalized(path: &Path) -> Result<String> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    serde_json::to_string(&snake_case_keys(value)).context("failed to re-encode configuration")
}

fn snake_case_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (snake_case(&key), snake_case_keys(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(snake_case_keys).collect()),
        other => other,
    }
}

fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Write the default configuration if no file exists yet, returning its path.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = AppConfig::default_path();
    if !path.exists() {
        info!(path = %path.display(), "writing default configuration");
        AppConfig::default().persist(&path)?;
    }
    Ok(path)
}
