//! Configuration loading traits and types.
//!
//! This module provides a standardized way to load the TOML configuration
//! file of the line tracer.
//!
//! # Usage
//!
//! ```rust,no_run
//! use tracer_common::config::{ConfigLoader, ConfigError, TracerConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = TracerConfig::load(Path::new("tracer.toml"))?;
//!     config.validate()?;
//!     println!("Service: {}", config.shared.service_name);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::consts::{
    CYCLE_TIME_US, DEFAULT_BUS_ADDRESS, DEFAULT_BUS_DEVICE, DEFAULT_GPIO_ROOT,
    DEFAULT_SENSOR_PINS, DEFAULT_SIM_HISTORY, SENSOR_COUNT, SERVICE_NAME,
};
use crate::sensor::SensorState;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, per-tick tracing.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

fn default_service_name() -> String {
    SERVICE_NAME.to_string()
}

/// Common fields shared by every tracer process.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "tracer-lab-01"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: default_service_name(),
        }
    }
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_cycle_time_us() -> u64 {
    CYCLE_TIME_US
}

fn default_true() -> bool {
    true
}

/// `[control]` section: loop cadence and shutdown behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControlConfig {
    /// Control period in microseconds. `0` runs ticks back to back.
    #[serde(default = "default_cycle_time_us")]
    pub cycle_time_us: u64,

    /// Send a stop frame when the loop is cancelled.
    #[serde(default = "default_true")]
    pub stop_on_shutdown: bool,

    /// Stop after this many ticks (unbounded when absent).
    #[serde(default)]
    pub max_ticks: Option<u64>,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            cycle_time_us: default_cycle_time_us(),
            stop_on_shutdown: true,
            max_ticks: None,
        }
    }
}

fn default_bus_device() -> PathBuf {
    PathBuf::from(DEFAULT_BUS_DEVICE)
}

fn default_bus_address() -> u16 {
    DEFAULT_BUS_ADDRESS
}

/// `[bus]` section: where the motor controller lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BusConfig {
    /// I2C character device.
    #[serde(default = "default_bus_device")]
    pub device: PathBuf,

    /// 7-bit peripheral address.
    #[serde(default = "default_bus_address")]
    pub address: u16,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            device: default_bus_device(),
            address: default_bus_address(),
        }
    }
}

fn default_gpio_root() -> PathBuf {
    PathBuf::from(DEFAULT_GPIO_ROOT)
}

fn default_sensor_pins() -> [u32; SENSOR_COUNT] {
    DEFAULT_SENSOR_PINS
}

/// `[sensors]` section: GPIO lines of the four line sensors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SensorConfig {
    /// Sysfs GPIO root directory.
    #[serde(default = "default_gpio_root")]
    pub gpio_root: PathBuf,

    /// GPIO line numbers for s1, s2, s3, s4.
    #[serde(default = "default_sensor_pins")]
    pub pins: [u32; SENSOR_COUNT],
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            gpio_root: default_gpio_root(),
            pins: default_sensor_pins(),
        }
    }
}

/// `[simulation]` section: scripted sensor input for the simulation driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    /// Sensor patterns replayed one per tick (`"s4s3s2s1"` strings).
    #[serde(default)]
    pub script: Vec<SensorState>,

    /// Restart the script when it runs out (otherwise report line lost).
    #[serde(default)]
    pub repeat: bool,

    /// Most recent bus frames kept in memory (0 keeps only the count).
    #[serde(default = "default_sim_history")]
    pub history: usize,
}

fn default_sim_history() -> usize {
    DEFAULT_SIM_HISTORY
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            script: Vec::new(),
            repeat: false,
            history: default_sim_history(),
        }
    }
}

/// Complete tracer configuration (`tracer.toml`).
///
/// Every section is optional; omitted sections take their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TracerConfig {
    /// Shared process settings.
    #[serde(default)]
    pub shared: SharedConfig,

    /// Control loop settings.
    #[serde(default)]
    pub control: ControlConfig,

    /// Motor controller bus settings.
    #[serde(default)]
    pub bus: BusConfig,

    /// Line sensor settings.
    #[serde(default)]
    pub sensors: SensorConfig,

    /// Simulation driver settings.
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl TracerConfig {
    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validate the configuration.
    ///
    /// # Validation Rules
    /// 1. `shared.service_name` is not empty
    /// 2. `bus.address` is a usable 7-bit address (0x03..=0x77)
    /// 3. `bus.device` is not empty
    /// 4. sensor pins are distinct
    /// 5. `control.max_ticks`, when set, is greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if !(0x03..=0x77).contains(&self.bus.address) {
            return Err(ConfigError::ValidationError(format!(
                "bus.address 0x{:02x} is outside the 7-bit range 0x03..=0x77",
                self.bus.address
            )));
        }

        if self.bus.device.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "bus.device cannot be empty".to_string(),
            ));
        }

        let pins = &self.sensors.pins;
        for (i, pin) in pins.iter().enumerate() {
            if pins[i + 1..].contains(pin) {
                return Err(ConfigError::ValidationError(format!(
                    "sensor pin {pin} is assigned more than once"
                )));
            }
        }

        if self.control.max_ticks == Some(0) {
            return Err(ConfigError::ValidationError(
                "control.max_ticks must be greater than 0 when set".to_string(),
            ));
        }

        Ok(())
    }
}

/// Trait for loading configuration from TOML files.
///
/// This trait provides a default implementation that works with any type
/// implementing `serde::de::DeserializeOwned`.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
