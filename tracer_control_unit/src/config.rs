//! Configuration loading for the control unit binary.
//!
//! Reads the TOML file through [`ConfigLoader`], applies command-line
//! overrides, then validates. A missing file is not an error: the built-in
//! defaults describe the stock robot.

use std::path::Path;

use tracer_common::config::{ConfigError, ConfigLoader, TracerConfig};

/// Values given on the command line that take precedence over the file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Replaces `control.cycle_time_us`.
    pub cycle_time_us: Option<u64>,
    /// Replaces `control.max_ticks`.
    pub max_ticks: Option<u64>,
}

impl ConfigOverrides {
    fn apply(&self, config: &mut TracerConfig) {
        if let Some(us) = self.cycle_time_us {
            config.control.cycle_time_us = us;
        }
        if let Some(n) = self.max_ticks {
            config.control.max_ticks = Some(n);
        }
    }
}

/// Validated configuration plus where it came from.
#[derive(Debug)]
pub struct LoadedConfig {
    /// Merged configuration.
    pub config: TracerConfig,
    /// False when the file was missing and defaults were used.
    pub from_file: bool,
}

/// Load, override and validate the configuration at `path`.
///
/// Runs before logging is set up, so it reports through its return value only.
///
/// # Errors
/// `ParseError` for unreadable or malformed files, `ValidationError` when the
/// merged result breaks a rule of [`TracerConfig::validate`].
pub fn load_config(
    path: &Path,
    overrides: &ConfigOverrides,
) -> Result<LoadedConfig, ConfigError> {
    let (mut config, from_file) = match TracerConfig::load(path) {
        Ok(config) => (config, true),
        Err(ConfigError::FileNotFound) => (TracerConfig::default(), false),
        Err(e) => return Err(e),
    };

    overrides.apply(&mut config);
    config.validate()?;
    Ok(LoadedConfig { config, from_file })
}
