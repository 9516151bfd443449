//! Driver registry for hardware drivers.
//!
//! Provides a `DriverRegistry` struct for registering driver factories by
//! name and turning a configuration into live hardware handles.
//! Constructed at startup and passed by value; no global state.

use std::collections::HashMap;
use tracer_common::config::TracerConfig;
use tracer_common::hal::driver::{DriverFactory, HalError, HardwareHandles};
use tracing::info;

/// Registry of available hardware drivers.
pub struct DriverRegistry {
    factories: HashMap<&'static str, DriverFactory>,
}

impl DriverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry with every built-in driver registered.
    pub fn with_builtin_drivers() -> Self {
        let mut registry = Self::new();
        crate::drivers::register_all_drivers(&mut registry);
        registry
    }

    /// Register a driver factory.
    ///
    /// # Panics
    /// Panics if a driver with the same name is already registered.
    pub fn register(&mut self, name: &'static str, factory: DriverFactory) {
        if self.factories.contains_key(name) {
            panic!("Driver '{name}' is already registered");
        }
        self.factories.insert(name, factory);
    }

    /// Get a driver factory by name.
    pub fn get_factory(&self, name: &str) -> Option<DriverFactory> {
        self.factories.get(name).copied()
    }

    /// Open the hardware of the named driver.
    ///
    /// # Errors
    /// Returns `HalError::DriverNotFound` if no driver with the given name is
    /// registered, or whatever the driver's factory reports (typically
    /// `HalError::TransportUnavailable`).
    pub fn create(&self, name: &str, config: &TracerConfig) -> Result<HardwareHandles, HalError> {
        let factory = self
            .get_factory(name)
            .ok_or_else(|| HalError::DriverNotFound(name.to_string()))?;
        let handles = factory(config)?;
        info!(
            "Driver '{}' ready: sensors={}, bus={}",
            name,
            handles.sensors.name(),
            handles.bus.name()
        );
        Ok(handles)
    }

    /// List all registered driver names.
    pub fn list_drivers(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}
