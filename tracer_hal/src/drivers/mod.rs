//! Hardware driver implementations.
//!
//! - [`linux`] - Raspberry Pi style hardware: sysfs GPIO sensors + i2c-dev bus
//! - [`simulation`] - Scripted sensors and a recording bus for development and testing
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement `SensorSource` / `BusHandle` from `tracer_common::hal::driver`
//! 3. Expose a `create_driver(&TracerConfig)` factory
//! 4. Register it in [`register_all_drivers`]

pub mod linux;
pub mod simulation;

use crate::driver_registry::DriverRegistry;

/// Register all built-in drivers.
pub fn register_all_drivers(registry: &mut DriverRegistry) {
    registry.register("linux", linux::create_driver);
    registry.register("simulation", simulation::create_driver);
}
