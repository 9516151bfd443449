//! # Line Tracer HAL Library
//!
//! Hardware drivers for the line tracer control core. Drivers implement the
//! `SensorSource` and `BusHandle` traits defined in
//! `tracer_common::hal::driver` and are looked up by name through a
//! [`DriverRegistry`].
//!
//! # Module Structure
//!
//! - [`driver_registry`] - Driver factory registration
//! - [`drivers`] - Driver implementations (`linux`, `simulation`)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    tracer_hal                            │
//! │  ┌──────────────────┐       ┌─────────────────────────┐  │
//! │  │  DriverRegistry  │──────►│  linux / simulation     │  │
//! │  └──────────────────┘       └───────────┬─────────────┘  │
//! │                                         ▼                │
//! │                  HardwareHandles { sensors, bus }        │
//! └──────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

pub mod driver_registry;
pub mod drivers;

// Re-export key types for convenience
pub use crate::driver_registry::DriverRegistry;
pub use crate::drivers::linux::{I2cBus, SysfsGpioSensors};
pub use crate::drivers::simulation::{RecordingBus, ScriptedSensors};
