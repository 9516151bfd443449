//! Hardware driver traits and error types.
//!
//! This module defines:
//! - `SensorSource` trait - produces one `SensorState` per tick
//! - `BusHandle` trait - accepts raw command frames for the motor controller
//! - `HardwareHandles` - the pair of handles a driver hands to the control loop
//! - `HalError` enum - Error types for hardware operations
//! - `DriverFactory` type alias - Factory function type

use crate::config::TracerConfig;
use crate::sensor::SensorState;
use thiserror::Error;

/// Error types for hardware operations.
#[derive(Debug, Clone, Error)]
pub enum HalError {
    /// Driver initialization failed
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// The bus could not be opened or the peripheral address selected
    #[error("Transport unavailable: {0}")]
    TransportUnavailable(String),

    /// A write to an open bus failed
    #[error("Hardware communication error: {0}")]
    CommunicationError(String),

    /// Sampling the sensor inputs failed
    #[error("Sensor read error: {0}")]
    SensorRead(String),

    /// Driver not found
    #[error("Driver not found: {0}")]
    DriverNotFound(String),
}

/// Source of line sensor snapshots.
///
/// Called exactly once per control tick. Debouncing, if any, belongs to the
/// implementation.
pub trait SensorSource: Send {
    /// Returns the source's identifier (e.g., "sysfs-gpio", "scripted").
    fn name(&self) -> &'static str;

    /// Sample all four sensors.
    ///
    /// # Errors
    /// Return `HalError::SensorRead` if the inputs cannot be sampled.
    fn read_sensors(&mut self) -> Result<SensorState, HalError>;
}

/// Byte-oriented channel to the motor controller.
pub trait BusHandle: Send {
    /// Returns the bus identifier (e.g., "i2c-dev", "recording").
    fn name(&self) -> &'static str;

    /// Submit one frame, returning how many bytes the transport accepted.
    ///
    /// A count smaller than `frame.len()` is not an error at this level;
    /// callers decide what a short write means.
    ///
    /// # Errors
    /// Return `HalError::CommunicationError` if the write itself fails.
    fn write(&mut self, frame: &[u8]) -> Result<usize, HalError>;

    /// Release the underlying channel.
    ///
    /// Default implementation does nothing (resources dropped with the handle).
    fn close(&mut self) -> Result<(), HalError> {
        Ok(())
    }
}

impl<S: SensorSource + ?Sized> SensorSource for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn read_sensors(&mut self) -> Result<SensorState, HalError> {
        (**self).read_sensors()
    }
}

impl<B: BusHandle + ?Sized> BusHandle for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn write(&mut self, frame: &[u8]) -> Result<usize, HalError> {
        (**self).write(frame)
    }

    fn close(&mut self) -> Result<(), HalError> {
        (**self).close()
    }
}

/// Handles produced by a driver for the control loop.
pub struct HardwareHandles {
    /// Sensor input.
    pub sensors: Box<dyn SensorSource>,
    /// Motor controller bus.
    pub bus: Box<dyn BusHandle>,
}

impl std::fmt::Debug for HardwareHandles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HardwareHandles")
            .field("sensors", &self.sensors.name())
            .field("bus", &self.bus.name())
            .finish()
    }
}

/// Factory function type for creating driver instances.
pub type DriverFactory = fn(&TracerConfig) -> Result<HardwareHandles, HalError>;
