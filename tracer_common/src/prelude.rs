//! Prelude module for common re-exports.
//!
//! Consumers can do `use tracer_common::prelude::*;` and get the most
//! important types without listing individual paths.
//!
//! # Usage
//!
//! ```rust
//! use tracer_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, TracerConfig};

// ─── Sensors / motors ───────────────────────────────────────────────
pub use crate::motor::{Direction, MotorCommand, SpeedPair};
pub use crate::sensor::{SensorPattern, SensorState};

// ─── Hardware contracts ─────────────────────────────────────────────
pub use crate::hal::driver::{BusHandle, HalError, HardwareHandles, SensorSource};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{CYCLE_TIME_US, SPEED_MAX};
