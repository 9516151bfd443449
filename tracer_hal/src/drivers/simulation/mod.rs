//! Simulation driver module.
//!
//! Replays a scripted sequence of sensor patterns and records every frame
//! written to the bus, for development and testing without the robot.

mod bus;
mod sensors;

pub use bus::RecordingBus;
pub use sensors::ScriptedSensors;

use tracer_common::config::{SimulationConfig, TracerConfig};
use tracer_common::hal::driver::{HalError, HardwareHandles};
use tracing::info;

/// Factory function to create the simulation hardware.
pub fn create_driver(config: &TracerConfig) -> Result<HardwareHandles, HalError> {
    let sim = &config.simulation;
    info!(
        "Simulation driver: {} scripted patterns (repeat={}, history={})",
        sim.script.len(),
        sim.repeat,
        sim.history
    );
    Ok(HardwareHandles {
        sensors: Box::new(ScriptedSensors::new(sim.script.clone(), sim.repeat)),
        bus: Box::new(recording_bus(sim)),
    })
}

/// The bus handed out by the simulation driver.
fn recording_bus(sim: &SimulationConfig) -> RecordingBus {
    RecordingBus::bounded(sim.history)
}
