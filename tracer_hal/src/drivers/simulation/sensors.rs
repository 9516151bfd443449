//! Scripted sensor source.

use tracer_common::hal::driver::{HalError, SensorSource};
use tracer_common::sensor::SensorState;
use tracing::trace;

/// Sensor source that replays a fixed list of snapshots, one per read.
///
/// Once the script is exhausted it either wraps around (`repeat`) or keeps
/// reporting "line lost".
#[derive(Debug, Clone)]
pub struct ScriptedSensors {
    script: Vec<SensorState>,
    position: usize,
    repeat: bool,
}

impl ScriptedSensors {
    /// Create a scripted source.
    pub fn new(script: Vec<SensorState>, repeat: bool) -> Self {
        Self {
            script,
            position: 0,
            repeat,
        }
    }

    /// Number of reads served so far.
    pub fn reads(&self) -> usize {
        self.position
    }
}

impl SensorSource for ScriptedSensors {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn read_sensors(&mut self) -> Result<SensorState, HalError> {
        let state = if self.script.is_empty() {
            SensorState::LOST
        } else if self.repeat {
            self.script[self.position % self.script.len()]
        } else {
            self.script
                .get(self.position)
                .copied()
                .unwrap_or(SensorState::LOST)
        };
        self.position += 1;
        trace!("Scripted read #{}: {}", self.position, state);
        Ok(state)
    }
}
