mod actuation;
mod end_to_end;
mod process;
mod properties;
mod shutdown;
mod steering;

use tracer_common::sensor::SensorState;
use tracer_hal::ScriptedSensors;

/// Parse a list of `s4s3s2s1` strings.
pub fn patterns(list: &[&str]) -> Vec<SensorState> {
    list.iter().map(|p| p.parse().expect("valid pattern")).collect()
}

/// Non-repeating scripted source.
pub fn scripted(list: &[&str]) -> ScriptedSensors {
    ScriptedSensors::new(patterns(list), false)
}
