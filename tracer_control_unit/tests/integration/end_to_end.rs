//! Integration test: sensors → loop → bus.
//!
//! Validates: per-tick command sequence, final hysteresis state, delivery
//! accounting, bounded frame history and driver construction from a TOML
//! configuration.

use std::sync::atomic::AtomicBool;
use std::time::Duration;

use tracer_common::config::TracerConfig;
use tracer_control_unit::actuation::ActuationError;
use tracer_control_unit::cycle::{ControlLoop, LoopConfig, LoopExit};
use tracer_hal::{DriverRegistry, RecordingBus, ScriptedSensors};

use super::{patterns, scripted};

fn ticks(n: u64) -> LoopConfig {
    LoopConfig {
        period: Duration::ZERO,
        stop_on_shutdown: false,
        max_ticks: Some(n),
    }
}

#[test]
fn dropout_bridged_then_recovered() {
    let sensors = scripted(&["0001", "0000", "0000", "0110"]);
    let mut cl = ControlLoop::new(sensors, RecordingBus::new(), ticks(4));

    assert_eq!(cl.run(&AtomicBool::new(true)), LoopExit::TickLimit);

    let frames = cl.bus().frames();
    assert_eq!(
        frames,
        &[
            vec![0x01, 0x01, 20, 0x01, 150],
            vec![0x01, 0x01, 20, 0x01, 150],
            vec![0x01, 0x01, 20, 0x01, 150],
            vec![0x01, 0x01, 200, 0x01, 190],
        ]
    );
    assert_eq!(cl.hysteresis().pattern().to_string(), "0110");
    assert_eq!(cl.stats().fallback_ticks, 2);
    assert_eq!(cl.stats().frames_delivered, 4);
    assert_eq!(cl.sensors().reads(), 4);
}

#[test]
fn short_writes_do_not_halt_the_loop() {
    let sensors = scripted(&["0010", "0000", "0100"]);
    let mut cl = ControlLoop::new(sensors, RecordingBus::truncating(3), ticks(3));

    let report = cl.tick();
    assert!(matches!(
        report.outcome,
        Err(ActuationError::ShortWrite {
            expected: 5,
            accepted: 3
        })
    ));
    // Hysteresis advances even when delivery is not guaranteed.
    assert_eq!(cl.hysteresis().pattern().to_string(), "0010");

    assert_eq!(cl.run(&AtomicBool::new(true)), LoopExit::TickLimit);
    assert_eq!(cl.stats().ticks, 3);
    assert_eq!(cl.stats().short_writes, 3);
    assert_eq!(cl.stats().frames_delivered, 0);
    assert_eq!(cl.hysteresis().pattern().to_string(), "0100");
}

#[test]
fn simulation_driver_from_config() {
    let config = TracerConfig::from_toml(
        r#"
[control]
cycle_time_us = 0
max_ticks = 5

[simulation]
script = ["0010", "0000", "0011"]
"#,
    )
    .unwrap();
    config.validate().unwrap();

    let handles = DriverRegistry::with_builtin_drivers()
        .create("simulation", &config)
        .unwrap();
    let mut cl = ControlLoop::new(handles.sensors, handles.bus, LoopConfig::from(&config.control));

    assert_eq!(cl.run(&AtomicBool::new(true)), LoopExit::TickLimit);
    assert_eq!(cl.stats().ticks, 5);
    // Script exhausted after three reads: the last two ticks are line lost.
    assert_eq!(cl.stats().fallback_ticks, 3);
    assert_eq!(cl.hysteresis().pattern().to_string(), "0011");
    cl.close().unwrap();
}

#[test]
fn bounded_bus_keeps_recent_frames_over_long_run() {
    let sensors = ScriptedSensors::new(patterns(&["0110"]), true);
    let mut cl = ControlLoop::new(sensors, RecordingBus::bounded(16), ticks(10_000));

    assert_eq!(cl.run(&AtomicBool::new(true)), LoopExit::TickLimit);
    assert_eq!(cl.bus().frames().len(), 16);
    assert_eq!(cl.bus().writes(), 10_000);
    assert_eq!(cl.bus().last_frame(), Some(&[0x01u8, 0x01, 200, 0x01, 190][..]));
}
