//! Integration test: cancellation of a running loop.
//!
//! Validates: a cleared running flag ends a regulated loop from another
//! thread and the last frame on the bus is the stop frame.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracer_control_unit::cycle::{ControlLoop, LoopConfig, LoopExit};
use tracer_hal::{RecordingBus, ScriptedSensors};

use super::patterns;

#[test]
fn cancel_sends_stop_frame() {
    let sensors = ScriptedSensors::new(patterns(&["0110", "0010", "0000"]), true);
    let config = LoopConfig {
        period: Duration::from_millis(1),
        stop_on_shutdown: true,
        max_ticks: None,
    };
    let mut cl = ControlLoop::new(sensors, RecordingBus::new(), config);

    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    let worker = thread::spawn(move || {
        let exit = cl.run(&flag);
        (exit, cl)
    });

    thread::sleep(Duration::from_millis(30));
    running.store(false, Ordering::Release);
    let (exit, cl) = worker.join().unwrap();

    assert_eq!(exit, LoopExit::Cancelled);
    assert!(cl.stats().ticks > 0);
    let frames = cl.bus().frames();
    assert_eq!(frames.last().unwrap(), &vec![0x02, 0x00]);
    assert_eq!(frames.len() as u64, cl.stats().ticks + 1);
    assert!(frames[..frames.len() - 1].iter().all(|f| f.len() == 5));
}

#[test]
fn tick_limit_also_sends_stop_frame() {
    let sensors = ScriptedSensors::new(patterns(&["1000"]), true);
    let config = LoopConfig {
        period: Duration::ZERO,
        stop_on_shutdown: true,
        max_ticks: Some(2),
    };
    let mut cl = ControlLoop::new(sensors, RecordingBus::new(), config);
    assert_eq!(cl.run(&AtomicBool::new(true)), LoopExit::TickLimit);
    assert_eq!(cl.bus().last_frame(), Some(&[0x02u8, 0x00][..]));
    assert_eq!(cl.bus().frames().len(), 3);
}
