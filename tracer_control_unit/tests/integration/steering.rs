//! Integration test: steering decisions across ticks.
//!
//! Validates: hysteresis bridging of line-lost readings, table selection and
//! determinism of the decision engine.

use tracer_common::sensor::SensorState;
use tracer_control_unit::decision::{DecisionEngine, TableKind};
use tracer_control_unit::hysteresis::HysteresisStore;

use super::patterns;

/// Drive the engine the way the loop does: decide, then record.
fn steer(readings: &[SensorState]) -> (Vec<(u16, u16)>, HysteresisStore) {
    let engine = DecisionEngine::new();
    let mut store = HysteresisStore::new();
    let speeds = readings
        .iter()
        .map(|&raw| {
            let d = engine.decide(raw, &store);
            store.record(d.effective);
            (d.command.left_speed, d.command.right_speed)
        })
        .collect();
    (speeds, store)
}

#[test]
fn lost_after_left_edge_uses_fallback_row() {
    let engine = DecisionEngine::new();
    let store = HysteresisStore::with_pattern("1100".parse().unwrap());
    let d = engine.decide(SensorState::LOST, &store);
    assert_eq!((d.command.left_speed, d.command.right_speed), (110, 30));
    assert_eq!(d.table, TableKind::Fallback);
}

#[test]
fn same_inputs_same_decision() {
    let engine = DecisionEngine::new();
    for stored in ["0000", "0010", "1100", "0100", "1111"] {
        let store = HysteresisStore::with_pattern(stored.parse().unwrap());
        for i in 0..16u8 {
            let raw = SensorState::from(tracer_common::sensor::SensorPattern::from_index(
                usize::from(i),
            ));
            assert_eq!(engine.decide(raw, &store), engine.decide(raw, &store));
        }
    }
}

#[test]
fn chained_dropout_repeats_last_turn() {
    let (speeds, store) = steer(&patterns(&["0010", "0000", "0000"]));
    assert_eq!(speeds, vec![(30, 140); 3]);
    assert_eq!(store.pattern().to_string(), "0010");
}

#[test]
fn fresh_reading_replaces_stored_pattern() {
    let (speeds, store) = steer(&patterns(&["1000", "0000", "0001", "0000"]));
    assert_eq!(speeds, vec![(130, 20), (130, 20), (20, 150), (20, 150)]);
    assert_eq!(store.pattern().to_string(), "0001");
}

#[test]
fn dropout_at_startup_drives_straight() {
    let (speeds, store) = steer(&patterns(&["0000", "0000", "0110"]));
    assert_eq!(speeds, vec![(100, 100), (100, 100), (200, 190)]);
    assert_eq!(store.pattern().to_string(), "0110");
}

#[test]
fn unlisted_reading_is_remembered() {
    // 0101 has no entry: straight ahead, but it still becomes the stored
    // pattern, so the following dropout drives straight too.
    let (speeds, store) = steer(&patterns(&["0010", "0101", "0000"]));
    assert_eq!(speeds, vec![(30, 140), (100, 100), (100, 100)]);
    assert_eq!(store.pattern().to_string(), "0101");
}
