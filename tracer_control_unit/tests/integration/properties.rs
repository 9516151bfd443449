//! Property tests for the decision engine and encoder.

use proptest::prelude::*;
use tracer_common::motor::{Direction, MotorCommand, SpeedPair};
use tracer_common::sensor::{SensorPattern, SensorState};
use tracer_control_unit::actuation::{ActuationError, encode_drive};
use tracer_control_unit::decision::{DecisionEngine, TableKind};
use tracer_control_unit::hysteresis::HysteresisStore;

fn state(bits: u8) -> SensorState {
    SensorState::from(SensorPattern::from_index(usize::from(bits)))
}

proptest! {
    /// Any decision encodes into a valid drive frame.
    #[test]
    fn decisions_always_encodable(raw in 0u8..16, stored in 0u8..16) {
        let store = HysteresisStore::with_pattern(state(stored));
        let d = DecisionEngine::new().decide(state(raw), &store);
        let frame = encode_drive(&d.command).unwrap();
        prop_assert_eq!(frame[0], 0x01);
        prop_assert_eq!(frame[1], Direction::Forward.as_byte());
        prop_assert_eq!(frame[3], Direction::Forward.as_byte());
    }

    /// A non-lost reading never depends on the store and becomes the effective pattern.
    #[test]
    fn raw_reading_independent_of_store(raw in 1u8..16, a in 0u8..16, b in 0u8..16) {
        let engine = DecisionEngine::new();
        let da = engine.decide(state(raw), &HysteresisStore::with_pattern(state(a)));
        let db = engine.decide(state(raw), &HysteresisStore::with_pattern(state(b)));
        prop_assert_eq!(da.command, db.command);
        prop_assert_eq!(da.effective, state(raw));
        prop_assert_eq!(da.table, TableKind::Primary);
    }

    /// A run of lost readings keeps the stored pattern and repeats one command.
    #[test]
    fn dropout_run_is_stable(start in 1u8..16, run in 1usize..20) {
        let engine = DecisionEngine::new();
        let mut store = HysteresisStore::new();
        store.record(engine.decide(state(start), &store).effective);
        let first = engine.decide(SensorState::LOST, &store).command;
        for _ in 0..run {
            let d = engine.decide(SensorState::LOST, &store);
            store.record(d.effective);
            prop_assert_eq!(d.command, first);
        }
        prop_assert_eq!(store.pattern(), state(start));
    }

    /// Speeds above 255 never produce a frame.
    #[test]
    fn oversized_speed_rejected(left in 0u16..=1000, right in 0u16..=1000) {
        let cmd = MotorCommand::forward(SpeedPair::new(left, right));
        let result = encode_drive(&cmd);
        if left > 255 || right > 255 {
            prop_assert!(
                matches!(result, Err(ActuationError::InvalidCommand { .. })),
                "expected InvalidCommand"
            );
        } else {
            let frame = result.unwrap();
            prop_assert_eq!(u16::from(frame[2]), left);
            prop_assert_eq!(u16::from(frame[4]), right);
        }
    }
}
