//! Integration test: frames on the bus.

use tracer_common::hal::driver::HalError;
use tracer_common::motor::{MotorCommand, SpeedPair};
use tracer_control_unit::actuation::{ActuationEncoder, ActuationError, STOP_FRAME, Side};
use tracer_hal::RecordingBus;

#[test]
fn stop_writes_two_bytes() {
    let mut enc = ActuationEncoder::new(RecordingBus::new());
    enc.stop().unwrap();
    assert_eq!(enc.bus().frames(), &[vec![2u8, 0]]);
    assert_eq!(STOP_FRAME, [2, 0]);
}

#[test]
fn left_speed_256_rejected_without_writing() {
    let mut enc = ActuationEncoder::new(RecordingBus::new());
    let cmd = MotorCommand::forward(SpeedPair::new(256, 0));
    let err = enc.drive(&cmd).unwrap_err();
    assert!(matches!(
        err,
        ActuationError::InvalidCommand {
            side: Side::Left,
            speed: 256
        }
    ));
    assert!(enc.bus().frames().is_empty());
}

#[test]
fn drive_sequence_on_bus() {
    let mut enc = ActuationEncoder::new(RecordingBus::new());
    enc.drive(&MotorCommand::forward(SpeedPair::new(130, 20))).unwrap();
    enc.drive(&MotorCommand::forward(SpeedPair::new(0, 255))).unwrap();
    enc.stop().unwrap();
    assert_eq!(
        enc.bus().frames(),
        &[
            vec![0x01, 0x01, 130, 0x01, 20],
            vec![0x01, 0x01, 0, 0x01, 255],
            vec![0x02, 0x00],
        ]
    );
}

#[test]
fn closed_bus_is_transport_error() {
    let mut enc = ActuationEncoder::new(RecordingBus::new());
    enc.close().unwrap();
    assert!(matches!(
        enc.stop(),
        Err(ActuationError::Transport(HalError::CommunicationError(_)))
    ));
    assert!(enc.into_inner().is_closed());
}
