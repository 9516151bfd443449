//! Actuation encoder: motor commands → motor controller frames.
//!
//! ## Wire format
//!
//! | Frame | Bytes |
//! |-------|-------|
//! | Drive | `0x01, left_dir, left_speed, right_dir, right_speed` |
//! | Stop  | `0x02, 0x00` |
//!
//! Directions are `1` forward / `0` reverse, speeds one byte each. A frame
//! counts as delivered only when the bus accepted every byte; short writes
//! are reported, never retried.

use std::fmt;

use static_assertions::const_assert_eq;
use thiserror::Error;
use tracer_common::consts::{DRIVE_FRAME_LEN, OPCODE_DRIVE, OPCODE_STOP, SPEED_MAX, STOP_FRAME_LEN};
use tracer_common::hal::driver::{BusHandle, HalError};
use tracer_common::motor::MotorCommand;
use tracing::trace;

/// Encoded drive frame.
pub type DriveFrame = [u8; DRIVE_FRAME_LEN];

/// Encoded stop frame.
pub type StopFrame = [u8; STOP_FRAME_LEN];

const_assert_eq!(core::mem::size_of::<DriveFrame>(), 5);
const_assert_eq!(core::mem::size_of::<StopFrame>(), 2);

/// The stop frame; identical on every call.
pub const STOP_FRAME: StopFrame = [OPCODE_STOP, 0x00];

/// Wheel side, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Left wheel.
    Left,
    /// Right wheel.
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Right => "right",
        })
    }
}

/// Errors raised while encoding or submitting a frame.
#[derive(Debug, Clone, Error)]
pub enum ActuationError {
    /// A speed does not fit the one-byte wire field. Nothing was written.
    #[error("invalid command: {side} speed {speed} exceeds {max}", max = SPEED_MAX)]
    InvalidCommand {
        /// Offending wheel.
        side: Side,
        /// Offending speed.
        speed: u16,
    },

    /// The bus accepted fewer bytes than the frame holds.
    #[error("short write: {accepted} of {expected} bytes accepted")]
    ShortWrite {
        /// Frame length.
        expected: usize,
        /// Bytes the bus reported as accepted.
        accepted: usize,
    },

    /// The bus write failed outright.
    #[error("transport error: {0}")]
    Transport(#[from] HalError),
}

/// Encode a drive frame, rejecting speeds above 255.
pub fn encode_drive(command: &MotorCommand) -> Result<DriveFrame, ActuationError> {
    let left = speed_byte(Side::Left, command.left_speed)?;
    let right = speed_byte(Side::Right, command.right_speed)?;
    Ok([
        OPCODE_DRIVE,
        command.left_direction.as_byte(),
        left,
        command.right_direction.as_byte(),
        right,
    ])
}

fn speed_byte(side: Side, speed: u16) -> Result<u8, ActuationError> {
    u8::try_from(speed).map_err(|_| ActuationError::InvalidCommand { side, speed })
}

/// Encoder bound to one bus; the single writer of that bus.
#[derive(Debug)]
pub struct ActuationEncoder<B: BusHandle> {
    bus: B,
}

impl<B: BusHandle> ActuationEncoder<B> {
    /// Take ownership of the bus.
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Encode and send a drive frame.
    ///
    /// # Errors
    /// - `InvalidCommand` before any byte is written
    /// - `ShortWrite` if the bus accepted fewer than 5 bytes
    /// - `Transport` if the write failed
    pub fn drive(&mut self, command: &MotorCommand) -> Result<(), ActuationError> {
        let frame = encode_drive(command)?;
        self.submit(&frame)
    }

    /// Send the stop frame.
    pub fn stop(&mut self) -> Result<(), ActuationError> {
        self.submit(&STOP_FRAME)
    }

    fn submit(&mut self, frame: &[u8]) -> Result<(), ActuationError> {
        trace!("Sending frame {:02x?} on {}", frame, self.bus.name());
        let accepted = self.bus.write(frame)?;
        if accepted != frame.len() {
            return Err(ActuationError::ShortWrite {
                expected: frame.len(),
                accepted,
            });
        }
        Ok(())
    }

    /// The underlying bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Release the underlying bus channel.
    pub fn close(&mut self) -> Result<(), HalError> {
        self.bus.close()
    }

    /// Give the bus back.
    pub fn into_inner(self) -> B {
        self.bus
    }
}
