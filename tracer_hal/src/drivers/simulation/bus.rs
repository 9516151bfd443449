//! Recording bus.

use tracer_common::hal::driver::{BusHandle, HalError};
use tracing::debug;

/// Bus that records the frames it accepts.
///
/// `new()` keeps every frame; `bounded(n)` keeps only the `n` most recent
/// ones so a long-running simulation stays at a fixed footprint. The total
/// write count is kept either way.
///
/// Fault injection: `truncating(n)` accepts at most `n` bytes per write
/// (a short write), `failing()` rejects every write.
#[derive(Debug, Clone, Default)]
pub struct RecordingBus {
    frames: Vec<Vec<u8>>,
    history: Option<usize>,
    writes: u64,
    accept_limit: Option<usize>,
    fail_writes: bool,
    closed: bool,
}

impl RecordingBus {
    /// Bus that accepts every frame in full.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bus that keeps at most `history` recent frames.
    pub fn bounded(history: usize) -> Self {
        Self {
            frames: Vec::with_capacity(history),
            history: Some(history),
            ..Self::default()
        }
    }

    /// Bus that accepts at most `limit` bytes of each frame.
    pub fn truncating(limit: usize) -> Self {
        Self {
            accept_limit: Some(limit),
            ..Self::default()
        }
    }

    /// Bus whose writes always fail.
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Accepted bytes of the retained writes, oldest first.
    pub fn frames(&self) -> &[Vec<u8>] {
        &self.frames
    }

    /// Number of successful writes since creation, retained or not.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// The most recent accepted frame.
    pub fn last_frame(&self) -> Option<&[u8]> {
        self.frames.last().map(Vec::as_slice)
    }

    /// Whether `close()` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl BusHandle for RecordingBus {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn write(&mut self, frame: &[u8]) -> Result<usize, HalError> {
        if self.closed {
            return Err(HalError::CommunicationError("bus is closed".to_string()));
        }
        if self.fail_writes {
            return Err(HalError::CommunicationError(
                "simulated write failure".to_string(),
            ));
        }
        let accepted = self.accept_limit.map_or(frame.len(), |l| l.min(frame.len()));
        let bytes = &frame[..accepted];
        match self.history {
            Some(0) => {}
            Some(cap) if self.frames.len() >= cap => {
                // Recycle the oldest buffer.
                let mut oldest = self.frames.remove(0);
                oldest.clear();
                oldest.extend_from_slice(bytes);
                self.frames.push(oldest);
            }
            _ => self.frames.push(bytes.to_vec()),
        }
        self.writes += 1;
        debug!("Recorded frame {:02x?} ({}/{} bytes)", &frame[..accepted], accepted, frame.len());
        Ok(accepted)
    }

    fn close(&mut self) -> Result<(), HalError> {
        self.closed = true;
        Ok(())
    }
}
