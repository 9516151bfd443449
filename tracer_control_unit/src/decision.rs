//! Decision engine: sensor pattern → differential wheel speeds.
//!
//! Two lookup tables indexed by the 4-bit pattern `s4 s3 s2 s1`:
//!
//! - [`PRIMARY_TABLE`] for every raw reading except "line lost"
//! - [`FALLBACK_TABLE`] for line-lost ticks, evaluated against the pattern
//!   held in the [`HysteresisStore`]
//!
//! Patterns without an entry drive straight at [`DEFAULT_SPEEDS`].
//!
//! The tables disagree on `1100` and `0100` (primary `(130,70)`/`(90,40)`,
//! fallback `(110,30)`/`(130,70)`). Both are kept as shipped on the robot;
//! do not merge them.

use tracer_common::consts::PATTERN_COUNT;
use tracer_common::motor::{MotorCommand, SpeedPair};
use tracer_common::sensor::{SensorPattern, SensorState};

use crate::hysteresis::HysteresisStore;

/// Speeds used when no table entry matches.
pub const DEFAULT_SPEEDS: SpeedPair = SpeedPair::new(100, 100);

/// Which table produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// Raw reading looked up directly.
    Primary,
    /// Line lost; stored pattern looked up in the recovery table.
    Fallback,
}

/// Fixed pattern → speed mapping.
#[derive(Debug)]
pub struct DecisionTable {
    kind: TableKind,
    entries: [Option<SpeedPair>; PATTERN_COUNT],
}

const fn rows(list: &[(u8, SpeedPair)]) -> [Option<SpeedPair>; PATTERN_COUNT] {
    let mut entries = [None; PATTERN_COUNT];
    let mut i = 0;
    while i < list.len() {
        let (bits, speeds) = list[i];
        entries[bits as usize] = Some(speeds);
        i += 1;
    }
    entries
}

/// Table for raw readings.
pub static PRIMARY_TABLE: DecisionTable = DecisionTable {
    kind: TableKind::Primary,
    entries: rows(&[
        (0b1000, SpeedPair::new(130, 20)),
        (0b1100, SpeedPair::new(130, 70)),
        (0b0100, SpeedPair::new(90, 40)),
        (0b0110, SpeedPair::new(200, 190)),
        (0b0010, SpeedPair::new(30, 140)),
        (0b0011, SpeedPair::new(30, 150)),
        (0b0001, SpeedPair::new(20, 150)),
    ]),
};

/// Table for line-lost ticks, keyed by the stored pattern.
pub static FALLBACK_TABLE: DecisionTable = DecisionTable {
    kind: TableKind::Fallback,
    entries: rows(&[
        (0b1000, SpeedPair::new(130, 20)),
        (0b1100, SpeedPair::new(110, 30)),
        (0b0100, SpeedPair::new(130, 70)),
        (0b0110, SpeedPair::new(200, 190)),
        (0b0010, SpeedPair::new(30, 140)),
        (0b0011, SpeedPair::new(30, 150)),
        (0b0001, SpeedPair::new(20, 150)),
    ]),
};

impl DecisionTable {
    /// Which table this is.
    #[inline]
    pub const fn kind(&self) -> TableKind {
        self.kind
    }

    /// Explicit entry for a pattern, if any.
    #[inline]
    pub const fn entry(&self, pattern: SensorPattern) -> Option<SpeedPair> {
        self.entries[pattern.index()]
    }

    /// Speeds for a pattern, falling back to [`DEFAULT_SPEEDS`].
    #[inline]
    pub const fn lookup(&self, pattern: SensorPattern) -> SpeedPair {
        match self.entry(pattern) {
            Some(speeds) => speeds,
            None => DEFAULT_SPEEDS,
        }
    }
}

/// Result of one decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Command to actuate.
    pub command: MotorCommand,
    /// Pattern the command was computed from; becomes the new hysteresis pattern.
    pub effective: SensorState,
    /// Table consulted.
    pub table: TableKind,
    /// True when the table had no entry and [`DEFAULT_SPEEDS`] was used.
    pub defaulted: bool,
}

/// Pure mapping `(raw reading, hysteresis) → Decision`.
#[derive(Debug, Clone, Copy)]
pub struct DecisionEngine {
    primary: &'static DecisionTable,
    fallback: &'static DecisionTable,
}

impl DecisionEngine {
    /// Engine over the standard tables.
    pub const fn new() -> Self {
        Self {
            primary: &PRIMARY_TABLE,
            fallback: &FALLBACK_TABLE,
        }
    }

    /// Decide the command for one tick.
    ///
    /// A non-lost reading is looked up in the primary table and is itself the
    /// effective pattern. A lost reading substitutes the stored pattern and
    /// looks that up in the fallback table, so a run of lost readings keeps
    /// reapplying the same stored pattern.
    pub fn decide(&self, raw: SensorState, hysteresis: &HysteresisStore) -> Decision {
        let (table, effective) = if raw.is_lost() {
            (self.fallback, hysteresis.pattern())
        } else {
            (self.primary, raw)
        };

        let entry = table.entry(effective.pattern());
        Decision {
            command: MotorCommand::forward(entry.unwrap_or(DEFAULT_SPEEDS)),
            effective,
            table: table.kind(),
            defaulted: entry.is_none(),
        }
    }
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new()
    }
}
