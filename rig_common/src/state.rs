//! Sequencer state enums.
//!
//! `DrillPhase` uses `#[repr(u8)]` so the resume slot can store the raw
//! phase index; `from_u8` rejects out-of-range values on load. `RunMode`
//! gates the scheduler cadence and is independent of phase progression.

use serde::{Deserialize, Serialize};

/// Phase of the drilling cycle.
///
/// Exactly one phase is active at any time. Transitions are strictly
/// sequential and wrap from `MergingTop` back to `Extending`; each guard
/// depends only on physical state produced by the preceding phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DrillPhase {
    /// Tools on, rotor spinning, pistons driving toward full extension.
    Extending = 0,
    /// Pistons travelling; holds until every piston reaches the extended stop.
    WaitExtended = 1,
    /// Bottom merge block armed; holds until the far end bonds to the bore.
    MergingBottom = 2,
    /// Grinders on, pistons pulling back to the retracted stop.
    Retracting = 3,
    /// Top merge block armed; holds until the near end bonds again.
    MergingTop = 4,
}

impl DrillPhase {
    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Extending),
            1 => Some(Self::WaitExtended),
            2 => Some(Self::MergingBottom),
            3 => Some(Self::Retracting),
            4 => Some(Self::MergingTop),
            _ => None,
        }
    }

    /// Raw phase index, as persisted in the resume slot.
    #[inline]
    pub const fn index(&self) -> u8 {
        *self as u8
    }

    /// Short human-readable activity label for status output.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Extending => "starting drilling sequence",
            Self::WaitExtended => "drilling",
            Self::MergingBottom => "merging bottom",
            Self::Retracting => "retracting",
            Self::MergingTop => "merging top",
        }
    }
}

impl Default for DrillPhase {
    fn default() -> Self {
        Self::Extending
    }
}

/// Whether the host scheduler delivers periodic ticks to the sequencer.
///
/// Set only by explicit start/stop/resume commands, never by phase logic.
/// Stopping leaves the phase and all issued hardware commands untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RunMode {
    /// Cadence suspended; scheduled ticks are not delivered.
    Stopped = 0,
    /// Cadence active.
    Running = 1,
}

impl Default for RunMode {
    fn default() -> Self {
        Self::Stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_from_u8_roundtrip() {
        for raw in 0..=4u8 {
            let phase = DrillPhase::from_u8(raw).expect("valid index");
            assert_eq!(phase.index(), raw);
        }
    }

    #[test]
    fn phase_from_u8_rejects_out_of_range() {
        assert_eq!(DrillPhase::from_u8(5), None);
        assert_eq!(DrillPhase::from_u8(255), None);
    }

    #[test]
    fn default_phase_is_extending() {
        assert_eq!(DrillPhase::default(), DrillPhase::Extending);
    }

    #[test]
    fn default_run_mode_is_stopped() {
        assert_eq!(RunMode::default(), RunMode::Stopped);
    }

    #[test]
    fn labels_are_nonempty() {
        for raw in 0..=4u8 {
            let phase = DrillPhase::from_u8(raw).unwrap();
            assert!(!phase.label().is_empty());
        }
    }
}
