//! Rig driver trait and supporting types.
//!
//! This module defines:
//! - `RigDriver` trait - Interface for pluggable rig backends
//! - `ToolGroup` / `RigEnd` - Typed actuator addresses
//! - `DriverFactory` type alias - Factory function type
//!
//! The sequencer depends only on this trait, never on a concrete hardware
//! API, so tests can substitute a simulated rig with scripted readings.

use std::time::Duration;

use crate::config::RigConfig;
use crate::error::RigError;

/// Tool groups addressed as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolGroup {
    /// Cutting drills at the face.
    Drills,
    /// Welders reinforcing the bore.
    Welders,
    /// Grinders clearing the tunnel interior.
    Grinders,
}

/// The two docking ends of the rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RigEnd {
    /// Near end, where the bore started.
    Top,
    /// Far end, deepest point of the bore.
    Bottom,
}

/// Factory function type for creating driver instances.
pub type DriverFactory = fn() -> Box<dyn RigDriver>;

/// Trait defining the interface between the sequencer and rig hardware.
///
/// # Lifecycle
///
/// 1. `init()` - Called once; resolves configured group and device names
/// 2. Command/read methods - Called from the sequencer's step, once per tick
/// 3. `advance()` - Called by the host scheduler between ticks
///
/// # Absence semantics
///
/// A named group that resolves to nothing degrades to an empty group:
/// group commands become no-ops and `piston_positions` returns empty. A
/// missing singleton device is a latent configuration fault: it surfaces
/// as `RigError::MissingDevice` the moment a command or read targets it,
/// since the rig cannot mine without its core devices. The status panel is
/// the one exception: `write_status` absorbs every failure.
pub trait RigDriver: Send {
    /// Returns the driver's unique identifier (e.g., "simulation").
    fn name(&self) -> &'static str;

    /// Returns the driver's semantic version.
    fn version(&self) -> &'static str;

    /// Resolve configured hardware names. Called once before the first step.
    fn init(&mut self, config: &RigConfig) -> Result<(), RigError>;

    /// Enable or disable every member of a tool group. Idempotent; no-op on
    /// an empty group.
    fn set_tools_enabled(&mut self, group: ToolGroup, on: bool);

    /// Current stroke position of each piston, in group order. Always a
    /// fresh read; empty when the group is absent.
    fn piston_positions(&self) -> Vec<f32>;

    /// Command one piston's signed drive velocity. Out-of-range index is a
    /// no-op.
    fn set_piston_velocity(&mut self, index: usize, velocity: f32);

    /// Set the drill head's target angular rate.
    fn set_rotor_velocity(&mut self, velocity: f32) -> Result<(), RigError>;

    /// Lock the connector at one end.
    fn connect(&mut self, end: RigEnd) -> Result<(), RigError>;

    /// Release the connector at one end.
    fn disconnect(&mut self, end: RigEnd) -> Result<(), RigError>;

    /// Arm or disarm the merge block at one end.
    fn set_merge_enabled(&mut self, end: RigEnd, on: bool) -> Result<(), RigError>;

    /// Docking status of the merge block at one end: bonded AND armed.
    fn merge_docked(&self, end: RigEnd) -> Result<bool, RigError>;

    /// Best-effort status line. Failures (including a missing panel) are
    /// silently absorbed, never propagated to the sequencer.
    fn write_status(&mut self, text: &str);

    /// Let the backend evolve by `dt` between ticks.
    ///
    /// Real hardware moves by itself; simulated hardware integrates piston
    /// motion and docking here. Default implementation does nothing.
    fn advance(&mut self, _dt: Duration) {
        // Default: no-op
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    struct TestDriver {
        initialized: bool,
    }

    impl RigDriver for TestDriver {
        fn name(&self) -> &'static str {
            "test"
        }

        fn version(&self) -> &'static str {
            "0.1.0"
        }

        fn init(&mut self, _config: &RigConfig) -> Result<(), RigError> {
            self.initialized = true;
            Ok(())
        }

        fn set_tools_enabled(&mut self, _group: ToolGroup, _on: bool) {}

        fn piston_positions(&self) -> Vec<f32> {
            Vec::new()
        }

        fn set_piston_velocity(&mut self, _index: usize, _velocity: f32) {}

        fn set_rotor_velocity(&mut self, _velocity: f32) -> Result<(), RigError> {
            Ok(())
        }

        fn connect(&mut self, _end: RigEnd) -> Result<(), RigError> {
            Ok(())
        }

        fn disconnect(&mut self, _end: RigEnd) -> Result<(), RigError> {
            Ok(())
        }

        fn set_merge_enabled(&mut self, _end: RigEnd, _on: bool) -> Result<(), RigError> {
            Ok(())
        }

        fn merge_docked(&self, _end: RigEnd) -> Result<bool, RigError> {
            Ok(false)
        }

        fn write_status(&mut self, _text: &str) {}
    }

    #[test]
    fn trait_object_usable_through_box() {
        let mut driver: Box<dyn RigDriver> = Box::new(TestDriver { initialized: false });
        driver.init(&RigConfig::default()).unwrap();
        assert_eq!(driver.name(), "test");
        assert!(driver.piston_positions().is_empty());
        // Default advance is a no-op.
        driver.advance(Duration::from_millis(100));
    }
}
