//! Rig configuration: named hardware bindings and motion setpoints.
//!
//! Loaded once at startup from TOML and validated before anything touches
//! the hardware. Group and device names identify the actuators a backend
//! must resolve; setpoints are the fixed motion targets of the drilling
//! cycle. None of this is runtime-editable.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::RigError;

/// Per-piston completion tolerance [linear units].
///
/// The group is at position only when every piston is strictly within this
/// distance of the target.
pub const POSITION_TOLERANCE: f32 = 0.05;

// ─── Named Hardware ─────────────────────────────────────────────────

/// Names of actuator groups and singleton devices on the rig.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigNames {
    /// Piston group driving the drill assembly.
    pub piston_group: String,
    /// Drill group at the cutting face.
    pub drill_group: String,
    /// Welder group reinforcing the bore walls.
    pub welder_group: String,
    /// Grinder group clearing the tunnel interior on retract.
    pub grinder_group: String,
    /// Rotor spinning the drill head.
    pub rotor: String,
    /// Connector at the top (near) end.
    pub connector_top: String,
    /// Connector at the bottom (far) end.
    pub connector_bottom: String,
    /// Merge block at the top (near) end.
    pub merge_top: String,
    /// Merge block at the bottom (far) end.
    pub merge_bottom: String,
    /// Status panel. Optional hardware; writes to a missing panel are absorbed.
    pub status_panel: String,
}

impl Default for RigNames {
    fn default() -> Self {
        Self {
            piston_group: "Rig Pistons".to_string(),
            drill_group: "Rig Drills".to_string(),
            welder_group: "Rig Welders".to_string(),
            grinder_group: "Rig Grinders".to_string(),
            rotor: "Rig Rotor".to_string(),
            connector_top: "Rig Connector Top".to_string(),
            connector_bottom: "Rig Connector Bottom".to_string(),
            merge_top: "Rig Merge Top".to_string(),
            merge_bottom: "Rig Merge Bottom".to_string(),
            status_panel: "Rig Status Panel".to_string(),
        }
    }
}

// ─── Motion Setpoints ───────────────────────────────────────────────

/// Fixed motion targets of the drilling cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Setpoints {
    /// Piston stroke at the retracted stop [linear units].
    pub retracted_position: f32,
    /// Piston stroke at the extended stop [linear units].
    pub extended_position: f32,
    /// Extend drive speed [units/s], positive.
    pub extend_velocity: f32,
    /// Retract drive speed [units/s], negative.
    pub retract_velocity: f32,
    /// Drill head angular rate while cutting [rpm].
    pub rotor_velocity: f32,
}

impl Default for Setpoints {
    fn default() -> Self {
        Self {
            retracted_position: 1.1,
            extended_position: 8.6,
            extend_velocity: 0.02,
            retract_velocity: -0.5,
            rotor_velocity: 5.0,
        }
    }
}

// ─── Rig Config ─────────────────────────────────────────────────────

/// Complete static rig configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    /// Named actuator groups and singleton devices.
    pub names: RigNames,
    /// Motion setpoints.
    pub setpoints: Setpoints,
    /// Host scheduler cadence [ms].
    pub tick_interval_ms: u64,
    /// Resume-slot location.
    pub state_file: PathBuf,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            names: RigNames::default(),
            setpoints: Setpoints::default(),
            tick_interval_ms: 1600,
            state_file: PathBuf::from("rig_phase.txt"),
        }
    }
}

impl RigConfig {
    /// Validate parameter bounds and sign conventions.
    pub fn validate(&self) -> Result<(), RigError> {
        let sp = &self.setpoints;
        for (name, value) in [
            ("retracted_position", sp.retracted_position),
            ("extended_position", sp.extended_position),
            ("extend_velocity", sp.extend_velocity),
            ("retract_velocity", sp.retract_velocity),
            ("rotor_velocity", sp.rotor_velocity),
        ] {
            if !value.is_finite() {
                return Err(RigError::ConfigValidation(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        if sp.extended_position <= sp.retracted_position {
            return Err(RigError::ConfigValidation(format!(
                "extended_position ({}) must be greater than retracted_position ({})",
                sp.extended_position, sp.retracted_position
            )));
        }
        if sp.extend_velocity <= 0.0 {
            return Err(RigError::ConfigValidation(format!(
                "extend_velocity must be positive, got {}",
                sp.extend_velocity
            )));
        }
        if sp.retract_velocity >= 0.0 {
            return Err(RigError::ConfigValidation(format!(
                "retract_velocity must be negative, got {}",
                sp.retract_velocity
            )));
        }
        if sp.rotor_velocity == 0.0 {
            return Err(RigError::ConfigValidation(
                "rotor_velocity must be non-zero".to_string(),
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(RigError::ConfigValidation(
                "tick_interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

// ─── Loading Functions ──────────────────────────────────────────────

/// Load and validate the rig configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RigConfig, RigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| RigError::ConfigIo(format!("failed to read {}: {e}", path.display())))?;
    load_config_from_str(&text)
}

/// Load config from a TOML string (also used by tests).
pub fn load_config_from_str(text: &str) -> Result<RigConfig, RigError> {
    let config: RigConfig =
        toml::from_str(text).map_err(|e| RigError::ConfigParse(format!("rig config: {e}")))?;
    config.validate()?;
    Ok(config)
}
