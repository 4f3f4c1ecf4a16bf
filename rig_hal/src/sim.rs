//! Simulation backend.
//!
//! `SimRig` implements the `RigDriver` trait to provide a software-emulated
//! mining rig for development and testing without physical hardware.
//!
//! Pistons integrate their commanded velocity between ticks, clamped to
//! the configured stroke stops. A merge block bonds after a fixed delay of
//! continuous enablement, so docking stays asynchronous relative to the
//! command that initiates it. Disabling a merge block drops the bond and
//! resets its dock timer.

use std::time::Duration;

use tracing::{debug, info};

use rig_common::config::{RigConfig, RigNames};
use rig_common::driver::{RigDriver, RigEnd, ToolGroup};
use rig_common::error::RigError;

/// Piston stroke limits before `init` configures the real stops [linear units].
const DEFAULT_MIN_STROKE: f32 = 0.0;
const DEFAULT_MAX_STROKE: f32 = 10.0;
/// Default time a merge block must stay armed before it bonds.
const DEFAULT_DOCK_DELAY: Duration = Duration::from_secs(2);
/// Default piston group size.
const DEFAULT_PISTONS: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
struct SimPiston {
    position: f32,
    velocity: f32,
}

#[derive(Debug, Clone, Copy, Default)]
struct SimConnector {
    present: bool,
    connected: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct SimMerge {
    present: bool,
    enabled: bool,
    connected: bool,
    /// Time spent armed and unbonded; bonding completes at the dock delay.
    armed_for: Duration,
}

/// Simulated rig implementing the `RigDriver` trait.
pub struct SimRig {
    initialized: bool,
    names: RigNames,
    dock_delay: Duration,
    /// Piston stroke stops; init sets them to the configured travel range,
    /// the way a rig's pistons carry mechanical limits at the setpoints.
    min_stroke: f32,
    max_stroke: f32,
    pistons: Vec<SimPiston>,
    drills_on: bool,
    welders_on: bool,
    grinders_on: bool,
    rotor_present: bool,
    rotor_rate: f32,
    connector_top: SimConnector,
    connector_bottom: SimConnector,
    merge_top: SimMerge,
    merge_bottom: SimMerge,
    panel_present: bool,
    last_status: Option<String>,
}

impl SimRig {
    /// Create a fully-equipped simulated rig.
    pub fn new() -> Self {
        Self {
            initialized: false,
            names: RigNames::default(),
            dock_delay: DEFAULT_DOCK_DELAY,
            min_stroke: DEFAULT_MIN_STROKE,
            max_stroke: DEFAULT_MAX_STROKE,
            pistons: vec![SimPiston::default(); DEFAULT_PISTONS],
            drills_on: false,
            welders_on: false,
            grinders_on: false,
            rotor_present: true,
            rotor_rate: 0.0,
            connector_top: SimConnector {
                present: true,
                connected: false,
            },
            connector_bottom: SimConnector {
                present: true,
                connected: false,
            },
            merge_top: SimMerge {
                present: true,
                ..SimMerge::default()
            },
            merge_bottom: SimMerge {
                present: true,
                ..SimMerge::default()
            },
            panel_present: true,
            last_status: None,
        }
    }

    /// Set the piston group size (0 simulates an absent group).
    pub fn with_pistons(mut self, count: usize) -> Self {
        self.pistons = vec![SimPiston::default(); count];
        self
    }

    /// Simulate a rig whose rotor is missing.
    pub fn without_rotor(mut self) -> Self {
        self.rotor_present = false;
        self
    }

    /// Simulate a rig whose status panel is missing.
    pub fn without_panel(mut self) -> Self {
        self.panel_present = false;
        self
    }

    /// Override the bonding delay of both merge blocks.
    pub fn with_dock_delay(mut self, delay: Duration) -> Self {
        self.dock_delay = delay;
        self
    }

    // ── Scripting hooks for tests ──

    /// Force every piston to the given positions (extra entries ignored).
    pub fn set_piston_positions(&mut self, positions: &[f32]) {
        for (piston, &p) in self.pistons.iter_mut().zip(positions) {
            piston.position = p;
        }
    }

    /// Commanded drive velocity of each piston, in group order.
    pub fn piston_velocities(&self) -> Vec<f32> {
        self.pistons.iter().map(|p| p.velocity).collect()
    }

    /// Force the bonded flag of a merge block (test scripting).
    pub fn set_merge_connected(&mut self, end: RigEnd, connected: bool) {
        self.merge_state_mut(end).connected = connected;
    }

    /// Whether the merge block at `end` is armed.
    pub fn merge_enabled(&self, end: RigEnd) -> bool {
        self.merge_state(end).enabled
    }

    /// Whether the connector at `end` is locked.
    pub fn connector_connected(&self, end: RigEnd) -> bool {
        match end {
            RigEnd::Top => self.connector_top.connected,
            RigEnd::Bottom => self.connector_bottom.connected,
        }
    }

    /// Drill group enabled flag.
    pub fn drills_enabled(&self) -> bool {
        self.drills_on
    }

    /// Welder group enabled flag.
    pub fn welders_enabled(&self) -> bool {
        self.welders_on
    }

    /// Grinder group enabled flag.
    pub fn grinders_enabled(&self) -> bool {
        self.grinders_on
    }

    /// Current rotor target rate.
    pub fn rotor_rate(&self) -> f32 {
        self.rotor_rate
    }

    /// Last line written to the status panel.
    pub fn last_status(&self) -> Option<&str> {
        self.last_status.as_deref()
    }

    // ── Internals ──

    fn merge_state(&self, end: RigEnd) -> &SimMerge {
        match end {
            RigEnd::Top => &self.merge_top,
            RigEnd::Bottom => &self.merge_bottom,
        }
    }

    fn merge_state_mut(&mut self, end: RigEnd) -> &mut SimMerge {
        match end {
            RigEnd::Top => &mut self.merge_top,
            RigEnd::Bottom => &mut self.merge_bottom,
        }
    }

    fn merge_name(&self, end: RigEnd) -> &str {
        match end {
            RigEnd::Top => &self.names.merge_top,
            RigEnd::Bottom => &self.names.merge_bottom,
        }
    }

    fn connector_name(&self, end: RigEnd) -> &str {
        match end {
            RigEnd::Top => &self.names.connector_top,
            RigEnd::Bottom => &self.names.connector_bottom,
        }
    }

    fn set_connector(&mut self, end: RigEnd, connected: bool) -> Result<(), RigError> {
        let present = match end {
            RigEnd::Top => self.connector_top.present,
            RigEnd::Bottom => self.connector_bottom.present,
        };
        if !present {
            return Err(RigError::MissingDevice(self.connector_name(end).to_string()));
        }
        match end {
            RigEnd::Top => self.connector_top.connected = connected,
            RigEnd::Bottom => self.connector_bottom.connected = connected,
        }
        Ok(())
    }
}

impl Default for SimRig {
    fn default() -> Self {
        Self::new()
    }
}

/// Factory for the driver registry.
pub fn create_driver() -> Box<dyn RigDriver> {
    Box::new(SimRig::new())
}

impl RigDriver for SimRig {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn init(&mut self, config: &RigConfig) -> Result<(), RigError> {
        self.names = config.names.clone();

        // Park the rig at the top of a fresh bore: pistons at the retracted
        // stop, rotor zeroed, near end bonded, far end disarmed.
        self.min_stroke = config.setpoints.retracted_position;
        self.max_stroke = config.setpoints.extended_position;
        for piston in &mut self.pistons {
            piston.position = config.setpoints.retracted_position;
            piston.velocity = 0.0;
        }
        self.rotor_rate = 0.0;
        self.merge_top = SimMerge {
            present: self.merge_top.present,
            enabled: true,
            connected: true,
            armed_for: self.dock_delay,
        };
        self.merge_bottom = SimMerge {
            present: self.merge_bottom.present,
            ..SimMerge::default()
        };
        self.connector_top.connected = false;
        self.connector_bottom.connected = false;
        self.initialized = true;

        info!(
            pistons = self.pistons.len(),
            rotor = self.rotor_present,
            panel = self.panel_present,
            "simulated rig initialized"
        );
        Ok(())
    }

    fn set_tools_enabled(&mut self, group: ToolGroup, on: bool) {
        debug!(?group, on, "set tool group");
        match group {
            ToolGroup::Drills => self.drills_on = on,
            ToolGroup::Welders => self.welders_on = on,
            ToolGroup::Grinders => self.grinders_on = on,
        }
    }

    fn piston_positions(&self) -> Vec<f32> {
        self.pistons.iter().map(|p| p.position).collect()
    }

    fn set_piston_velocity(&mut self, index: usize, velocity: f32) {
        if let Some(piston) = self.pistons.get_mut(index) {
            piston.velocity = velocity;
        }
    }

    fn set_rotor_velocity(&mut self, velocity: f32) -> Result<(), RigError> {
        if !self.rotor_present {
            return Err(RigError::MissingDevice(self.names.rotor.clone()));
        }
        debug!(velocity, "set rotor rate");
        self.rotor_rate = velocity;
        Ok(())
    }

    fn connect(&mut self, end: RigEnd) -> Result<(), RigError> {
        self.set_connector(end, true)
    }

    fn disconnect(&mut self, end: RigEnd) -> Result<(), RigError> {
        self.set_connector(end, false)
    }

    fn set_merge_enabled(&mut self, end: RigEnd, on: bool) -> Result<(), RigError> {
        if !self.merge_state(end).present {
            let name = self.merge_name(end).to_string();
            return Err(RigError::MissingDevice(name));
        }
        let merge = self.merge_state_mut(end);
        merge.enabled = on;
        if !on {
            // Disarming unbonds the junction.
            merge.connected = false;
            merge.armed_for = Duration::ZERO;
        }
        Ok(())
    }

    fn merge_docked(&self, end: RigEnd) -> Result<bool, RigError> {
        let merge = self.merge_state(end);
        if !merge.present {
            let name = self.merge_name(end).to_string();
            return Err(RigError::MissingDevice(name));
        }
        Ok(merge.connected && merge.enabled)
    }

    fn write_status(&mut self, text: &str) {
        if self.panel_present {
            self.last_status = Some(text.to_string());
        } else {
            debug!("status panel absent, dropping: {text}");
        }
    }

    fn advance(&mut self, dt: Duration) {
        if !self.initialized {
            return;
        }
        let secs = dt.as_secs_f32();
        for piston in &mut self.pistons {
            piston.position =
                (piston.position + piston.velocity * secs).clamp(self.min_stroke, self.max_stroke);
        }
        for merge in [&mut self.merge_top, &mut self.merge_bottom] {
            if merge.present && merge.enabled && !merge.connected {
                merge.armed_for += dt;
                if merge.armed_for >= self.dock_delay {
                    merge.connected = true;
                }
            }
        }
    }
}
