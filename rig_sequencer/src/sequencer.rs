//! Drilling-cycle state machine.
//!
//! Five phases drive the mining loop: extend the drill assembly, hold until
//! fully extended, bond the far end, retract, bond the near end again.
//! The decision logic is the pure transition function [`plan`] over a fresh
//! [`Readings`] snapshot; [`Sequencer`] is the thin shell that samples,
//! plans, and applies the resulting commands through the hardware boundary.
//!
//! Docking is asynchronous relative to the command that initiates it, so
//! the merge phases poll: while a guard is false the phase holds and no
//! commands are issued. The enable/disable ordering on merge transitions
//! keeps at most one junction bonded once the controller has observed the
//! new bond.

use tracing::{debug, info};

use rig_common::config::{POSITION_TOLERANCE, Setpoints};
use rig_common::driver::{RigDriver, RigEnd, ToolGroup};
use rig_common::error::RigError;
use rig_common::state::{DrillPhase, RunMode};

// ─── Readings ───────────────────────────────────────────────────────

/// Sensor snapshot taken at the start of a step, never cached across steps.
#[derive(Debug, Clone, Default)]
pub struct Readings {
    /// Stroke position of each piston, in group order.
    pub piston_positions: Vec<f32>,
    /// Top merge block bonded AND armed.
    pub top_merge_docked: bool,
    /// Bottom merge block bonded AND armed.
    pub bottom_merge_docked: bool,
}

impl Readings {
    /// Sample fresh readings through the hardware boundary.
    pub fn sample(rig: &dyn RigDriver) -> Result<Self, RigError> {
        Ok(Self {
            piston_positions: rig.piston_positions(),
            top_merge_docked: rig.merge_docked(RigEnd::Top)?,
            bottom_merge_docked: rig.merge_docked(RigEnd::Bottom)?,
        })
    }
}

// ─── Commands ───────────────────────────────────────────────────────

/// One actuator command issued by the planner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Enable or disable a tool group.
    SetTools(ToolGroup, bool),
    /// Set the drill head's target angular rate.
    SetRotor(f32),
    /// Lock the connector at one end.
    Connect(RigEnd),
    /// Release the connector at one end.
    Disconnect(RigEnd),
    /// Arm or disarm the merge block at one end.
    SetMerge(RigEnd, bool),
    /// Drive every piston toward `target`, each with the sign chosen from
    /// its own position and `speed`'s magnitude.
    MovePistons { target: f32, speed: f32 },
}

/// Signed drive velocity for one piston: positive when below the target,
/// negative otherwise. Self-corrects pistons out of sync with the group's
/// nominal direction, e.g. after a resume.
#[inline]
pub fn velocity_toward(position: f32, target: f32, speed: f32) -> f32 {
    if position < target {
        speed.abs()
    } else {
        -speed.abs()
    }
}

/// True iff every piston is strictly within [`POSITION_TOLERANCE`] of
/// `target`. An empty group is vacuously in position.
#[inline]
pub fn pistons_at_position(positions: &[f32], target: f32) -> bool {
    positions.iter().all(|p| (p - target).abs() < POSITION_TOLERANCE)
}

// ─── Transition Function ────────────────────────────────────────────

/// Pure transition function: current phase plus fresh readings yield the
/// next phase and the commands to issue, in order.
///
/// A phase whose guard is false returns itself and an empty command list;
/// waiting is the phase holding across ticks, never looping internally.
pub fn plan(
    phase: DrillPhase,
    readings: &Readings,
    setpoints: &Setpoints,
) -> (DrillPhase, Vec<Command>) {
    match phase {
        DrillPhase::Extending => (
            DrillPhase::WaitExtended,
            vec![
                Command::SetTools(ToolGroup::Drills, true),
                Command::SetTools(ToolGroup::Welders, true),
                Command::SetRotor(setpoints.rotor_velocity),
                Command::Connect(RigEnd::Top),
                Command::MovePistons {
                    target: setpoints.extended_position,
                    speed: setpoints.extend_velocity,
                },
            ],
        ),
        DrillPhase::WaitExtended => {
            if pistons_at_position(&readings.piston_positions, setpoints.extended_position) {
                (
                    DrillPhase::MergingBottom,
                    vec![
                        Command::SetTools(ToolGroup::Drills, false),
                        Command::SetTools(ToolGroup::Welders, false),
                        Command::SetRotor(0.0),
                        Command::SetMerge(RigEnd::Bottom, true),
                    ],
                )
            } else {
                (DrillPhase::WaitExtended, Vec::new())
            }
        }
        DrillPhase::MergingBottom => {
            if readings.bottom_merge_docked {
                (
                    DrillPhase::Retracting,
                    vec![
                        Command::SetMerge(RigEnd::Top, false),
                        Command::Disconnect(RigEnd::Top),
                        Command::Connect(RigEnd::Bottom),
                        Command::SetTools(ToolGroup::Grinders, true),
                        Command::MovePistons {
                            target: setpoints.retracted_position,
                            speed: setpoints.retract_velocity,
                        },
                    ],
                )
            } else {
                (DrillPhase::MergingBottom, Vec::new())
            }
        }
        DrillPhase::Retracting => {
            if pistons_at_position(&readings.piston_positions, setpoints.retracted_position) {
                (
                    DrillPhase::MergingTop,
                    vec![
                        Command::SetMerge(RigEnd::Top, true),
                        Command::SetTools(ToolGroup::Grinders, false),
                    ],
                )
            } else {
                (DrillPhase::Retracting, Vec::new())
            }
        }
        DrillPhase::MergingTop => {
            if readings.top_merge_docked {
                (
                    DrillPhase::Extending,
                    vec![
                        Command::SetMerge(RigEnd::Bottom, false),
                        Command::Disconnect(RigEnd::Bottom),
                    ],
                )
            } else {
                (DrillPhase::MergingTop, Vec::new())
            }
        }
    }
}

/// Apply one planned command through the hardware boundary.
fn apply(rig: &mut dyn RigDriver, command: &Command) -> Result<(), RigError> {
    match *command {
        Command::SetTools(group, on) => {
            rig.set_tools_enabled(group, on);
            Ok(())
        }
        Command::SetRotor(velocity) => rig.set_rotor_velocity(velocity),
        Command::Connect(end) => rig.connect(end),
        Command::Disconnect(end) => rig.disconnect(end),
        Command::SetMerge(end, on) => rig.set_merge_enabled(end, on),
        Command::MovePistons { target, speed } => {
            let positions = rig.piston_positions();
            for (index, position) in positions.iter().enumerate() {
                rig.set_piston_velocity(index, velocity_toward(*position, target, speed));
            }
            Ok(())
        }
    }
}

// ─── Sequencer ──────────────────────────────────────────────────────

/// How an invocation was initiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Explicit external trigger (operator command).
    Command,
    /// Scheduled periodic tick.
    Tick,
}

/// The sequencing controller. Holds only its phase, its run mode, and a
/// copy of the motion setpoints; all hardware state lives behind the
/// injected [`RigDriver`].
#[derive(Debug, Clone)]
pub struct Sequencer {
    phase: DrillPhase,
    run_mode: RunMode,
    setpoints: Setpoints,
}

impl Sequencer {
    /// Create a sequencer at the first phase, cadence suspended.
    pub fn new(setpoints: Setpoints) -> Self {
        Self::resume(setpoints, DrillPhase::default())
    }

    /// Create a sequencer resuming at a persisted phase, cadence suspended.
    pub const fn resume(setpoints: Setpoints, phase: DrillPhase) -> Self {
        Self {
            phase,
            run_mode: RunMode::Stopped,
            setpoints,
        }
    }

    /// Current phase.
    #[inline]
    pub const fn phase(&self) -> DrillPhase {
        self.phase
    }

    /// Current run mode. Read by the host scheduler to gate tick delivery.
    #[inline]
    pub const fn run_mode(&self) -> RunMode {
        self.run_mode
    }

    /// Single entry point: process an optional command token, then perform
    /// exactly one decision-and-command step.
    ///
    /// Tokens are honored only on an explicit external trigger, matched
    /// case-sensitively; unrecognized tokens are ignored. Every invocation
    /// steps, command-triggered ones included.
    pub fn invoke(
        &mut self,
        rig: &mut dyn RigDriver,
        token: Option<&str>,
        trigger: Trigger,
    ) -> Result<DrillPhase, RigError> {
        if trigger == Trigger::Command {
            self.apply_token(token);
        }
        self.step(rig)
    }

    /// Perform one state's work: write the status line, sample readings,
    /// plan, and issue the planned commands in order.
    pub fn step(&mut self, rig: &mut dyn RigDriver) -> Result<DrillPhase, RigError> {
        rig.write_status(&format!(
            "Drill state: {} ({})",
            self.phase.index(),
            self.phase.label()
        ));

        let readings = Readings::sample(rig)?;
        let (next, commands) = plan(self.phase, &readings, &self.setpoints);
        if next == self.phase {
            debug!(phase = ?self.phase, "holding, guard not yet satisfied");
        }
        for command in &commands {
            apply(rig, command)?;
        }
        self.phase = next;
        Ok(next)
    }

    fn apply_token(&mut self, token: Option<&str>) {
        match token {
            Some("start") | Some("resume") => {
                info!("enabling tick cadence");
                self.run_mode = RunMode::Running;
            }
            Some("stop") => {
                info!("suspending tick cadence");
                self.run_mode = RunMode::Stopped;
            }
            Some(other) => {
                debug!("ignoring unrecognized command '{other}'");
            }
            None => {}
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
