//! # Rig Sequencer Library
//!
//! Closed-loop sequencing controller for an automated mining rig built from
//! linear pistons, a rotating drill head, drills/welders/grinders, and two
//! docking mechanisms at opposite ends. The rig repeatedly extends the
//! drill assembly into terrain, reinforces the bore, bonds the far end to
//! the excavated structure, retracts, and re-bonds the near end, producing
//! continuous forward mining without manual intervention.
//!
//! ## Architecture
//!
//! - [`sequencer`] - the five-phase state machine: a pure transition
//!   function over fresh actuator readings, plus the thin shell that
//!   applies its commands through the hardware boundary
//! - [`storage`] - the durable resume slot that lets a restart continue
//!   mid-sequence instead of restarting the bore
//! - [`cycle`] - the host scheduler delivering fixed-cadence ticks and
//!   explicit start/stop/resume commands
//!
//! The controller is single-threaded and tick-driven: each invocation is a
//! fast, non-blocking poll-and-command step, and all waiting is expressed
//! as a phase holding across ticks.

pub mod cycle;
pub mod sequencer;
pub mod storage;
