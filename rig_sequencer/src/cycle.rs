//! Host scheduler: fixed-cadence invocation of the sequencer.
//!
//! `TickRunner` owns the sequencer, the rig driver, and the resume slot.
//! It delivers scheduled ticks only while the sequencer's run mode is
//! `Running` and persists the phase after every step and once more on
//! shutdown. Stopping suspends tick delivery; it does not retract pistons
//! or disable devices, and outstanding hardware commands stay as last set.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use rig_common::config::RigConfig;
use rig_common::driver::RigDriver;
use rig_common::error::RigError;
use rig_common::state::{DrillPhase, RunMode};

use crate::sequencer::{Sequencer, Trigger};
use crate::storage::{PhaseStore, decode_phase, encode_phase};

/// Tick loop driving the sequencer at the configured cadence.
pub struct TickRunner {
    sequencer: Sequencer,
    rig: Box<dyn RigDriver>,
    store: Box<dyn PhaseStore>,
    interval: Duration,
    running: Arc<AtomicBool>,
}

impl TickRunner {
    /// Build a runner, resuming the phase from the store's slot.
    pub fn new(config: &RigConfig, rig: Box<dyn RigDriver>, store: Box<dyn PhaseStore>) -> Self {
        let phase = decode_phase(store.load().as_deref());
        Self {
            sequencer: Sequencer::resume(config.setpoints, phase),
            rig,
            store,
            interval: Duration::from_millis(config.tick_interval_ms),
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Flag cleared by the shutdown signal handler to end [`run`](Self::run).
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    /// Current sequencer phase.
    pub const fn phase(&self) -> DrillPhase {
        self.sequencer.phase()
    }

    /// Current sequencer run mode.
    pub const fn run_mode(&self) -> RunMode {
        self.sequencer.run_mode()
    }

    /// Read access to the rig driver, for status inspection.
    pub fn driver(&self) -> &dyn RigDriver {
        self.rig.as_ref()
    }

    /// Deliver an explicit external command: one invocation with the token,
    /// then persist.
    pub fn command(&mut self, token: &str) -> Result<(), RigError> {
        self.sequencer
            .invoke(self.rig.as_mut(), Some(token), Trigger::Command)?;
        self.persist();
        Ok(())
    }

    /// One scheduler iteration: step and persist while running, then let
    /// the rig evolve. The physical world keeps moving while the
    /// controller is stopped.
    pub fn tick(&mut self) -> Result<(), RigError> {
        if self.sequencer.run_mode() == RunMode::Running {
            self.sequencer.invoke(self.rig.as_mut(), None, Trigger::Tick)?;
            self.persist();
        }
        self.rig.advance(self.interval);
        Ok(())
    }

    /// Run the tick loop until the running flag clears, then make the
    /// explicit-shutdown save.
    ///
    /// A step error (a command targeting a missing required device) aborts
    /// the loop; the rig cannot mine without its core devices.
    pub fn run(&mut self) -> Result<(), RigError> {
        info!(interval_ms = self.interval.as_millis() as u64, "entering tick loop");
        while self.running.load(Ordering::SeqCst) {
            self.tick()?;
            thread::sleep(self.interval);
        }
        self.persist();
        info!("tick loop stopped");
        Ok(())
    }

    fn persist(&mut self) {
        let token = encode_phase(self.sequencer.phase());
        if let Err(e) = self.store.save(&token) {
            warn!("failed to persist phase: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryPhaseStore;
    use rig_hal::sim::SimRig;

    fn runner_with_slot(token: Option<&str>) -> TickRunner {
        let config = RigConfig::default();
        let mut rig = SimRig::new();
        rig.init(&config).unwrap();
        let store = match token {
            Some(t) => MemoryPhaseStore::with_token(t),
            None => MemoryPhaseStore::new(),
        };
        TickRunner::new(&config, Box::new(rig), Box::new(store))
    }

    #[test]
    fn fresh_slot_starts_at_first_phase() {
        let runner = runner_with_slot(None);
        assert_eq!(runner.phase(), DrillPhase::Extending);
        assert_eq!(runner.run_mode(), RunMode::Stopped);
    }

    #[test]
    fn persisted_slot_resumes_mid_sequence() {
        let runner = runner_with_slot(Some("3"));
        assert_eq!(runner.phase(), DrillPhase::Retracting);
    }

    #[test]
    fn corrupt_slot_restarts_the_bore() {
        let runner = runner_with_slot(Some("not a phase"));
        assert_eq!(runner.phase(), DrillPhase::Extending);
    }

    #[test]
    fn ticks_are_gated_until_started() {
        let mut runner = runner_with_slot(None);
        for _ in 0..3 {
            runner.tick().unwrap();
        }
        assert_eq!(runner.phase(), DrillPhase::Extending);

        runner.command("start").unwrap();
        assert_eq!(runner.run_mode(), RunMode::Running);
        // The start command itself performed the first step.
        assert_eq!(runner.phase(), DrillPhase::WaitExtended);
    }

    #[test]
    fn stop_preserves_phase_across_idle_ticks() {
        let mut runner = runner_with_slot(None);
        runner.command("start").unwrap();
        assert_eq!(runner.phase(), DrillPhase::WaitExtended);

        runner.command("stop").unwrap();
        assert_eq!(runner.run_mode(), RunMode::Stopped);
        let held = runner.phase();
        for _ in 0..5 {
            runner.tick().unwrap();
        }
        assert_eq!(runner.phase(), held);

        runner.command("resume").unwrap();
        assert_eq!(runner.run_mode(), RunMode::Running);
    }

    #[test]
    fn unrecognized_command_still_steps_once() {
        let mut runner = runner_with_slot(None);
        runner.command("launch").unwrap();
        // Run mode untouched, but the explicit trigger executed one step.
        assert_eq!(runner.run_mode(), RunMode::Stopped);
        assert_eq!(runner.phase(), DrillPhase::WaitExtended);
    }
}
