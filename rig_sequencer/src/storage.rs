//! Resume-slot persistence.
//!
//! The sequencer's phase survives restarts through a single opaque string
//! slot holding the phase index. The slot is read once at startup and
//! overwritten after every step; anything unparseable falls back to the
//! first phase with a logged notice, so a corrupt slot restarts the bore
//! instead of crashing the controller.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use rig_common::error::RigError;
use rig_common::state::DrillPhase;

/// Durable slot for the resume token.
pub trait PhaseStore: Send {
    /// Raw resume token, if one exists.
    fn load(&self) -> Option<String>;

    /// Overwrite the slot.
    fn save(&mut self, token: &str) -> Result<(), RigError>;
}

/// Decode a resume token into a phase.
pub fn decode_phase(token: Option<&str>) -> DrillPhase {
    match token
        .and_then(|t| t.trim().parse::<u8>().ok())
        .and_then(DrillPhase::from_u8)
    {
        Some(phase) => {
            info!("resuming at phase {}", phase.index());
            phase
        }
        None => {
            info!("no usable resume token, starting at phase 0");
            DrillPhase::default()
        }
    }
}

/// Encode a phase as a resume token.
pub fn encode_phase(phase: DrillPhase) -> String {
    phase.index().to_string()
}

// ─── File-backed store ──────────────────────────────────────────────

/// Resume slot persisted as a small text file.
pub struct FilePhaseStore {
    path: PathBuf,
}

impl FilePhaseStore {
    /// Create a store backed by the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl PhaseStore for FilePhaseStore {
    fn load(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(token) => Some(token),
            Err(e) => {
                debug!("no resume slot at {:?}: {e}", self.path);
                None
            }
        }
    }

    fn save(&mut self, token: &str) -> Result<(), RigError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                RigError::Persistence(format!("failed to create directory: {e}"))
            })?;
        }
        fs::write(&self.path, token)
            .map_err(|e| RigError::Persistence(format!("failed to write resume slot: {e}")))
    }
}

// ─── In-memory store ────────────────────────────────────────────────

/// Volatile slot for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryPhaseStore {
    slot: Option<String>,
}

impl MemoryPhaseStore {
    /// Empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot pre-loaded with a token, as if left by a previous run.
    pub fn with_token(token: &str) -> Self {
        Self {
            slot: Some(token.to_string()),
        }
    }

    /// Current slot contents.
    pub fn token(&self) -> Option<&str> {
        self.slot.as_deref()
    }
}

impl PhaseStore for MemoryPhaseStore {
    fn load(&self) -> Option<String> {
        self.slot.clone()
    }

    fn save(&mut self, token: &str) -> Result<(), RigError> {
        self.slot = Some(token.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn decode_valid_tokens() {
        assert_eq!(decode_phase(Some("3")), DrillPhase::Retracting);
        assert_eq!(decode_phase(Some("0")), DrillPhase::Extending);
        assert_eq!(decode_phase(Some(" 4 ")), DrillPhase::MergingTop);
    }

    #[test]
    fn decode_falls_back_to_first_phase() {
        assert_eq!(decode_phase(None), DrillPhase::Extending);
        assert_eq!(decode_phase(Some("")), DrillPhase::Extending);
        assert_eq!(decode_phase(Some("garbage")), DrillPhase::Extending);
        // Out-of-range index is as unusable as garbage.
        assert_eq!(decode_phase(Some("7")), DrillPhase::Extending);
        assert_eq!(decode_phase(Some("-1")), DrillPhase::Extending);
    }

    #[test]
    fn encode_decode_roundtrip() {
        for raw in 0..=4u8 {
            let phase = DrillPhase::from_u8(raw).unwrap();
            assert_eq!(decode_phase(Some(&encode_phase(phase))), phase);
        }
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state").join("phase.txt");
        let mut store = FilePhaseStore::new(&path);

        assert_eq!(store.load(), None);
        store.save("3").unwrap();
        assert!(path.exists());
        assert_eq!(store.load().as_deref(), Some("3"));

        // A fresh store over the same path sees the persisted token.
        let reopened = FilePhaseStore::new(&path);
        assert_eq!(decode_phase(reopened.load().as_deref()), DrillPhase::Retracting);
    }

    #[test]
    fn memory_store_roundtrip() {
        let mut store = MemoryPhaseStore::new();
        assert_eq!(store.load(), None);
        store.save("2").unwrap();
        assert_eq!(store.token(), Some("2"));
        assert_eq!(decode_phase(store.load().as_deref()), DrillPhase::MergingBottom);
    }
}
