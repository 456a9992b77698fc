#![deny(warnings)]

//! Persistence layer: JSON snapshots of the game state and a single-writer
//! save slot guarded by an optimistic version counter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sim_core::{validate_state, GameState, SimConfig, ValidationError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Layout revision of [`Snapshot`]. Bumped on incompatible changes.
pub const SNAPSHOT_FORMAT: u32 = 1;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("io error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("snapshot (de)serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("unsupported snapshot format {found}")]
    UnsupportedFormat { found: u32 },
    #[error("save slot version conflict: expected {expected:?}, found {found:?}")]
    VersionConflict {
        expected: Option<u64>,
        found: Option<u64>,
    },
    #[error("snapshot holds an invalid state: {0}")]
    Invalid(#[from] ValidationError),
}

/// A saved game: the state plus the bookkeeping needed to resume it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub format: u32,
    /// Monotonic save counter of the slot this snapshot was written to.
    pub version: u64,
    /// Wall-clock time of the save; the reference point for catch-up.
    pub saved_at: DateTime<Utc>,
    /// Run parameters the career was simulated with, seed included.
    #[serde(default)]
    pub config: SimConfig,
    pub state: GameState,
}

impl Snapshot {
    pub fn new(
        state: GameState,
        config: SimConfig,
        version: u64,
        saved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            format: SNAPSHOT_FORMAT,
            version,
            saved_at,
            config,
            state,
        }
    }
}

pub fn encode_snapshot(snapshot: &Snapshot) -> Result<Vec<u8>, PersistError> {
    Ok(serde_json::to_vec_pretty(snapshot)?)
}

/// Decode and validate a snapshot.
pub fn decode_snapshot(data: &[u8]) -> Result<Snapshot, PersistError> {
    let snapshot: Snapshot = serde_json::from_slice(data)?;
    if snapshot.format != SNAPSHOT_FORMAT {
        return Err(PersistError::UnsupportedFormat {
            found: snapshot.format,
        });
    }
    validate_state(&snapshot.state)?;
    Ok(snapshot)
}

/// One save file on disk.
///
/// Writers pass the version they last loaded; a save fails with
/// [`PersistError::VersionConflict`] if the file moved on in between.
#[derive(Clone, Debug)]
pub struct SaveSlot {
    path: PathBuf,
}

impl SaveSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: io::Error) -> PersistError {
        PersistError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Load the current snapshot, `None` for an empty slot.
    pub fn load(&self) -> Result<Option<Snapshot>, PersistError> {
        match fs::read(&self.path) {
            Ok(bytes) => {
                let snapshot = decode_snapshot(&bytes)?;
                debug!(path = ?self.path, version = snapshot.version, "save loaded");
                Ok(Some(snapshot))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_err(e)),
        }
    }

    pub fn current_version(&self) -> Result<Option<u64>, PersistError> {
        Ok(self.load()?.map(|s| s.version))
    }

    /// Write `state` and the `config` it runs under if the slot is still at
    /// `expected` (`None` for a fresh slot). Returns the new version. The
    /// file is replaced atomically.
    pub fn save(
        &self,
        state: &GameState,
        config: &SimConfig,
        expected: Option<u64>,
        saved_at: DateTime<Utc>,
    ) -> Result<u64, PersistError> {
        validate_state(state)?;
        let found = self.current_version()?;
        if found != expected {
            warn!(path = ?self.path, ?expected, ?found, "save rejected");
            return Err(PersistError::VersionConflict { expected, found });
        }
        let version = found.map_or(1, |v| v + 1);
        let bytes = encode_snapshot(&Snapshot::new(
            state.clone(),
            config.clone(),
            version,
            saved_at,
        ))?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| self.io_err(e))?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, bytes).map_err(|e| self.io_err(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))?;
        info!(path = ?self.path, version, week = state.clock.absolute_week(), "game saved");
        Ok(version)
    }
}
