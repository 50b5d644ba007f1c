//! Locked on-disk service record.

use crate::error::{LifecycleError, LifecycleResult};
use nix::fcntl::{Flock, FlockArg};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Persisted service record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceState {
    /// Service process id
    pub pid: u32,
    /// Attached clients
    pub refcount: u32,
    /// A graceful stop is waiting for the count to reach zero
    #[serde(default)]
    pub stop_requested: bool,
}

impl ServiceState {
    /// Record for a freshly spawned service
    #[must_use]
    pub fn new(pid: u32, refcount: u32) -> Self {
        Self {
            pid,
            refcount,
            stop_requested: false,
        }
    }
}

/// State file plus the lock file guarding it
#[derive(Debug, Clone)]
pub struct StateStore {
    state_path: PathBuf,
    lock_path: PathBuf,
}

impl StateStore {
    /// Create a store
    #[must_use]
    pub fn new(state_path: impl Into<PathBuf>, lock_path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: state_path.into(),
            lock_path: lock_path.into(),
        }
    }

    /// State file
    #[must_use]
    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// Take the exclusive lock, blocking until other holders release it
    pub fn lock(&self) -> LifecycleResult<StateLock<'_>> {
        if let Some(parent) = self.lock_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LifecycleError::io(parent, e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.lock_path)
            .map_err(|e| LifecycleError::io(&self.lock_path, e))?;

        let guard = Flock::lock(file, FlockArg::LockExclusive).map_err(|(_, errno)| {
            LifecycleError::Lock {
                path: self.lock_path.clone(),
                source: errno,
            }
        })?;

        Ok(StateLock {
            store: self,
            _guard: guard,
        })
    }
}

/// Exclusive access to the record; released on drop
pub struct StateLock<'a> {
    store: &'a StateStore,
    _guard: Flock<File>,
}

impl StateLock<'_> {
    /// Read the record; `None` when no service is recorded
    pub fn load(&self) -> LifecycleResult<Option<ServiceState>> {
        let path = &self.store.state_path;
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(LifecycleError::io(path, e)),
        };

        if raw.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| LifecycleError::CorruptState {
                path: path.clone(),
                message: e.to_string(),
            })
    }

    /// Replace the record with write-temp-then-rename
    pub fn save(&self, state: &ServiceState) -> LifecycleResult<()> {
        let path = &self.store.state_path;
        let tmp = path.with_extension("json.tmp");

        let body = serde_json::to_vec_pretty(state).map_err(|e| LifecycleError::CorruptState {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let mut file = File::create(&tmp).map_err(|e| LifecycleError::io(&tmp, e))?;
        file.write_all(&body)
            .and_then(|()| file.sync_all())
            .map_err(|e| LifecycleError::io(&tmp, e))?;
        std::fs::rename(&tmp, path).map_err(|e| LifecycleError::io(path, e))
    }

    /// Remove the record
    pub fn clear(&self) -> LifecycleResult<()> {
        let path = &self.store.state_path;
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LifecycleError::io(path, e)),
        }
    }
}
