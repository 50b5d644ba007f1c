//! Lifecycle error types.

use std::path::PathBuf;

/// Result type for lifecycle operations
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Lifecycle errors
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// Filesystem access failed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The state lock could not be taken
    #[error("Failed to lock {path}: {source}")]
    Lock {
        /// Lock file
        path: PathBuf,
        /// Errno reported by flock
        #[source]
        source: nix::errno::Errno,
    },

    /// The service process could not be spawned
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        /// Program that was launched
        program: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The service process could not be signalled
    #[error("Failed to signal process {pid}: {source}")]
    Signal {
        /// Target pid
        pid: u32,
        /// Errno reported by kill
        #[source]
        source: nix::errno::Errno,
    },

    /// The persisted record could not be decoded
    #[error("Corrupt service state in {path}: {message}")]
    CorruptState {
        /// State file
        path: PathBuf,
        /// Decoder message
        message: String,
    },

    /// The operation needs a running service
    #[error("The relay service is not running")]
    NotRunning,
}

impl LifecycleError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
