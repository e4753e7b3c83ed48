use std::path::{Path, PathBuf};

use thiserror::Error;

/// Store error taxonomy.
///
/// Partial failures (`SwapInterrupted`, `MoveInterrupted`) carry which side
/// completed so the caller can reconcile by hand. They must never be
/// downgraded to a plain io error: a half-applied swap silently corrupts
/// queue state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no entry at {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("destination {} is occupied", .path.display())]
    Conflict { path: PathBuf },

    #[error("non-integer entry {name:?} in {}", .dir.display())]
    MalformedEntry { dir: PathBuf, name: String },

    #[error("name {0:?} would resolve outside the store base")]
    PathTraversal(String),

    #[error("{queue}/{position} is already at the requested place")]
    AlreadyAtPosition { queue: String, position: i64 },

    #[error(
        "swap half-applied: {} was rewritten, {} still holds its old content",
        .applied.display(),
        .pending.display()
    )]
    SwapInterrupted {
        applied: PathBuf,
        pending: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "move half-applied: content copied to {} but {} was not removed",
        .dst.display(),
        .src.display()
    )]
    MoveInterrupted {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("timed out waiting for the lock on queue {0:?}")]
    LockTimeout(String),

    #[error("io error at {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Wrap an io error with the path it happened at, mapping the absent-file
    /// case to `NotFound`.
    pub(crate) fn from_io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            StoreError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            StoreError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Wrap an io error without the `NotFound` mapping (for paths where
    /// absence is itself unexpected).
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
