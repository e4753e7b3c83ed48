//! Per-job tmp log bundle.

use serde::Serialize;

/// The three optional log files under `tmp/<job-id>/`.
///
/// Missing files read as empty strings; the content is opaque worker output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TmpLogs {
    pub output: String,
    pub error: String,
    pub exception: String,
}

impl TmpLogs {
    pub fn is_empty(&self) -> bool {
        self.output.is_empty() && self.error.is_empty() && self.exception.is_empty()
    }
}
