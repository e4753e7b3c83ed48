//! The four top-level areas of the store.

use std::fmt;

/// Where an entry lives under the base directory.
///
/// `Waiting` and `Inprocess` are subdivided (by queue name and device name);
/// `Failed` and `Completed` are flat. The inprocess slot for a device is
/// always position `0`: a device is busy iff that file exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Area {
    Waiting { queue: String },
    Inprocess { device: String },
    Failed,
    Completed,
}

impl Area {
    pub fn waiting(queue: impl Into<String>) -> Self {
        Area::Waiting {
            queue: queue.into(),
        }
    }

    pub fn inprocess(device: impl Into<String>) -> Self {
        Area::Inprocess {
            device: device.into(),
        }
    }

    /// Top-level directory name plus the subdivision name, if any.
    pub(crate) fn parts(&self) -> (&'static str, Option<&str>) {
        match self {
            Area::Waiting { queue } => ("waiting", Some(queue)),
            Area::Inprocess { device } => ("inprocess", Some(device)),
            Area::Failed => ("failed", None),
            Area::Completed => ("completed", None),
        }
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parts() {
            (top, Some(name)) => write!(f, "{top}/{name}"),
            (top, None) => f.write_str(top),
        }
    }
}
