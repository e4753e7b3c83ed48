//! Base-path resolution and the traversal guard.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{Area, StoreError};

pub(crate) const OUTPUT_LOG: &str = "output.log";
pub(crate) const ERROR_LOG: &str = "error.log";
pub(crate) const EXCEPTION_LOG: &str = "exception.log";

/// Owns the absolute base directory and resolves every path under it.
///
/// Queue, device and job names arrive from outside the process, so each one
/// is validated as a single normal path component before it is joined. The
/// joined path is additionally checked to still be a descendant of the base.
#[derive(Debug, Clone)]
pub(crate) struct Layout {
    base: PathBuf,
}

impl Layout {
    /// Absolutize `base` and create the five top-level areas if absent.
    pub fn open(base: impl AsRef<Path>) -> Result<Self, StoreError> {
        let base = std::path::absolute(base.as_ref())
            .map_err(|e| StoreError::io(base.as_ref(), e))?;
        for top in ["waiting", "inprocess", "failed", "completed", "tmp"] {
            let dir = base.join(top);
            fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn waiting(&self) -> PathBuf {
        self.base.join("waiting")
    }

    pub fn inprocess(&self) -> PathBuf {
        self.base.join("inprocess")
    }

    /// `waiting/<queue>`, name-checked.
    pub fn queue_dir(&self, queue: &str) -> Result<PathBuf, StoreError> {
        self.join_checked(&self.waiting(), queue)
    }

    /// `inprocess/<device>`, name-checked.
    pub fn device_dir(&self, device: &str) -> Result<PathBuf, StoreError> {
        self.join_checked(&self.inprocess(), device)
    }

    /// `tmp/<job-id>`, name-checked.
    pub fn tmp_dir(&self, job_id: &str) -> Result<PathBuf, StoreError> {
        self.join_checked(&self.base.join("tmp"), job_id)
    }

    /// Directory an `Area` entry lives in.
    pub fn area_dir(&self, area: &Area) -> Result<PathBuf, StoreError> {
        let (top, name) = area.parts();
        let dir = self.base.join(top);
        match name {
            Some(name) => self.join_checked(&dir, name),
            None => Ok(dir),
        }
    }

    fn join_checked(&self, dir: &Path, name: &str) -> Result<PathBuf, StoreError> {
        if !is_safe_component(name) {
            return Err(StoreError::PathTraversal(name.to_string()));
        }
        let joined = dir.join(name);
        // The contract is the descendant property, not the component shape.
        if !joined.starts_with(&self.base) {
            return Err(StoreError::PathTraversal(name.to_string()));
        }
        Ok(joined)
    }
}

/// A name is usable iff it stays a single normal path component.
pub(crate) fn is_safe_component(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn open_creates_the_five_areas() {
        let tmp = TempDir::new().unwrap();
        let layout = Layout::open(tmp.path().join("store")).unwrap();
        for top in ["waiting", "inprocess", "failed", "completed", "tmp"] {
            assert!(layout.base().join(top).is_dir(), "missing {top}");
        }
    }

    #[test]
    fn open_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        Layout::open(tmp.path()).unwrap();
        Layout::open(tmp.path()).unwrap();
    }

    #[rstest]
    #[case::parent("..")]
    #[case::current(".")]
    #[case::empty("")]
    #[case::slash("a/b")]
    #[case::backslash("a\\b")]
    #[case::sneaky("../../etc")]
    #[case::nul("a\0b")]
    fn unsafe_names_are_rejected(#[case] name: &str) {
        let tmp = TempDir::new().unwrap();
        let layout = Layout::open(tmp.path()).unwrap();
        assert!(matches!(
            layout.queue_dir(name),
            Err(StoreError::PathTraversal(_))
        ));
        assert!(matches!(
            layout.device_dir(name),
            Err(StoreError::PathTraversal(_))
        ));
        assert!(matches!(
            layout.tmp_dir(name),
            Err(StoreError::PathTraversal(_))
        ));
    }

    #[rstest]
    #[case("main")]
    #[case("example_pipeline")]
    #[case("gpu-0")]
    #[case("..hidden")] // contains dots but is still one component
    fn ordinary_names_resolve_under_base(#[case] name: &str) {
        let tmp = TempDir::new().unwrap();
        let layout = Layout::open(tmp.path()).unwrap();
        let dir = layout.queue_dir(name).unwrap();
        assert!(dir.starts_with(layout.base()));
        assert_eq!(dir.file_name().unwrap().to_str().unwrap(), name);
    }
}
