//! Integer-filename directory: a map from position to file content.
//!
//! This is the storage primitive everything else composes: a directory whose
//! entries are named by (possibly negative) integers. Min/max is an O(n)
//! scan of the directory, which is the whole point — no counter file, no
//! database, the listing *is* the queue.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::StoreError;

#[derive(Debug, Clone)]
pub(crate) struct IndexedDir {
    dir: PathBuf,
}

impl IndexedDir {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the entry at `position` (the file need not exist).
    pub fn entry(&self, position: i64) -> PathBuf {
        self.dir.join(position.to_string())
    }

    pub fn contains(&self, position: i64) -> bool {
        self.entry(position).is_file()
    }

    /// All positions, unsorted. An absent directory is an empty one.
    ///
    /// Fails with `MalformedEntry` on the first filename that does not parse
    /// as an integer: a stray file in a queue directory breaks the layout
    /// invariant and must be surfaced, not skipped.
    pub fn positions(&self) -> Result<Vec<i64>, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.dir, e)),
        };
        let mut positions = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.dir, e))?;
            let name = entry.file_name();
            let parsed = name.to_str().and_then(|s| s.parse::<i64>().ok());
            match parsed {
                Some(position) => positions.push(position),
                None => {
                    return Err(StoreError::MalformedEntry {
                        dir: self.dir.clone(),
                        name: name.to_string_lossy().into_owned(),
                    });
                }
            }
        }
        Ok(positions)
    }

    /// All positions, ascending.
    pub fn positions_sorted(&self) -> Result<Vec<i64>, StoreError> {
        let mut positions = self.positions()?;
        positions.sort_unstable();
        Ok(positions)
    }

    /// Numeric (min, max) of the current positions; `None` when empty.
    pub fn range(&self) -> Result<Option<(i64, i64)>, StoreError> {
        let mut range = None;
        for position in self.positions()? {
            range = match range {
                None => Some((position, position)),
                Some((min, max)) => Some((min.min(position), max.max(position))),
            };
        }
        Ok(range)
    }

    /// Raw entry count. Unlike `positions`, this never fails on a stray
    /// filename: lengths report disk reality.
    pub fn len(&self) -> Result<usize, StoreError> {
        match fs::read_dir(&self.dir) {
            Ok(entries) => Ok(entries.count()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(StoreError::io(&self.dir, e)),
        }
    }

    /// Read one entry's text. `NotFound` when absent.
    pub fn read(&self, position: i64) -> Result<String, StoreError> {
        let path = self.entry(position);
        fs::read_to_string(&path).map_err(|e| StoreError::from_io(&path, e))
    }

    /// Write one entry, creating the directory on first use.
    pub fn write(&self, position: i64, text: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        let path = self.entry(position);
        fs::write(&path, text).map_err(|e| StoreError::io(&path, e))
    }
}
