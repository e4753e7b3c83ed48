//! Filesystem implementation of the queue store.
//!
//! Every operation is a short sequence of filesystem calls; the sequences
//! that scan a range and then write (`send_to_front`, `send_to_back`) and
//! the two-entry mutations (`swap_items`, `move_item`) run under the
//! per-queue locks from [`super::locks`]. The filesystem itself is the only
//! state; nothing is cached between calls.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::QueueStore;
use super::index::IndexedDir;
use super::layout::{ERROR_LOG, EXCEPTION_LOG, Layout, OUTPUT_LOG};
use super::locks::QueueLocks;
use crate::domain::{Area, Item, StoreError, TmpLogs};

/// Bound on how long any operation waits for a queue lock. Lock hold time is
/// a handful of filesystem calls, so exceeding this means something is stuck.
const LOCK_WAIT: Duration = Duration::from_secs(2);

/// Queue store over a base directory.
pub struct FsStore {
    layout: Layout,
    locks: QueueLocks,
}

impl FsStore {
    /// Open a store over `base`, creating the top-level areas if absent.
    pub fn open(base: impl AsRef<std::path::Path>) -> Result<Self, StoreError> {
        Ok(Self {
            layout: Layout::open(base)?,
            locks: QueueLocks::new(LOCK_WAIT),
        })
    }

    pub fn base(&self) -> &std::path::Path {
        self.layout.base()
    }

    fn queue_index(&self, queue: &str) -> Result<IndexedDir, StoreError> {
        Ok(IndexedDir::new(self.layout.queue_dir(queue)?))
    }

    /// Relocate `src_pos` to a free `dst_pos`. Rename first (atomic on one
    /// filesystem); fall back to copy+delete when rename is refused for a
    /// reason other than a missing source.
    fn relocate(
        &self,
        src: &IndexedDir,
        src_pos: i64,
        dst: &IndexedDir,
        dst_pos: i64,
    ) -> Result<(), StoreError> {
        let from = src.entry(src_pos);
        let to = dst.entry(dst_pos);
        if !from.is_file() {
            return Err(StoreError::NotFound { path: from });
        }
        if to.exists() {
            return Err(StoreError::Conflict { path: to });
        }
        fs::create_dir_all(dst.dir()).map_err(|e| StoreError::io(dst.dir(), e))?;
        if let Err(rename_err) = fs::rename(&from, &to) {
            if rename_err.kind() == std::io::ErrorKind::NotFound {
                return Err(StoreError::NotFound { path: from });
            }
            fs::copy(&from, &to).map_err(|e| StoreError::io(&to, e))?;
            if let Err(remove_err) = fs::remove_file(&from) {
                warn!(
                    src = %from.display(),
                    dst = %to.display(),
                    "move half-applied: copy succeeded, source removal failed"
                );
                return Err(StoreError::MoveInterrupted {
                    src: from,
                    dst: to,
                    source: remove_err,
                });
            }
        }
        Ok(())
    }

    /// Back position of `dst`: one past the max, `0` when empty.
    fn back_target(range: Option<(i64, i64)>) -> i64 {
        match range {
            None => 0,
            Some((_, max)) => max + 1,
        }
    }
}

#[async_trait]
impl QueueStore for FsStore {
    async fn list_queues(&self) -> Result<BTreeSet<String>, StoreError> {
        let waiting = self.layout.waiting();
        let entries = match fs::read_dir(&waiting) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => return Err(StoreError::io(&waiting, e)),
        };
        let mut names = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&waiting, e))?;
            let is_dir = entry
                .file_type()
                .map_err(|e| StoreError::io(&entry.path(), e))?
                .is_dir();
            if is_dir {
                names.insert(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(names)
    }

    async fn queue_lengths(&self) -> Result<BTreeMap<String, usize>, StoreError> {
        let waiting = self.layout.waiting();
        let mut lengths = BTreeMap::new();
        for name in self.list_queues().await? {
            // join directly: the name came out of read_dir, so it is already
            // a single component (possibly one our guard would not accept)
            let len = IndexedDir::new(waiting.join(&name)).len()?;
            lengths.insert(name, len);
        }
        Ok(lengths)
    }

    async fn queue_range(&self, queue: &str) -> Result<Option<(i64, i64)>, StoreError> {
        self.queue_index(queue)?.range()
    }

    async fn read_item(&self, queue: &str, position: i64) -> Result<Item, StoreError> {
        let text = self.queue_index(queue)?.read(position)?;
        Ok(Item::parse(&text))
    }

    async fn read_items(&self, queue: &str) -> Result<Vec<(i64, Item)>, StoreError> {
        let index = self.queue_index(queue)?;
        let mut items = Vec::new();
        for position in index.positions_sorted()? {
            items.push((position, Item::parse(&index.read(position)?)));
        }
        Ok(items)
    }

    async fn write_item(
        &self,
        queue: &str,
        position: i64,
        item: &Item,
    ) -> Result<(), StoreError> {
        let index = self.queue_index(queue)?;
        let _guard = self.locks.lock(queue).await?;
        if index.contains(position) {
            return Err(StoreError::Conflict {
                path: index.entry(position),
            });
        }
        index.write(position, &item.to_text())?;
        debug!(queue, position, "wrote item");
        Ok(())
    }

    async fn swap_items(
        &self,
        queue_a: &str,
        pos_a: i64,
        queue_b: &str,
        pos_b: i64,
    ) -> Result<(), StoreError> {
        let index_a = self.queue_index(queue_a)?;
        let index_b = self.queue_index(queue_b)?;
        let _guards = self.locks.lock_pair(queue_a, queue_b).await?;

        // Swap by content, not by rename: the entries keep their paths.
        let text_a = index_a.read(pos_a)?;
        let text_b = index_b.read(pos_b)?;

        let path_a = index_a.entry(pos_a);
        let path_b = index_b.entry(pos_b);
        fs::write(&path_b, &text_a).map_err(|e| StoreError::io(&path_b, e))?;
        if let Err(e) = fs::write(&path_a, &text_b) {
            warn!(
                applied = %path_b.display(),
                pending = %path_a.display(),
                "swap half-applied"
            );
            return Err(StoreError::SwapInterrupted {
                applied: path_b,
                pending: path_a,
                source: e,
            });
        }
        debug!(queue_a, pos_a, queue_b, pos_b, "swapped items");
        Ok(())
    }

    async fn move_item(
        &self,
        src_queue: &str,
        src_pos: i64,
        dst_queue: &str,
        dst_pos: i64,
    ) -> Result<(), StoreError> {
        if src_queue == dst_queue && src_pos == dst_pos {
            return Err(StoreError::AlreadyAtPosition {
                queue: src_queue.to_string(),
                position: src_pos,
            });
        }
        let src = self.queue_index(src_queue)?;
        let dst = self.queue_index(dst_queue)?;
        let _guards = self.locks.lock_pair(src_queue, dst_queue).await?;
        self.relocate(&src, src_pos, &dst, dst_pos)?;
        debug!(src_queue, src_pos, dst_queue, dst_pos, "moved item");
        Ok(())
    }

    async fn send_to_front(
        &self,
        src_queue: &str,
        src_pos: i64,
        dst_queue: Option<&str>,
    ) -> Result<i64, StoreError> {
        let dst_queue = dst_queue.unwrap_or(src_queue);
        let src = self.queue_index(src_queue)?;
        let dst = self.queue_index(dst_queue)?;
        let same_queue = src_queue == dst_queue;

        let _guards = self.locks.lock_pair(src_queue, dst_queue).await?;
        if !src.contains(src_pos) {
            return Err(StoreError::NotFound {
                path: src.entry(src_pos),
            });
        }

        let target = match dst.range()? {
            // Front of an empty queue is position 0.
            None => 0,
            Some((min, _)) if same_queue && src_pos == min => {
                return Err(StoreError::AlreadyAtPosition {
                    queue: src_queue.to_string(),
                    position: src_pos,
                });
            }
            // A lone item at slot 0 blocks insertion strictly before it,
            // so the move degrades to a back-insertion instead of failing.
            Some((0, 0)) => Self::back_target(Some((0, 0))),
            Some((min, _)) => min - 1,
        };
        self.relocate(&src, src_pos, &dst, target)?;
        debug!(src_queue, src_pos, dst_queue, target, "sent to front");
        Ok(target)
    }

    async fn send_to_back(
        &self,
        src_queue: &str,
        src_pos: i64,
        dst_queue: Option<&str>,
    ) -> Result<i64, StoreError> {
        let dst_queue = dst_queue.unwrap_or(src_queue);
        let src = self.queue_index(src_queue)?;
        let dst = self.queue_index(dst_queue)?;
        let same_queue = src_queue == dst_queue;

        let _guards = self.locks.lock_pair(src_queue, dst_queue).await?;
        if !src.contains(src_pos) {
            return Err(StoreError::NotFound {
                path: src.entry(src_pos),
            });
        }

        let range = dst.range()?;
        if let Some((_, max)) = range
            && same_queue
            && src_pos == max
        {
            return Err(StoreError::AlreadyAtPosition {
                queue: src_queue.to_string(),
                position: src_pos,
            });
        }
        let target = Self::back_target(range);
        self.relocate(&src, src_pos, &dst, target)?;
        debug!(src_queue, src_pos, dst_queue, target, "sent to back");
        Ok(target)
    }

    async fn delete_item(&self, area: &Area, position: i64) -> Result<bool, StoreError> {
        let dir = match self.layout.area_dir(area) {
            Ok(dir) => dir,
            Err(StoreError::PathTraversal(name)) => {
                warn!(%area, %name, "delete rejected: name escapes the store base");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };
        // Waiting deletes race range scans; take the queue lock for those.
        let _guard = match area {
            Area::Waiting { queue } => Some(self.locks.lock(queue).await?),
            _ => None,
        };

        let path = dir.join(position.to_string());
        if !path.starts_with(self.layout.base()) {
            warn!(%area, position, "delete rejected: resolved path escapes the store base");
            return Ok(false);
        }
        let meta = match fs::symlink_metadata(&path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(StoreError::io(&path, e)),
        };
        if !meta.is_file() {
            return Ok(false);
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(%area, position, "deleted item");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }

    async fn device_slots(&self) -> Result<BTreeMap<String, bool>, StoreError> {
        let inprocess = self.layout.inprocess();
        let entries = match fs::read_dir(&inprocess) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(StoreError::io(&inprocess, e)),
        };
        let mut slots = BTreeMap::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&inprocess, e))?;
            let is_dir = entry
                .file_type()
                .map_err(|e| StoreError::io(&entry.path(), e))?
                .is_dir();
            if is_dir {
                let busy = entry.path().join("0").is_file();
                slots.insert(entry.file_name().to_string_lossy().into_owned(), busy);
            }
        }
        Ok(slots)
    }

    async fn read_slot(&self, device: &str) -> Result<Item, StoreError> {
        let path = self.layout.device_dir(device)?.join("0");
        let text = fs::read_to_string(&path).map_err(|e| StoreError::from_io(&path, e))?;
        Ok(Item::parse(&text))
    }

    async fn read_tmp_logs(&self, job_id: &str) -> Result<TmpLogs, StoreError> {
        let dir = self.layout.tmp_dir(job_id)?;
        Ok(TmpLogs {
            output: read_log(&dir.join(OUTPUT_LOG))?,
            error: read_log(&dir.join(ERROR_LOG))?,
            exception: read_log(&dir.join(EXCEPTION_LOG))?,
        })
    }
}

/// Read an optional log file; absence is an empty log, not an error.
fn read_log(path: &std::path::Path) -> Result<String, StoreError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(StoreError::io(path, e)),
    }
}
