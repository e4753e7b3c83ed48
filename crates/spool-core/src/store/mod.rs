//! Queue store: the port trait and its filesystem implementation.

mod fs;
mod index;
mod layout;
mod locks;

pub use fs::FsStore;

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;

use crate::domain::{Area, Item, StoreError, TmpLogs};

/// Queue store port.
///
/// One implementation today (`FsStore`), but this trait is the seam the
/// router consumes, and the place a different backend would plug in.
///
/// Position semantics, shared by all operations:
/// - a queue's order is its numeric min..max; the set is never renumbered
/// - front-insertion goes below the current min (negative is fine)
/// - back-insertion goes above the current max
/// - an absent queue directory reads as an empty queue, everywhere except a
///   single-item read
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Names of the waiting queues (immediate subdirectories of `waiting/`).
    async fn list_queues(&self) -> Result<BTreeSet<String>, StoreError>;

    /// Entry count per waiting queue.
    async fn queue_lengths(&self) -> Result<BTreeMap<String, usize>, StoreError>;

    /// Numeric (min, max) of a queue's positions; `None` when empty/absent.
    async fn queue_range(&self, queue: &str) -> Result<Option<(i64, i64)>, StoreError>;

    /// Read one item.
    async fn read_item(&self, queue: &str, position: i64) -> Result<Item, StoreError>;

    /// Read a whole queue, ascending by position, each item paired with the
    /// position it came from.
    async fn read_items(&self, queue: &str) -> Result<Vec<(i64, Item)>, StoreError>;

    /// Producer-side insert at an explicit position. `Conflict` if taken.
    async fn write_item(&self, queue: &str, position: i64, item: &Item)
    -> Result<(), StoreError>;

    /// Swap two entries' content in place (the entries keep their paths).
    async fn swap_items(
        &self,
        queue_a: &str,
        pos_a: i64,
        queue_b: &str,
        pos_b: i64,
    ) -> Result<(), StoreError>;

    /// Relocate one entry to a free (queue, position) slot.
    async fn move_item(
        &self,
        src_queue: &str,
        src_pos: i64,
        dst_queue: &str,
        dst_pos: i64,
    ) -> Result<(), StoreError>;

    /// Move an item to the front of `dst_queue` (defaults to its own queue).
    /// Returns the position it landed at.
    async fn send_to_front(
        &self,
        src_queue: &str,
        src_pos: i64,
        dst_queue: Option<&str>,
    ) -> Result<i64, StoreError>;

    /// Move an item to the back of `dst_queue` (defaults to its own queue).
    /// Returns the position it landed at.
    async fn send_to_back(
        &self,
        src_queue: &str,
        src_pos: i64,
        dst_queue: Option<&str>,
    ) -> Result<i64, StoreError>;

    /// Delete one entry from any area. `Ok(true)` only on removal; a missing
    /// entry, a non-regular-file target, or a rejected name all yield
    /// `Ok(false)` without touching the filesystem.
    async fn delete_item(&self, area: &Area, position: i64) -> Result<bool, StoreError>;

    /// Device name -> busy (the slot file `inprocess/<device>/0` exists).
    async fn device_slots(&self) -> Result<BTreeMap<String, bool>, StoreError>;

    /// Read the inprocess slot of a device. `NotFound` when idle or unknown.
    async fn read_slot(&self, device: &str) -> Result<Item, StoreError>;

    /// Read a job's tmp logs; absent files read as empty strings.
    async fn read_tmp_logs(&self, job_id: &str) -> Result<TmpLogs, StoreError>;
}
