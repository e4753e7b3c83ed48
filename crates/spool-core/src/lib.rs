//! spool-core
//!
//! A job queue whose entire state lives in filesystem layout: items are
//! documents stored as files whose *names* are their queue positions.
//!
//! # Module map
//! - **domain**: value types and errors (`Item`, `Area`, `TmpLogs`, `StoreError`)
//! - **store**: the `QueueStore` port and its filesystem implementation
//!   (`FsStore`), plus the integer-filename directory abstraction and the
//!   per-queue lock registry behind it
//!
//! # Layout on disk
//! ```text
//! base/
//!   waiting/<queue>/<position>    ordered, per-queue integer positions
//!   inprocess/<device>/0          one slot per device; busy iff the file exists
//!   failed/<position>             flat
//!   completed/<position>          flat
//!   tmp/<job-id>/{output,error,exception}.log
//! ```
//!
//! Position sets are dense enough to order by min/max but are never
//! renumbered: front-insertion decrements below the current minimum (which
//! may go negative), back-insertion increments above the current maximum.

pub mod domain;
pub mod store;

pub use domain::{Area, Item, StoreError, TmpLogs};
pub use store::{FsStore, QueueStore};
