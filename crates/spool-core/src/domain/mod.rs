//! Domain model (items, areas, logs, errors).

pub mod area;
pub mod errors;
pub mod item;
pub mod logs;

pub use area::Area;
pub use errors::StoreError;
pub use item::Item;
pub use logs::TmpLogs;
