//! Work-queue construction from host schedule-page markup.
//!
//! The host page lists schedule entries; the lookup key for each entry lives
//! in a separate per-row cache populated by an earlier host-side pass. The
//! builder joins the two, filters out rows that are already billed or lack a
//! key, and emits a deduplicated queue in document order.

pub mod builder;
pub mod cache;
pub mod errors;

pub use builder::build_queue;
pub use cache::{JsonRowDataCache, MemoryRowDataCache, RowData, RowDataCache};
pub use errors::QueueBuildError;
