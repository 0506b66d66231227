//! Captured-records store.
//!
//! Results outlive any one scan session: the map accumulates across runs and
//! an entry is replaced wholesale whenever its identifier is scanned again.
//! Retention is the embedder's problem.

pub mod errors;
pub mod model;
pub mod store;

pub use errors::ResultStoreError;
pub use model::{CapturedResult, RecordRow};
pub use store::{JsonResultStore, MemoryResultStore, ResultStore};
