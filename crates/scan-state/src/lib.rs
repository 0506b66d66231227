//! Durable scan-session state.
//!
//! The session record is the only coordination channel between the host tab
//! (which builds the queue) and the portal tab (which executes it). Execution
//! context dies on every navigation, so nothing here assumes a live
//! continuation: handlers re-read the latest record, mutate it, and write it
//! back.

pub mod errors;
pub mod model;
pub mod store;

pub use errors::StateError;
pub use model::{ScanSession, WorkItem};
pub use store::{JsonSessionStore, MemorySessionStore, SessionStore};
