//! Portalscan orchestration core.
//!
//! Automates a manual multi-page lookup workflow (login → search → confirm →
//! configure → results) against a records portal that exposes no API. The
//! automation's execution context dies on every navigation, so progress is a
//! state machine whose only continuity is durable storage: the controller
//! here is re-entered on each page load, re-reads the persisted session, and
//! drives exactly one stage forward.

pub mod auth;
pub mod cli;
pub mod config;
pub mod controller;
pub mod errors;
pub mod notify;
pub mod supervisor;

pub use config::ScanConfig;
pub use controller::{Controller, IgnoreReason, LoadOutcome};
pub use errors::ScanError;
pub use notify::{OperatorNotifier, TracingNotifier};
