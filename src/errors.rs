use thiserror::Error;

use portalscan_result_store::ResultStoreError;
use portalscan_scan_state::StateError;
use portalscan_stage_flow::{DriverError, StageFlowError};

/// Errors that escape the controller to its embedder. Item-level failures
/// (stage errors, per-item timeouts) are policy, not errors: the controller
/// converts them into skip-and-continue and they never appear here.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("configuration: {0}")]
    Config(String),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Results(#[from] ResultStoreError),

    #[error(transparent)]
    Stage(#[from] StageFlowError),

    #[error("driver: {0}")]
    Driver(#[from] DriverError),

    /// A session is already active; the operator must confirm discarding it.
    #[error("a scan session is already active")]
    SessionActive,
}
