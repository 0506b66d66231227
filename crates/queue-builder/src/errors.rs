use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueBuildError {
    /// Every row on the page was filtered out; no session should be created.
    #[error("no eligible entries found on the schedule page")]
    NoEligibleRows,

    #[error("bad row selector {0:?}")]
    Selector(String),

    #[error("row cache io: {0}")]
    CacheIo(#[from] std::io::Error),

    #[error("row cache parse: {0}")]
    CacheParse(#[from] serde_json::Error),
}
