use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("session store io: {0}")]
    Io(#[from] std::io::Error),

    #[error("session serialization: {0}")]
    Serde(#[from] serde_json::Error),

    /// The persisted queue itself is unusable; skipping items cannot recover.
    #[error("queue invalid: {0}")]
    QueueInvalid(String),

    /// One queue entry is unusable at its recorded position.
    #[error("queue item {index} invalid: {reason}")]
    ItemInvalid { index: usize, reason: String },
}
