use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResultStoreError {
    #[error("result store io: {0}")]
    Io(#[from] std::io::Error),

    #[error("result serialization: {0}")]
    Serde(#[from] serde_json::Error),
}
