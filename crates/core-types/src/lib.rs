use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Token identifying one end-to-end scan run.
///
/// The token travels as a query parameter on every automated navigation into
/// the portal; a freshly loaded page belongs to a session only when the two
/// tokens match.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanId(pub String);

const SCAN_ID_PREFIX: &str = "ps_";

impl ScanId {
    pub fn new() -> Self {
        Self(format!("{}{}", SCAN_ID_PREFIX, Uuid::new_v4().simple()))
    }

    /// Parse a token received from an untrusted source (a page URL).
    pub fn parse(raw: &str) -> Result<Self, TokenError> {
        if !raw.starts_with(SCAN_ID_PREFIX) || raw.len() <= SCAN_ID_PREFIX.len() {
            return Err(TokenError::Malformed {
                token: raw.to_string(),
            });
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ScanId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum TokenError {
    #[error("malformed scan token: {token:?}")]
    Malformed { token: String },
}

/// Milliseconds since the Unix epoch, the timestamp unit of every persisted
/// document.
pub fn epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
