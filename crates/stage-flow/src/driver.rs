use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use portalscan_result_store::RecordRow;

use crate::model::PageSnapshot;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("control not found: {0}")]
    ControlMissing(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("page interaction failed: {0}")]
    Interaction(String),
}

/// The only seam through which stage handlers touch a live page.
///
/// Production implementations wrap a real tab; tests script one. Actions are
/// best-effort fire-and-forget against the page: a navigation the portal
/// performs in response cannot be cancelled, so cancellation stays
/// cooperative at the session layer.
#[async_trait]
pub trait PortalDriver: Send + Sync {
    /// Reduce the current page to its stage signals.
    async fn observe(&self) -> Result<PageSnapshot, DriverError>;

    /// Put the lookup key into the portal's home search field.
    async fn fill_search(&self, identifier: &str) -> Result<(), DriverError>;

    async fn submit_search(&self) -> Result<(), DriverError>;

    /// Activate the one-click identity confirmation. The affordance may
    /// render asynchronously; implementations apply a bounded wait before
    /// giving up with [`DriverError::ControlMissing`].
    async fn activate_confirm(&self) -> Result<(), DriverError>;

    /// Accept the configuration widget's default value (the documented
    /// acceptance-keystroke contract). Returns whether a selection resulted;
    /// `false` means the widget exposed no deterministic selection and the
    /// stage must fail rather than submit unconfigured.
    async fn confirm_default_selection(&self) -> Result<bool, DriverError>;

    /// Submit the configured lookup.
    async fn submit_configured_search(&self) -> Result<(), DriverError>;

    /// Read the populated results grid into rows.
    async fn scrape_results(&self) -> Result<Vec<RecordRow>, DriverError>;

    async fn navigate(&self, url: &Url) -> Result<(), DriverError>;
}
