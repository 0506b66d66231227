use tracing::{debug, info, warn};

use portalscan_result_store::RecordRow;
use portalscan_scan_state::WorkItem;

use crate::detect::detect_stage;
use crate::driver::PortalDriver;
use crate::errors::{at, StageFlowError};
use crate::model::{PageSnapshot, Stage};

/// What one invocation did with the page it found.
#[derive(Debug)]
pub enum StageOutcome {
    /// Results for the current item were scraped; the caller records them,
    /// advances the cursor, and navigates onward.
    Captured(Vec<RecordRow>),
    /// A page action was issued; the portal's response navigation carries
    /// the workflow forward.
    ActionIssued(Stage),
    /// The page belongs to the identity provider; the caller owns the wait.
    AwaitingAuth,
    /// Nothing recognizable; the caller pauses briefly and navigates back to
    /// the entry point.
    Recovery,
}

/// Classify the snapshot and drive exactly one stage. Session bookkeeping
/// stays with the caller; errors carry the failing stage.
pub async fn run_stage(
    driver: &dyn PortalDriver,
    snapshot: &PageSnapshot,
    item: &WorkItem,
) -> Result<StageOutcome, StageFlowError> {
    let stage = detect_stage(snapshot);
    debug!(%stage, identifier = %item.identifier, url = %snapshot.url, "stage detected");

    match stage {
        Stage::AwaitingAuth => Ok(StageOutcome::AwaitingAuth),

        Stage::ResultsReady => {
            let records = driver.scrape_results().await.map_err(at(stage))?;
            info!(
                identifier = %item.identifier,
                records = records.len(),
                "results captured"
            );
            Ok(StageOutcome::Captured(records))
        }

        Stage::ConfigureAndSubmit => {
            if !snapshot.config_selected {
                let selected = driver
                    .confirm_default_selection()
                    .await
                    .map_err(at(stage))?;
                if !selected {
                    return Err(StageFlowError::SelectionRejected { stage });
                }
                debug!(identifier = %item.identifier, "default configuration accepted");
            }
            driver.submit_configured_search().await.map_err(at(stage))?;
            Ok(StageOutcome::ActionIssued(stage))
        }

        Stage::ConfirmIdentity => {
            driver.activate_confirm().await.map_err(at(stage))?;
            Ok(StageOutcome::ActionIssued(stage))
        }

        Stage::SearchEntry => {
            driver.fill_search(&item.identifier).await.map_err(at(stage))?;
            driver.submit_search().await.map_err(at(stage))?;
            Ok(StageOutcome::ActionIssued(stage))
        }

        Stage::Unknown => {
            warn!(url = %snapshot.url, identifier = %item.identifier, "unrecognized page state");
            Ok(StageOutcome::Recovery)
        }
    }
}
