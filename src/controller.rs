//! Session controller.
//!
//! `run_on_load` is the single entry point re-invoked on every page load.
//! Nothing survives a navigation except the durable session record, so each
//! invocation re-reads the latest record, validates that the loaded page
//! belongs to it, drives at most one stage, and writes the record back.

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

use portalscan_core_types::{epoch_ms, ScanId};
use portalscan_result_store::ResultStore;
use portalscan_scan_state::{ScanSession, SessionStore, WorkItem};
use portalscan_stage_flow::nav;
use portalscan_stage_flow::{run_stage, PortalDriver, Stage, StageFlowError, StageOutcome};

use crate::auth::{AuthGate, GateOutcome};
use crate::config::ScanConfig;
use crate::errors::ScanError;
use crate::notify::OperatorNotifier;
use crate::supervisor::{ItemTimeoutSupervisor, ItemTiming};

/// Why a load was left alone.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IgnoreReason {
    NoSession,
    Inactive,
    /// Page URL carries no session token (manual navigation).
    NoToken,
    /// Page token names a different session; the orphaned record was cleared.
    TokenMismatch,
    /// URL belongs to neither the portal nor the identity provider.
    ForeignPage,
}

/// What one `run_on_load` invocation did.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LoadOutcome {
    Ignored(IgnoreReason),
    /// Manual login completed; the follow-up navigation continues the scan.
    AuthCompleted,
    /// The session was stopped within this invocation.
    Stopped(String),
    /// The queue was exhausted within this invocation.
    Completed,
    ItemCompleted(String),
    ItemSkipped { identifier: String, reason: String },
    /// A stage action was issued; the portal's response carries on.
    ActionIssued(Stage),
    /// Unrecognized page; navigated back to the entry point.
    Recovered,
}

pub struct Controller {
    config: ScanConfig,
    entry: Url,
    sessions: Arc<dyn SessionStore>,
    results: Arc<dyn ResultStore>,
    driver: Arc<dyn PortalDriver>,
    notifier: Arc<dyn OperatorNotifier>,
    gate: AuthGate,
    supervisor: ItemTimeoutSupervisor,
}

impl Controller {
    pub fn new(
        config: ScanConfig,
        sessions: Arc<dyn SessionStore>,
        results: Arc<dyn ResultStore>,
        driver: Arc<dyn PortalDriver>,
        notifier: Arc<dyn OperatorNotifier>,
    ) -> Result<Self, ScanError> {
        let entry = config.entry_url()?;
        let gate = AuthGate::new(config.auth_poll(), config.auth_timeout());
        let supervisor = ItemTimeoutSupervisor::new(config.item_timeout());
        Ok(Self {
            config,
            entry,
            sessions,
            results,
            driver,
            notifier,
            gate,
            supervisor,
        })
    }

    /// Create a fresh session around `queue` and return the tokenized entry
    /// URL for the caller to open. Refuses while another session is active
    /// unless the operator confirmed discarding it.
    pub fn start_session(
        &self,
        queue: Vec<WorkItem>,
        discard_active: bool,
    ) -> Result<Url, ScanError> {
        if let Some(existing) = self.sessions.load()? {
            if existing.active {
                if !discard_active {
                    return Err(ScanError::SessionActive);
                }
                info!(scan_id = %existing.scan_id, "discarding active session on operator request");
                self.sessions.clear()?;
            }
        }

        let session = ScanSession::new(ScanId::new(), queue, epoch_ms());
        session.validate()?;
        self.sessions.save(&session)?;

        let url = nav::entry_url(&self.entry, &session.scan_id);
        info!(scan_id = %session.scan_id, items = session.queue.len(), "scan session started");
        Ok(url)
    }

    /// Deactivate the current session, keeping queue and cursor for
    /// inspection.
    pub fn stop_session(&self, reason: &str) -> Result<(), ScanError> {
        if let Some(mut session) = self.sessions.load()? {
            session.mark_stopped(format!("Scan stopped: {reason}."));
            self.sessions.save(&session)?;
            self.notifier.alert(&format!("Portal scan stopped: {reason}"));
        }
        Ok(())
    }

    /// Entry point for every page load.
    pub async fn run_on_load(&self, page_url: &Url) -> Result<LoadOutcome, ScanError> {
        let Some(session) = self.sessions.load()? else {
            return Ok(LoadOutcome::Ignored(IgnoreReason::NoSession));
        };

        let Some(token) = nav::scan_id_from_url(page_url) else {
            // Manual navigation; never mutate on its account.
            debug!(url = %page_url, "load without session token ignored");
            return Ok(LoadOutcome::Ignored(IgnoreReason::NoToken));
        };
        if !session.active {
            return Ok(LoadOutcome::Ignored(IgnoreReason::Inactive));
        }
        if token != session.scan_id {
            // An active record that no live page can ever match again is
            // orphaned; clear it so the next start is clean.
            warn!(page = %token, session = %session.scan_id, "token mismatch, clearing stale session");
            self.sessions.clear()?;
            return Ok(LoadOutcome::Ignored(IgnoreReason::TokenMismatch));
        }

        if self.config.is_identity_page(page_url) {
            return self.handle_identity_page(session).await;
        }
        if !self.config.is_portal_page(page_url) {
            warn!(url = %page_url, "tokenized load on unexpected host");
            return Ok(LoadOutcome::Ignored(IgnoreReason::ForeignPage));
        }
        self.handle_portal_page(session).await
    }

    async fn handle_identity_page(
        &self,
        mut session: ScanSession,
    ) -> Result<LoadOutcome, ScanError> {
        if !session.auth_wait {
            return self.stop_with_alert(
                "Error: Unexpectedly redirected to login. Scan stopped.",
                "Portal session may have expired mid-scan. Restart the scan from the schedule page.",
                "unexpected auth redirect",
            );
        }

        session.status = "Waiting for manual portal login...".to_string();
        self.sessions.save(&session)?;

        let scan_id = session.scan_id.clone();
        match self
            .gate
            .wait(self.driver.as_ref(), self.sessions.as_ref(), &scan_id)
            .await?
        {
            GateOutcome::LoginDetected => Ok(LoadOutcome::AuthCompleted),
            GateOutcome::TimedOut => self.stop_with_alert(
                "Error: Login timed out. Scan stopped.",
                "Portal login timed out. Log in manually and restart the scan.",
                "login timed out",
            ),
            GateOutcome::ContextLost => Ok(LoadOutcome::Ignored(IgnoreReason::Inactive)),
        }
    }

    async fn handle_portal_page(&self, mut session: ScanSession) -> Result<LoadOutcome, ScanError> {
        if session.auth_wait {
            // Landing here means login finished before the gate ever polled.
            session.clear_auth_wait("Login successful, starting lookups...");
            self.sessions.save(&session)?;
        }

        if let Err(err) = session.validate() {
            let reason = format!("invalid session state: {err}");
            return self.stop_with_alert(
                &format!("Error: {reason}. Scan stopped."),
                &format!("Stopping portal scan: {reason}."),
                &reason,
            );
        }

        if session.finished() {
            let total = session.queue.len();
            session.mark_stopped(format!("Completed scan for {total} items."));
            self.sessions.save(&session)?;
            self.notifier
                .alert(&format!("Portal scan completed for {total} items."));
            return Ok(LoadOutcome::Completed);
        }

        let Some(item) = session.current().cloned() else {
            let reason = "invalid session state: cursor has no item".to_string();
            return self.stop_with_alert(
                &format!("Error: {reason}. Scan stopped."),
                &format!("Stopping portal scan: {reason}."),
                &reason,
            );
        };

        let now = epoch_ms();
        match self.supervisor.check(&session, now) {
            ItemTiming::FirstTouch => {
                session.begin_item(now);
                self.sessions.save(&session)?;
            }
            ItemTiming::Running { elapsed_ms } => {
                debug!(identifier = %item.identifier, elapsed_ms, "continuing item");
            }
            ItemTiming::Exceeded { elapsed_ms } => {
                warn!(identifier = %item.identifier, elapsed_ms, "item timed out");
                let reason = format!("timed out after {elapsed_ms}ms");
                return self
                    .skip_current(
                        &mut session,
                        &item.identifier,
                        format!("Timeout for {}. Skipping.", item.identifier),
                        format!(
                            "Processing timed out for {}. Skipping to the next item.",
                            item.identifier
                        ),
                        reason,
                    )
                    .await;
            }
        }

        let stage_result = match self.driver.observe().await {
            Ok(snapshot) => run_stage(self.driver.as_ref(), &snapshot, &item).await,
            Err(err) => Err(StageFlowError::Driver {
                stage: Stage::Unknown,
                source: err,
            }),
        };

        match stage_result {
            Ok(StageOutcome::Captured(records)) => {
                self.results.put(&item.identifier, records, epoch_ms())?;
                let finished =
                    session.advance(format!("Finished {}. Moving to next...", item.identifier));
                if finished {
                    self.finalize_completed(&mut session);
                }
                self.sessions.save(&session)?;
                self.driver.navigate(&self.entry_for(&session)).await?;
                if finished {
                    Ok(LoadOutcome::Completed)
                } else {
                    Ok(LoadOutcome::ItemCompleted(item.identifier))
                }
            }

            Ok(StageOutcome::ActionIssued(stage)) => {
                session.status = match stage {
                    Stage::SearchEntry => format!("Submitted lookup for {}...", item.identifier),
                    Stage::ConfirmIdentity => {
                        format!("Confirmed identity for {}, loading records...", item.identifier)
                    }
                    Stage::ConfigureAndSubmit => {
                        format!("Searching records for {}...", item.identifier)
                    }
                    _ => session.status.clone(),
                };
                self.sessions.save(&session)?;
                Ok(LoadOutcome::ActionIssued(stage))
            }

            Ok(StageOutcome::AwaitingAuth) => {
                // A portal URL rendering the identity provider means the
                // portal session expired under us.
                self.stop_with_alert(
                    "Error: Unexpectedly redirected to login. Scan stopped.",
                    "Portal session may have expired mid-scan. Restart the scan from the schedule page.",
                    "unexpected auth redirect",
                )
            }

            Ok(StageOutcome::Recovery) => {
                session.status =
                    format!("Unexpected page state for {}. Attempting recovery.", item.identifier);
                self.sessions.save(&session)?;
                sleep(self.config.recovery_pause()).await;
                self.driver.navigate(&self.entry_for(&session)).await?;
                Ok(LoadOutcome::Recovered)
            }

            Err(err) => {
                let reason = err.to_string();
                self.skip_current(
                    &mut session,
                    &item.identifier,
                    format!("Error for {}: {reason}. Skipping.", item.identifier),
                    format!(
                        "Error while processing {}: {reason}. Skipping to the next item.",
                        item.identifier
                    ),
                    reason.clone(),
                )
                .await
            }
        }
    }

    /// Skip the current item and keep the queue moving; the automation must
    /// never stall on one item.
    async fn skip_current(
        &self,
        session: &mut ScanSession,
        identifier: &str,
        status: String,
        alert: String,
        reason: String,
    ) -> Result<LoadOutcome, ScanError> {
        let finished = session.advance(status);
        self.notifier.alert(&alert);
        if finished {
            self.finalize_completed(session);
        }
        self.sessions.save(session)?;
        self.driver.navigate(&self.entry_for(session)).await?;
        Ok(LoadOutcome::ItemSkipped {
            identifier: identifier.to_string(),
            reason,
        })
    }

    fn finalize_completed(&self, session: &mut ScanSession) {
        let total = session.queue.len();
        session.status = format!("Completed scan for {total} items.");
        self.notifier
            .alert(&format!("Portal scan completed for {total} items."));
    }

    /// Stop against the latest persisted record, not a copy held across an
    /// await point.
    fn stop_with_alert(
        &self,
        status: &str,
        alert: &str,
        reason: &str,
    ) -> Result<LoadOutcome, ScanError> {
        if let Some(mut session) = self.sessions.load()? {
            session.mark_stopped(status.to_string());
            self.sessions.save(&session)?;
        }
        self.notifier.alert(alert);
        Ok(LoadOutcome::Stopped(reason.to_string()))
    }

    fn entry_for(&self, session: &ScanSession) -> Url {
        nav::entry_url(&self.entry, &session.scan_id)
    }
}
