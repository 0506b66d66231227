//! Authentication gate.
//!
//! Login is the one step gated on a human, and nothing guarantees a script
//! re-run that promptly observes its completion, so this is the only place
//! the automation holds an in-page wait loop. Every tick re-reads the
//! session record: stopping the session from the host tab makes the next
//! tick decline to continue.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info};

use portalscan_core_types::{epoch_ms, ScanId};
use portalscan_scan_state::SessionStore;
use portalscan_stage_flow::PortalDriver;

use crate::errors::ScanError;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GateOutcome {
    /// The page left the identity provider and the session still matches;
    /// the auth-wait flag has been cleared.
    LoginDetected,
    /// The absolute login bound elapsed.
    TimedOut,
    /// The session was stopped or replaced while waiting.
    ContextLost,
}

pub struct AuthGate {
    poll: Duration,
    bound_ms: i64,
}

impl AuthGate {
    pub fn new(poll: Duration, bound: Duration) -> Self {
        Self {
            poll,
            bound_ms: bound.as_millis() as i64,
        }
    }

    /// Poll until login completes, the bound elapses, or the session stops
    /// being ours. The timeout is absolute, anchored at the session's
    /// auth-wait start, not at this call.
    pub async fn wait(
        &self,
        driver: &dyn PortalDriver,
        sessions: &dyn SessionStore,
        expected: &ScanId,
    ) -> Result<GateOutcome, ScanError> {
        loop {
            let Some(session) = sessions.load()? else {
                return Ok(GateOutcome::ContextLost);
            };
            if !session.is_authoritative_for(expected) {
                debug!("session changed while waiting for login");
                return Ok(GateOutcome::ContextLost);
            }

            let waited_ms = epoch_ms().saturating_sub(session.auth_started_ms);
            if waited_ms > self.bound_ms {
                return Ok(GateOutcome::TimedOut);
            }

            let snapshot = driver.observe().await?;
            if !snapshot.on_identity_page {
                // Re-validate against the latest record before claiming the
                // transition; the host tab may have stopped the scan between
                // our load and this tick.
                let Some(mut current) = sessions.load()? else {
                    return Ok(GateOutcome::ContextLost);
                };
                if !current.is_authoritative_for(expected) {
                    return Ok(GateOutcome::ContextLost);
                }
                current.clear_auth_wait("Login detected, continuing in portal...");
                sessions.save(&current)?;
                info!("manual login detected");
                return Ok(GateOutcome::LoginDetected);
            }

            debug!(
                waited_ms,
                remaining_ms = self.bound_ms - waited_ms,
                "waiting for manual login"
            );
            sleep(self.poll).await;
        }
    }
}
