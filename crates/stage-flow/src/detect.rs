//! Fixed-priority stage inference.
//!
//! Checks run most-terminal-first: after an uncontrolled navigation a page
//! can simultaneously show leftovers of an earlier step (a search box in a
//! header) and the marker of a later one (a populated results grid), and the
//! later marker wins.

use crate::model::{PageSnapshot, Stage};

type StagePredicate = fn(&PageSnapshot) -> bool;

fn awaiting_auth(snapshot: &PageSnapshot) -> bool {
    snapshot.on_identity_page
}

fn results_ready(snapshot: &PageSnapshot) -> bool {
    snapshot.result_rows > 0
}

fn configure_and_submit(snapshot: &PageSnapshot) -> bool {
    snapshot.has_config_control || snapshot.has_config_submit
}

fn confirm_identity(snapshot: &PageSnapshot) -> bool {
    snapshot.has_confirm_affordance
}

fn search_entry(snapshot: &PageSnapshot) -> bool {
    snapshot.on_entry_page && snapshot.has_search_field && snapshot.has_search_submit
}

/// Ordered predicate table; the first match decides the stage.
const STAGE_CHECKS: &[(Stage, StagePredicate)] = &[
    (Stage::AwaitingAuth, awaiting_auth),
    (Stage::ResultsReady, results_ready),
    (Stage::ConfigureAndSubmit, configure_and_submit),
    (Stage::ConfirmIdentity, confirm_identity),
    (Stage::SearchEntry, search_entry),
];

pub fn detect_stage(snapshot: &PageSnapshot) -> Stage {
    for (stage, predicate) in STAGE_CHECKS {
        if predicate(snapshot) {
            return *stage;
        }
    }
    Stage::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn entry() -> Url {
        Url::parse("https://portal.example.net/Welcome/Index").unwrap()
    }

    #[test]
    fn later_stage_markers_outrank_earlier_ones() {
        // A results page still rendering the header search box.
        let snapshot = PageSnapshot::at(entry())
            .on_entry_page()
            .with_search_controls()
            .with_result_rows(7);
        assert_eq!(detect_stage(&snapshot), Stage::ResultsReady);

        let snapshot = PageSnapshot::at(entry())
            .with_search_controls()
            .on_entry_page()
            .with_config_control(false)
            .with_config_submit();
        assert_eq!(detect_stage(&snapshot), Stage::ConfigureAndSubmit);
    }

    #[test]
    fn identity_page_outranks_everything() {
        let snapshot = PageSnapshot::at(entry())
            .on_identity_page()
            .with_result_rows(3);
        assert_eq!(detect_stage(&snapshot), Stage::AwaitingAuth);
    }

    #[test]
    fn search_controls_off_the_entry_page_do_not_count() {
        let snapshot = PageSnapshot::at(Url::parse("https://portal.example.net/other").unwrap())
            .with_search_controls();
        assert_eq!(detect_stage(&snapshot), Stage::Unknown);
    }

    #[test]
    fn confirm_affordance_detected_alone() {
        let snapshot = PageSnapshot::at(entry()).with_confirm_affordance();
        assert_eq!(detect_stage(&snapshot), Stage::ConfirmIdentity);
    }

    #[test]
    fn detection_is_idempotent_on_an_unchanged_snapshot() {
        let snapshot = PageSnapshot::at(entry()).on_entry_page().with_search_controls();
        assert_eq!(detect_stage(&snapshot), detect_stage(&snapshot));
        assert_eq!(detect_stage(&snapshot), Stage::SearchEntry);
    }

    #[test]
    fn bare_page_is_unknown() {
        assert_eq!(detect_stage(&PageSnapshot::at(entry())), Stage::Unknown);
    }
}
