use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// One recognizable step of the manual portal workflow.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Stage {
    AwaitingAuth,
    SearchEntry,
    ConfirmIdentity,
    ConfigureAndSubmit,
    ResultsReady,
    Unknown,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::AwaitingAuth => "awaiting-auth",
            Stage::SearchEntry => "search-entry",
            Stage::ConfirmIdentity => "confirm-identity",
            Stage::ConfigureAndSubmit => "configure-and-submit",
            Stage::ResultsReady => "results-ready",
            Stage::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Pure observation of a loaded page, taken once per invocation.
///
/// The driver reduces the live DOM to these signals; stage inference never
/// touches the page again, so a snapshot can be synthesized in tests or
/// saved and replayed offline.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub url: Url,
    /// Page belongs to the external identity provider, not the portal.
    pub on_identity_page: bool,
    /// Page is the portal's fixed entry point.
    pub on_entry_page: bool,
    /// Populated rows in the results grid for the current lookup.
    pub result_rows: usize,
    /// Required configuration control (access-location picker).
    pub has_config_control: bool,
    /// A configuration value is already chosen.
    pub config_selected: bool,
    /// Submit control on the configuration page.
    pub has_config_submit: bool,
    /// One-click identity confirmation affordance.
    pub has_confirm_affordance: bool,
    pub has_search_field: bool,
    pub has_search_submit: bool,
}

impl PageSnapshot {
    pub fn at(url: Url) -> Self {
        Self {
            url,
            on_identity_page: false,
            on_entry_page: false,
            result_rows: 0,
            has_config_control: false,
            config_selected: false,
            has_config_submit: false,
            has_confirm_affordance: false,
            has_search_field: false,
            has_search_submit: false,
        }
    }

    pub fn on_identity_page(mut self) -> Self {
        self.on_identity_page = true;
        self
    }

    pub fn on_entry_page(mut self) -> Self {
        self.on_entry_page = true;
        self
    }

    pub fn with_result_rows(mut self, rows: usize) -> Self {
        self.result_rows = rows;
        self
    }

    pub fn with_config_control(mut self, selected: bool) -> Self {
        self.has_config_control = true;
        self.config_selected = selected;
        self
    }

    pub fn with_config_submit(mut self) -> Self {
        self.has_config_submit = true;
        self
    }

    pub fn with_confirm_affordance(mut self) -> Self {
        self.has_confirm_affordance = true;
        self
    }

    pub fn with_search_controls(mut self) -> Self {
        self.has_search_field = true;
        self.has_search_submit = true;
        self
    }
}
