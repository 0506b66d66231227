//! Scripted portal for end-to-end scenario tests: a small page state machine
//! standing in for the live portal and identity provider.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use url::Url;

use portalscan_cli::{Controller, OperatorNotifier, ScanConfig};
use portalscan_result_store::{MemoryResultStore, RecordRow};
use portalscan_scan_state::MemorySessionStore;
use portalscan_stage_flow::{DriverError, PageSnapshot, PortalDriver};

/// How the human behaves at the identity provider.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoginScript {
    /// The tab lands directly on the portal, already authenticated.
    AlreadyAuthenticated,
    /// Login completes after this many identity-page observations.
    CompletesAfter(u32),
    Never,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum SimPage {
    Identity,
    Entry,
    Confirm,
    Configure,
    Results,
    Dead,
}

struct SimState {
    page: SimPage,
    current_url: Url,
    token_query: Option<String>,
    config_selected: bool,
    pending: Option<String>,
    /// Remaining observe() ticks on the identity page before "the human
    /// finishes logging in". `None` means login never completes.
    login_ticks: Option<u32>,
}

/// Driver whose portal reacts to actions the way the real workflow does.
pub struct ScriptedDriver {
    portal_base: Url,
    identity_base: Url,
    entry_path: String,
    records: Mutex<BTreeMap<String, Vec<RecordRow>>>,
    /// Identifiers whose search lands on an unrecognizable page.
    stuck: Mutex<HashSet<String>>,
    /// Identifiers whose configuration widget refuses a selection.
    selection_blocked: Mutex<HashSet<String>>,
    /// Swallow search submissions, leaving the page unchanged.
    inert_submit: Mutex<bool>,
    sim: Mutex<SimState>,
}

impl ScriptedDriver {
    pub fn new(config: &ScanConfig) -> Self {
        let portal_base = Url::parse(&config.portal_origin).expect("portal origin");
        let identity_base =
            Url::parse(&format!("https://{}/login/entry", config.identity_host))
                .expect("identity url");
        let entry_url = config.entry_url().expect("entry url");
        Self {
            portal_base,
            identity_base,
            entry_path: config.entry_path.clone(),
            records: Mutex::new(BTreeMap::new()),
            stuck: Mutex::new(HashSet::new()),
            selection_blocked: Mutex::new(HashSet::new()),
            inert_submit: Mutex::new(false),
            sim: Mutex::new(SimState {
                page: SimPage::Entry,
                current_url: entry_url,
                token_query: None,
                config_selected: false,
                pending: None,
                login_ticks: Some(0),
            }),
        }
    }

    pub fn with_records(&self, identifier: &str, rows: usize) {
        let records = (0..rows)
            .map(|i| {
                RecordRow::new()
                    .with_cell("Item", format!("{identifier}-record-{i}"))
                    .with_cell("Status", "Dispensed")
            })
            .collect();
        self.records.lock().insert(identifier.to_string(), records);
    }

    pub fn make_stuck(&self, identifier: &str) {
        self.stuck.lock().insert(identifier.to_string());
    }

    pub fn block_selection(&self, identifier: &str) {
        self.selection_blocked.lock().insert(identifier.to_string());
    }

    pub fn set_inert_submit(&self) {
        *self.inert_submit.lock() = true;
    }

    /// Point the simulated tab at the session's start URL.
    pub fn begin(&self, start_url: &Url, login: LoginScript) {
        let mut sim = self.sim.lock();
        sim.token_query = start_url.query().map(str::to_string);
        sim.pending = None;
        sim.config_selected = false;
        match login {
            LoginScript::AlreadyAuthenticated => {
                sim.login_ticks = Some(0);
                sim.page = SimPage::Entry;
                sim.current_url = start_url.clone();
            }
            LoginScript::CompletesAfter(ticks) => {
                sim.login_ticks = Some(ticks);
                sim.page = SimPage::Identity;
                let mut url = self.identity_base.clone();
                url.set_query(sim.token_query.as_deref());
                sim.current_url = url;
            }
            LoginScript::Never => {
                sim.login_ticks = None;
                sim.page = SimPage::Identity;
                let mut url = self.identity_base.clone();
                url.set_query(sim.token_query.as_deref());
                sim.current_url = url;
            }
        }
    }

    /// Simulate the portal bouncing the tab back to the identity provider.
    pub fn bounce_to_identity(&self) {
        let mut sim = self.sim.lock();
        sim.page = SimPage::Identity;
        sim.login_ticks = None;
        let mut url = self.identity_base.clone();
        url.set_query(sim.token_query.as_deref());
        sim.current_url = url;
    }

    pub fn current_url(&self) -> Url {
        self.sim.lock().current_url.clone()
    }

    fn portal_url(&self, sim: &SimState, path: &str) -> Url {
        let mut url = self.portal_base.clone();
        url.set_path(path);
        url.set_query(sim.token_query.as_deref());
        url
    }

    fn goto(&self, sim: &mut SimState, page: SimPage, path: &str) {
        sim.page = page;
        sim.current_url = self.portal_url(sim, path);
    }
}

#[async_trait]
impl PortalDriver for ScriptedDriver {
    async fn observe(&self) -> Result<PageSnapshot, DriverError> {
        let mut sim = self.sim.lock();

        if sim.page == SimPage::Identity {
            match sim.login_ticks {
                Some(0) => {
                    // Login just completed; the provider redirects to entry.
                    let entry = self.entry_path.clone();
                    self.goto(&mut sim, SimPage::Entry, &entry);
                }
                Some(ticks) => {
                    sim.login_ticks = Some(ticks - 1);
                    return Ok(PageSnapshot::at(sim.current_url.clone()).on_identity_page());
                }
                None => {
                    return Ok(PageSnapshot::at(sim.current_url.clone()).on_identity_page());
                }
            }
        }

        let url = sim.current_url.clone();
        let snapshot = match sim.page {
            SimPage::Identity => unreachable!("handled above"),
            SimPage::Entry => PageSnapshot::at(url).on_entry_page().with_search_controls(),
            SimPage::Confirm => PageSnapshot::at(url).with_confirm_affordance(),
            SimPage::Configure => PageSnapshot::at(url)
                .with_config_control(sim.config_selected)
                .with_config_submit(),
            SimPage::Results => {
                let rows = sim
                    .pending
                    .as_ref()
                    .and_then(|id| self.records.lock().get(id).map(Vec::len))
                    .unwrap_or(0);
                PageSnapshot::at(url).with_result_rows(rows)
            }
            SimPage::Dead => PageSnapshot::at(url),
        };
        Ok(snapshot)
    }

    async fn fill_search(&self, identifier: &str) -> Result<(), DriverError> {
        self.sim.lock().pending = Some(identifier.to_string());
        Ok(())
    }

    async fn submit_search(&self) -> Result<(), DriverError> {
        if *self.inert_submit.lock() {
            return Ok(());
        }
        let mut sim = self.sim.lock();
        let stuck = match &sim.pending {
            Some(id) => self.stuck.lock().contains(id),
            None => false,
        };
        if stuck {
            self.goto(&mut sim, SimPage::Dead, "/Error/Maintenance");
        } else {
            self.goto(&mut sim, SimPage::Confirm, "/ClientSearch/Results");
        }
        Ok(())
    }

    async fn activate_confirm(&self) -> Result<(), DriverError> {
        let mut sim = self.sim.lock();
        sim.config_selected = false;
        self.goto(&mut sim, SimPage::Configure, "/Records/Checkpoint");
        Ok(())
    }

    async fn confirm_default_selection(&self) -> Result<bool, DriverError> {
        let mut sim = self.sim.lock();
        let blocked = match &sim.pending {
            Some(id) => self.selection_blocked.lock().contains(id),
            None => false,
        };
        if blocked {
            return Ok(false);
        }
        sim.config_selected = true;
        Ok(true)
    }

    async fn submit_configured_search(&self) -> Result<(), DriverError> {
        let mut sim = self.sim.lock();
        self.goto(&mut sim, SimPage::Results, "/Records/Profile");
        Ok(())
    }

    async fn scrape_results(&self) -> Result<Vec<RecordRow>, DriverError> {
        let sim = self.sim.lock();
        let records = sim
            .pending
            .as_ref()
            .and_then(|id| self.records.lock().get(id).cloned())
            .unwrap_or_default();
        Ok(records)
    }

    async fn navigate(&self, url: &Url) -> Result<(), DriverError> {
        let mut sim = self.sim.lock();
        sim.current_url = url.clone();
        sim.token_query = url.query().map(str::to_string);
        sim.page = SimPage::Entry;
        sim.pending = None;
        sim.config_selected = false;
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().clone()
    }
}

impl OperatorNotifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.alerts.lock().push(message.to_string());
    }
}

pub struct Harness {
    pub controller: Controller,
    pub sessions: Arc<MemorySessionStore>,
    pub results: Arc<MemoryResultStore>,
    pub driver: Arc<ScriptedDriver>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new(config: ScanConfig) -> Self {
        let sessions = Arc::new(MemorySessionStore::new());
        let results = Arc::new(MemoryResultStore::new());
        let driver = Arc::new(ScriptedDriver::new(&config));
        let notifier = Arc::new(RecordingNotifier::default());
        let controller = Controller::new(
            config,
            sessions.clone(),
            results.clone(),
            driver.clone(),
            notifier.clone(),
        )
        .expect("controller");
        Self {
            controller,
            sessions,
            results,
            driver,
            notifier,
        }
    }
}

/// Tight timeouts so scenario tests finish quickly.
pub fn test_config() -> ScanConfig {
    ScanConfig {
        portal_origin: "https://portal.test".to_string(),
        entry_path: "/Welcome/Index".to_string(),
        identity_host: "id.test".to_string(),
        auth_timeout_ms: 200,
        auth_poll_ms: 10,
        item_timeout_ms: 150,
        recovery_pause_ms: 10,
        data_dir: None,
    }
}
