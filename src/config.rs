use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::ScanError;

const APP_DIR: &str = "portalscan";
const SESSION_FILE: &str = "session.json";
const RESULTS_FILE: &str = "results.json";

/// Runtime configuration. Defaults target the production portal; every field
/// can be overridden from a config file or `PORTALSCAN_*` environment
/// variables.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Origin of the records portal.
    pub portal_origin: String,
    /// Path of the portal's fixed entry point.
    pub entry_path: String,
    /// Host of the external identity provider the portal bounces through.
    pub identity_host: String,
    /// Absolute bound on the manual-login wait.
    pub auth_timeout_ms: u64,
    /// Poll interval while waiting for manual login.
    pub auth_poll_ms: u64,
    /// Rolling bound on one queue item, measured from its first touch.
    pub item_timeout_ms: u64,
    /// Pause before navigating back from an unrecognized page.
    pub recovery_pause_ms: u64,
    /// Durable-store directory; defaults to the platform data dir.
    pub data_dir: Option<PathBuf>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            portal_origin: "https://health.recordlink.ca".to_string(),
            entry_path: "/Welcome/Index".to_string(),
            identity_host: "id.accessgateway.ca".to_string(),
            auth_timeout_ms: 120_000,
            auth_poll_ms: 3_000,
            item_timeout_ms: 90_000,
            recovery_pause_ms: 3_000,
            data_dir: None,
        }
    }
}

impl ScanConfig {
    /// Load defaults, then an optional config file, then environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ScanError> {
        let defaults = config::Config::try_from(&ScanConfig::default())
            .map_err(|err| ScanError::Config(err.to_string()))?;
        let mut builder = config::Config::builder().add_source(defaults);
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        builder
            .add_source(config::Environment::with_prefix("PORTALSCAN"))
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|err| ScanError::Config(err.to_string()))
    }

    /// The portal entry point, before the session token is stamped on.
    pub fn entry_url(&self) -> Result<Url, ScanError> {
        let raw = format!("{}{}", self.portal_origin, self.entry_path);
        Url::parse(&raw).map_err(|err| ScanError::Config(format!("bad entry url {raw:?}: {err}")))
    }

    pub fn is_identity_page(&self, url: &Url) -> bool {
        url.host_str() == Some(self.identity_host.as_str())
    }

    pub fn is_portal_page(&self, url: &Url) -> bool {
        match (Url::parse(&self.portal_origin), url.host_str()) {
            (Ok(origin), Some(host)) => origin.host_str() == Some(host),
            _ => false,
        }
    }

    pub fn auth_timeout(&self) -> Duration {
        Duration::from_millis(self.auth_timeout_ms)
    }

    pub fn auth_poll(&self) -> Duration {
        Duration::from_millis(self.auth_poll_ms)
    }

    pub fn item_timeout(&self) -> Duration {
        Duration::from_millis(self.item_timeout_ms)
    }

    pub fn recovery_pause(&self) -> Duration {
        Duration::from_millis(self.recovery_pause_ms)
    }

    pub fn session_path(&self) -> PathBuf {
        self.store_dir().join(SESSION_FILE)
    }

    pub fn results_path(&self) -> PathBuf {
        self.store_dir().join(RESULTS_FILE)
    }

    fn store_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR),
        }
    }
}
