//! Engine configuration.
//!
//! Loaded from `<home>/.sheetsync/config.yaml`. A missing file yields
//! [`EngineConfig::default`]; a malformed file is an error — config typos
//! must never silently fall back to defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::types::SheetId;

pub const DEFAULT_API_BASE_URL: &str = "https://sheets.googleapis.com";
pub const DEFAULT_TOKEN_ENV: &str = "SHEETSYNC_TOKEN";
pub const DEFAULT_SCAN_ROW_CEILING: u32 = 10_000;
pub const DEFAULT_LOCK_TTL_SECS: u64 = 300;
pub const DEFAULT_CYCLE_INTERVAL_SECS: u64 = 60;

/// Sync engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of the spreadsheet REST API.
    pub api_base_url: String,
    /// Name of the environment variable holding the API bearer token.
    pub token_env: String,
    /// Sheet identity routed to the fulfilment column layout.
    /// Empty string means no sheet uses it.
    pub fulfilment_sheet_id: String,
    /// Upper row bound for key-column scans.
    pub scan_row_ceiling: u32,
    /// TTL of the sheet-sync mutual-exclusion lock, in seconds.
    pub lock_ttl_secs: u64,
    /// Scheduler cadence for the daemon, in seconds.
    pub cycle_interval_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_env: DEFAULT_TOKEN_ENV.to_string(),
            fulfilment_sheet_id: String::new(),
            scan_row_ceiling: DEFAULT_SCAN_ROW_CEILING,
            lock_ttl_secs: DEFAULT_LOCK_TTL_SECS,
            cycle_interval_secs: DEFAULT_CYCLE_INTERVAL_SECS,
        }
    }
}

impl EngineConfig {
    /// The configured fulfilment sheet identity, if any.
    pub fn fulfilment_sheet(&self) -> Option<SheetId> {
        if self.fulfilment_sheet_id.is_empty() {
            None
        } else {
            Some(SheetId::from(self.fulfilment_sheet_id.clone()))
        }
    }
}

/// `<home>/.sheetsync/config.yaml` — pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".sheetsync").join("config.yaml")
}

/// Load config, defaulting when the file is absent.
pub fn load_at(home: &Path) -> Result<EngineConfig, StoreError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(EngineConfig::default());
    }
    let contents = std::fs::read_to_string(&path)?;
    serde_yaml::from_str(&contents).map_err(|e| StoreError::Parse { path, source: e })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<EngineConfig, StoreError> {
    let home = dirs::home_dir().ok_or(StoreError::HomeNotFound)?;
    load_at(&home)
}

/// Atomically save config (serialize → `.tmp` sibling → rename).
pub fn save_at(home: &Path, config: &EngineConfig) -> Result<(), StoreError> {
    crate::store::sheetsync_dir_at(home)?;
    let path = config_path_at(home);
    let tmp = path.with_file_name("config.yaml.tmp");
    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp, yaml)?;
    std::fs::rename(&tmp, &path)?;
    Ok(())
}
