//! App state persistence - JSON save/load across restarts.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use sectorlens_core::domain::GroupKey;

use crate::app::{AppState, Panel, SummaryMode};
use crate::filters::FilterState;

/// Serializable subset of app state that persists across restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub active_panel: Panel,
    pub filters: FilterState,
    pub compare_firms: BTreeSet<String>,
    pub summary_mode: SummaryMode,
    pub trend_level: GroupKey,
    pub correlation_level: GroupKey,
    pub browser_index: usize,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            active_panel: Panel::Summary,
            filters: FilterState::default(),
            compare_firms: BTreeSet::new(),
            summary_mode: SummaryMode::BySector,
            trend_level: GroupKey::SuperSector,
            correlation_level: GroupKey::Sector,
            browser_index: 0,
        }
    }
}

/// `<config dir>/sectorlens/state.json`, or `./sectorlens/state.json` when
/// the platform has no config directory.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sectorlens")
        .join("state.json")
}

/// Load persisted state from disk. Returns defaults if file is missing or corrupt.
pub fn load(path: &Path) -> PersistedState {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
        Err(_) => PersistedState::default(),
    }
}

/// Save persisted state to disk. Creates parent directories if needed.
pub fn save(path: &Path, state: &PersistedState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn extract(app: &AppState) -> PersistedState {
    PersistedState {
        active_panel: app.active_panel,
        filters: app.filters.clone(),
        compare_firms: app.compare.firms.clone(),
        summary_mode: app.summary_mode,
        trend_level: app.trend_level,
        correlation_level: app.correlation.level,
        browser_index: app.browser.index,
    }
}

/// Apply persisted state, then drop whatever the current tables no longer
/// contain.
pub fn apply(app: &mut AppState, state: PersistedState) {
    app.active_panel = state.active_panel;
    app.filters = state.filters;
    app.compare.firms = state.compare_firms;
    app.summary_mode = state.summary_mode;
    app.trend_level = state.trend_level;
    app.correlation.level = state.correlation_level;
    app.browser.index = state
        .browser_index
        .min(app.browser.entries.len().saturating_sub(1));
    app.normalize_selections();
}
