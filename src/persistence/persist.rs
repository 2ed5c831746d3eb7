use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use once_cell::sync::OnceCell;
use ron::ser::PrettyConfig;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use time::macros::format_description;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::explorer::columns::project_columns;
use crate::explorer::filters::{ColumnFilter, PanelId};
use crate::explorer::pagination::PaginationState;
use crate::explorer::panels::{BreadcrumbEntry, Panel, PanelKind};
use crate::explorer::state::Explorer;
use crate::graph_utils::graph::{Node, NodeKey};
use super::settings::ExplorerSettings;

pub const STATE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedPanel {
    #[serde(rename = "type")]
    pub kind: PanelKind,
    // rows are stored by key and re-resolved against the live graph on restore
    pub node_keys: Vec<NodeKey>,
    #[serde(default)]
    pub parent_panel_index: Option<usize>,
    #[serde(default)]
    pub parent_row_key: Option<NodeKey>,
    #[serde(default)]
    pub relation_type_map: HashMap<NodeKey, Vec<String>>,
    #[serde(default)]
    pub breadcrumb: Vec<BreadcrumbEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedFilter {
    pub panel_index: usize,
    pub column: String,
    pub filter: ColumnFilter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedPagination {
    pub panel_index: usize,
    pub state: PaginationState,
}

/// Opaque checkpoint of panel, filter and paging state handed to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub version: u32,
    pub session_id: Uuid,
    pub panels: Vec<PersistedPanel>,
    pub selected_panel_indices: Vec<usize>,
    pub column_filters: Vec<PersistedFilter>,
    pub pagination_state: Vec<PersistedPagination>,
}

impl Default for PersistedState {
    fn default() -> Self {
        PersistedState {
            version: STATE_VERSION,
            session_id: Uuid::now_v7(),
            panels: Vec::new(),
            selected_panel_indices: Vec::new(),
            column_filters: Vec::new(),
            pagination_state: Vec::new(),
        }
    }
}

// Decode one field, or fall back to its default without failing the rest of the blob.
fn field<T: DeserializeOwned + Default>(blob: &JsonValue, name: &str) -> T {
    let Some(raw) = blob.get(name) else { return T::default() };
    match serde_json::from_value(raw.clone()) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("persisted state: ignoring malformed `{}`: {}", name, e);
            T::default()
        }
    }
}

// Decode each array element on its own, keeping the ones that parse.
fn entries<T: DeserializeOwned>(blob: &JsonValue, name: &str) -> Vec<T> {
    let Some(items) = blob.get(name).and_then(JsonValue::as_array) else { return Vec::new() };
    items
        .iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(v) => Some(v),
            Err(e) => {
                log::debug!("persisted state: skipping `{}` entry: {}", name, e);
                None
            }
        })
        .collect()
}

impl PersistedState {
    pub fn from_explorer(explorer: &Explorer) -> Self {
        let stack = &explorer.stack;
        let mut column_filters = Vec::new();
        let mut pagination_state = Vec::new();
        for (panel_index, panel) in stack.iter().enumerate() {
            if let Some(filters) = explorer.filters.filters_for(panel.id) {
                column_filters.extend(filters.iter().map(|(column, filter)| PersistedFilter {
                    panel_index,
                    column: column.clone(),
                    filter: filter.clone(),
                }));
            }
            if let Some(state) = explorer.pagination.get(&panel.id) {
                pagination_state.push(PersistedPagination { panel_index, state: *state });
            }
        }
        PersistedState {
            version: STATE_VERSION,
            session_id: explorer.session_id,
            panels: stack
                .iter()
                .map(|p| PersistedPanel {
                    kind: p.kind,
                    node_keys: p.nodes.iter().map(|n| n.key.clone()).collect(),
                    parent_panel_index: stack.parent_index(p),
                    parent_row_key: p.parent_row_key.clone(),
                    relation_type_map: p.relation_types.clone(),
                    breadcrumb: p.breadcrumb.clone(),
                })
                .collect(),
            selected_panel_indices: explorer.selected_panel_indices().into_iter().collect(),
            column_filters,
            pagination_state,
        }
    }

    /// Read a host blob field by field. Nothing here fails; bad parts become defaults.
    pub fn from_value(blob: &JsonValue) -> Self {
        let defaults = PersistedState::default();
        if !blob.is_object() {
            log::warn!("persisted state is not an object, starting fresh");
            return defaults;
        }
        PersistedState {
            version: blob
                .get("version")
                .and_then(JsonValue::as_u64)
                .map(|v| v as u32)
                .unwrap_or(STATE_VERSION),
            session_id: blob
                .get("sessionId")
                .and_then(JsonValue::as_str)
                .and_then(|s| Uuid::parse_str(s).ok())
                .unwrap_or(defaults.session_id),
            // Panels reference each other by index, so a partial list is not trustworthy
            panels: field(blob, "panels"),
            selected_panel_indices: entries(blob, "selectedPanelIndices"),
            column_filters: entries(blob, "columnFilters"),
            pagination_state: entries(blob, "paginationState"),
        }
    }

    pub fn to_value(&self) -> anyhow::Result<JsonValue> {
        Ok(serde_json::to_value(self)?)
    }

    /// Rebuild panels and per-panel state on top of an explorer whose Root already mirrors the live graph.
    pub fn apply_to(self, explorer: &mut Explorer) {
        let Some(root_id) = explorer.stack.root().map(|r| r.id) else { return };
        explorer.session_id = self.session_id;

        let mut index_map: HashMap<usize, PanelId> = HashMap::new();
        index_map.insert(0, root_id);
        let root_ok = self.panels.first().map(|p| p.kind == PanelKind::Root).unwrap_or(true);
        if !root_ok {
            log::warn!("persisted state: first panel is not Root, dropping saved panels");
        }
        let saved_panels: Vec<(usize, PersistedPanel)> = if root_ok { self.panels.into_iter().enumerate().skip(1).collect() } else { Vec::new() };

        for (old_index, saved) in saved_panels {
            if saved.kind != PanelKind::Expansion {
                // Result rows come from the host again
                continue;
            }
            let Some(row_key) = saved.parent_row_key else {
                log::debug!("persisted state: expansion panel {} has no parent row", old_index);
                continue;
            };
            let parent_panel = saved.parent_panel_index.and_then(|i| index_map.get(&i).copied());
            if explorer.stack.has_expansion(parent_panel, &row_key) {
                log::debug!("persisted state: panel {} repeats expansion of {}", old_index, row_key);
                continue;
            }
            let nodes: Vec<Node> = saved
                .node_keys
                .iter()
                .filter_map(|k| explorer.graph.get_node(k).cloned())
                .collect();
            if nodes.is_empty() {
                log::debug!("persisted state: panel {} has no surviving rows", old_index);
                continue;
            }
            let id = explorer.stack.alloc_id();
            let relation_types = saved
                .relation_type_map
                .into_iter()
                .filter(|(k, _)| nodes.iter().any(|n| &n.key == k))
                .collect();
            let panel = Panel {
                id,
                kind: PanelKind::Expansion,
                columns: project_columns(&nodes),
                nodes,
                revision: 0,
                parent_panel,
                parent_row_key: Some(row_key),
                relation_types,
                breadcrumb: saved.breadcrumb,
            };
            explorer.stack.push(panel);
            index_map.insert(old_index, id);
        }

        for f in self.column_filters {
            if let Some(&id) = index_map.get(&f.panel_index) {
                explorer.filters.set_filter(id, &f.column, f.filter);
            }
        }
        for p in self.pagination_state {
            if let Some(&id) = index_map.get(&p.panel_index) {
                let mut state = p.state;
                state.page_size = state.page_size.max(1);
                state.current_page = state.current_page.max(1);
                explorer.pagination.insert(id, state);
            }
        }
        for index in self.selected_panel_indices {
            if let Some(&id) = index_map.get(&index) {
                explorer.selection.selected_panels.insert(id);
            }
        }
        explorer.clamp_pages();
        log::info!("restored {} panels from checkpoint", explorer.stack.len());
    }
}

/// Collapses bursts of changes into one write once things have been quiet for `debounce`.
#[derive(Debug)]
pub struct Checkpointer {
    debounce: Duration,
    last_change: Option<Instant>,
    cancelled: bool,
}

impl Checkpointer {
    pub fn new(debounce: Duration) -> Self {
        Checkpointer { debounce, last_change: None, cancelled: false }
    }

    pub fn mark_dirty(&mut self, now: Instant) {
        if !self.cancelled {
            self.last_change = Some(now);
        }
    }

    pub fn is_pending(&self) -> bool { self.last_change.is_some() }

    /// True once, when the quiet period after the latest change has elapsed.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.last_change {
            Some(t) if now.saturating_duration_since(t) >= self.debounce => {
                self.last_change = None;
                true
            }
            _ => false,
        }
    }

    pub fn take_pending(&mut self) -> bool {
        self.last_change.take().is_some()
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.last_change = None;
    }
}

static SETTINGS_OVERRIDE: OnceCell<ExplorerSettings> = OnceCell::new();

pub fn set_settings_override(settings: ExplorerSettings) {
    let _ = SETTINGS_OVERRIDE.set(settings);
}

fn autosave_dir() -> PathBuf {
    if let Some(settings) = SETTINGS_OVERRIDE.get() {
        return settings.autosave_dir();
    }
    let settings = ExplorerSettings::load().unwrap_or_default();
    settings.autosave_dir()
}

pub fn active_state_path() -> PathBuf {
    autosave_dir().join("state.ron")
}

fn versioned_name_now() -> String {
    let now = OffsetDateTime::now_utc();
    let fmt = format_description!("[year][month][day]_[hour][minute][second]");
    let stamp = now.format(fmt).unwrap_or_else(|_| "unknown".to_string());
    format!("state_{}.ron", stamp)
}

fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let tmp_path = path.with_extension("ron.tmp");
    {
        let mut f = File::create(&tmp_path)?;
        f.write_all(data)?;
        f.flush()?;
    }
    fs::rename(tmp_path, path)?;
    Ok(())
}

fn to_ron(state: &PersistedState) -> anyhow::Result<String> {
    let pretty = PrettyConfig::new()
        .separate_tuple_members(true)
        .enumerate_arrays(true);
    Ok(ron::ser::to_string_pretty(state, pretty)?)
}

pub fn save_to_path(state: &PersistedState, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    atomic_write(path, to_ron(state)?.as_bytes())?;
    log::debug!("checkpoint written to {}", path.display());
    Ok(())
}

pub fn save_active_in(dir: &Path, state: &PersistedState) -> anyhow::Result<PathBuf> {
    let path = dir.join("state.ron");
    save_to_path(state, &path)?;
    Ok(path)
}

pub fn save_versioned_in(dir: &Path, state: &PersistedState) -> anyhow::Result<PathBuf> {
    let path = dir.join(versioned_name_now());
    save_to_path(state, &path)?;
    Ok(path)
}

pub fn save_active(state: &PersistedState) -> anyhow::Result<PathBuf> {
    save_active_in(&autosave_dir(), state)
}

pub fn save_versioned(state: &PersistedState) -> anyhow::Result<PathBuf> {
    save_versioned_in(&autosave_dir(), state)
}

pub fn load_active() -> anyhow::Result<Option<PersistedState>> {
    let path = active_state_path();
    if !path.exists() {
        return Ok(None);
    }
    load_from_path(&path).map(Some)
}

pub fn load_from_path(path: &Path) -> anyhow::Result<PersistedState> {
    let mut f = File::open(path)?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let state: PersistedState = ron::from_str(&buf)?;
    Ok(state)
}

pub fn list_versions_in(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = Vec::new();
    if dir.exists() {
        for e in fs::read_dir(dir)? {
            let p = e?.path();
            if let Some(name) = p.file_name().and_then(|s| s.to_str())
                && name.starts_with("state_") && name.ends_with(".ron")
            {
                entries.push(p);
            }
        }
    }
    // sort descending by filename (timestamp)
    entries.sort();
    entries.reverse();
    Ok(entries)
}

pub fn list_versions() -> anyhow::Result<Vec<PathBuf>> {
    list_versions_in(&autosave_dir())
}
