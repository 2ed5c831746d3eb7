use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::columns::CellValue;
use super::filters::{ColumnFilter, FilterEngine, FilterMode, PanelId};
use super::pagination::{PageInfo, PaginationState};
use super::panels::{extend_breadcrumb, key_signature, BreadcrumbEntry, Panel, PanelKind, PanelStack};
use super::search::{highlight_segments, TextSegment};
use super::selection::SelectionState;
use crate::graph_utils::graph::{GraphData, Node, NodeKey};
use crate::persistence::persist::{Checkpointer, PersistedState};
use crate::persistence::settings::ExplorerSettings;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulkOperation {
    Merge,
    Delete,
    Edit,
    Add,
}

impl BulkOperation {
    fn min_nodes(self) -> usize {
        match self {
            BulkOperation::Merge => 2,
            BulkOperation::Delete | BulkOperation::Edit => 1,
            BulkOperation::Add => 0,
        }
    }
}

/// Everything the host or the user can do to the explorer.
///
/// Panel references are positional indices as the host currently sees them.
/// An index that no longer exists turns the action into a no-op.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Action {
    SetGraph(GraphData),
    SetResultNodes(Option<Vec<Node>>),
    Expand { panel: usize, row: NodeKey, multi_select: bool },
    Collapse { panel: usize },
    SetFilter { panel: usize, column: String, filter: ColumnFilter },
    ToggleFilterValue { panel: usize, column: String, value: CellValue, mode: FilterMode },
    SetFilterMode { panel: usize, column: String, mode: FilterMode },
    ClearFilter { panel: usize, column: String },
    ClearPanelFilters { panel: usize },
    OpenFilterMenu { panel: usize, column: String },
    CloseFilterMenu,
    SetPageSize { panel: usize, page_size: usize },
    SetPage { panel: usize, page: usize },
    SetViewAll { panel: usize, view_all: bool },
    ClickRow { panel: usize, row: NodeKey },
    ToggleCheckbox { row: NodeKey },
    ToggleAllCheckboxes { panel: usize },
    ClearCheckboxes,
    TogglePanelSelection { panel: usize },
    ClickBreadcrumb { panel: usize, segment: Option<usize> },
    SetSearchTerms(Vec<String>),
    QueryRow { panel: usize, row: NodeKey },
    QueryPanel { panel: usize },
    QuerySelectedPanels,
    RequestBulkOperation(BulkOperation),
    Tick,
}

/// Notifications for the host, returned from every transition.
#[derive(Clone, Debug, PartialEq)]
pub enum ExplorerEvent {
    SelectionChanged(BTreeSet<NodeKey>),
    CheckboxSelectionChanged(BTreeSet<NodeKey>),
    BulkOperationRequested { kind: BulkOperation, nodes: Vec<Node> },
    QueryNodes(Vec<Node>),
    /// A panel was just opened; hosts may scroll it into view.
    PanelCreated { index: usize },
}

/// Render-ready slice of one panel after filtering and paging.
#[derive(Clone, Debug)]
pub struct PanelView {
    pub index: usize,
    pub kind: PanelKind,
    pub columns: Vec<String>,
    pub rows: Vec<Node>,
    pub page: PageInfo,
    pub unfiltered_rows: usize,
    pub active_filters: usize,
    pub parent_panel_index: Option<usize>,
    pub parent_row_key: Option<NodeKey>,
    pub relation_types: HashMap<NodeKey, Vec<String>>,
    pub breadcrumb: Vec<BreadcrumbEntry>,
    pub selected: bool,
}

/// Linked-table explorer state: panels, filters, paging and selection in one reducer.
#[derive(Debug)]
pub struct Explorer {
    pub(crate) graph: GraphData,
    pub(crate) stack: PanelStack,
    pub(crate) filters: FilterEngine,
    pub(crate) pagination: HashMap<PanelId, PaginationState>,
    pub(crate) selection: SelectionState,
    pub(crate) open_filter: Option<(PanelId, String)>,
    pub(crate) session_id: Uuid,
    search_terms: Vec<String>,
    default_page_size: usize,
    preserve_expansions_on_resync: bool,
    checkpointer: Checkpointer,
    torn_down: bool,
}

impl Default for Explorer {
    fn default() -> Self { Explorer::new(&ExplorerSettings::default()) }
}

impl Explorer {
    pub fn new(settings: &ExplorerSettings) -> Self {
        let mut stack = PanelStack::new();
        let root = Panel::root(stack.alloc_id(), Vec::new());
        stack.set_root(root);
        Explorer {
            graph: GraphData::default(),
            stack,
            filters: FilterEngine::new(settings.filter_cache_capacity),
            pagination: HashMap::new(),
            selection: SelectionState::new(Duration::from_millis(settings.highlight_duration_ms)),
            open_filter: None,
            session_id: Uuid::now_v7(),
            search_terms: Vec::new(),
            default_page_size: settings.default_page_size.max(1),
            preserve_expansions_on_resync: settings.preserve_expansions_on_resync,
            checkpointer: Checkpointer::new(Duration::from_millis(settings.checkpoint_debounce_ms)),
            torn_down: false,
        }
    }

    pub fn with_graph(settings: &ExplorerSettings, graph: GraphData) -> Self {
        let mut e = Explorer::new(settings);
        e.resync(graph);
        e
    }

    /// Build an explorer and restore a previously checkpointed blob on top of `graph`.
    ///
    /// Missing or malformed parts of the blob fall back to their defaults.
    pub fn restore(
        settings: &ExplorerSettings,
        graph: GraphData,
        result_nodes: Option<Vec<Node>>,
        persisted: Option<&serde_json::Value>,
    ) -> Self {
        let mut e = Explorer::with_graph(settings, graph);
        if let Some(blob) = persisted {
            PersistedState::from_value(blob).apply_to(&mut e);
        }
        e.upsert_result(result_nodes);
        e
    }

    // ---- accessors -------------------------------------------------------

    pub fn graph(&self) -> &GraphData { &self.graph }
    pub fn panels(&self) -> &PanelStack { &self.stack }
    pub fn panel_count(&self) -> usize { self.stack.len() }
    pub fn panel(&self, index: usize) -> Option<&Panel> { self.stack.get(index) }
    pub fn filter_engine(&self) -> &FilterEngine { &self.filters }
    pub fn selection(&self) -> &SelectionState { &self.selection }
    pub fn search_terms(&self) -> &[String] { &self.search_terms }
    pub fn is_torn_down(&self) -> bool { self.torn_down }
    pub fn session_id(&self) -> Uuid { self.session_id }

    pub fn selected_panel_indices(&self) -> BTreeSet<usize> {
        self.selection
            .selected_panels
            .iter()
            .filter_map(|id| self.stack.index_of(*id))
            .collect()
    }

    pub fn open_filter_menu(&self) -> Option<(usize, &str)> {
        let (id, column) = self.open_filter.as_ref()?;
        Some((self.stack.index_of(*id)?, column.as_str()))
    }

    pub fn column_filter(&self, panel: usize, column: &str) -> Option<&ColumnFilter> {
        let id = self.stack.get(panel)?.id;
        self.filters.filter(id, column)
    }

    pub fn pagination(&self, panel: usize) -> Option<PaginationState> {
        let id = self.stack.get(panel)?.id;
        Some(self.pagination_for(id))
    }

    pub fn highlighted_keys(&self, now: Instant) -> BTreeSet<NodeKey> {
        self.selection.highlighted_keys(now)
    }

    /// Split rendered cell text by the current search terms.
    pub fn highlight_cell<'a>(&self, text: &'a str) -> Vec<TextSegment<'a>> {
        highlight_segments(text, &self.search_terms)
    }

    fn pagination_for(&self, id: PanelId) -> PaginationState {
        self.pagination
            .get(&id)
            .copied()
            .unwrap_or_else(|| PaginationState::with_page_size(self.default_page_size))
    }

    // ---- derived views ---------------------------------------------------

    fn filtered_indices(&mut self, index: usize) -> Option<Vec<usize>> {
        let panel = self.stack.get(index)?;
        Some(self.filters.filtered_indices(panel.id, panel.revision, &panel.nodes, &panel.columns))
    }

    /// All rows of a panel surviving its filters, ignoring pagination.
    pub fn filtered_rows(&mut self, index: usize) -> Vec<Node> {
        let Some(panel) = self.stack.get(index) else { return Vec::new() };
        self.filters
            .apply_filters(panel.id, panel.revision, &panel.nodes, &panel.columns)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Facet values for a column's filter menu, narrowed by the panel's other filters.
    pub fn unique_values(&mut self, index: usize, column: &str) -> Vec<CellValue> {
        let Some(panel) = self.stack.get(index) else { return Vec::new() };
        self.filters.unique_values(panel.id, panel.revision, column, &panel.nodes, &panel.columns)
    }

    pub fn view(&mut self, index: usize) -> Option<PanelView> {
        let rows = self.filtered_indices(index)?;
        let panel = self.stack.get(index)?;
        let id = panel.id;
        // Transitions keep the stored page in range; this only guards the slice.
        let mut paging = self.pagination_for(id);
        paging.clamp(rows.len());
        let range = paging.page_range(rows.len());
        Some(PanelView {
            index,
            kind: panel.kind,
            columns: panel.columns.clone(),
            rows: rows[range].iter().map(|&i| panel.nodes[i].clone()).collect(),
            page: paging.info(rows.len()),
            unfiltered_rows: panel.nodes.len(),
            active_filters: self.filters.active_count(id),
            parent_panel_index: self.stack.parent_index(panel),
            parent_row_key: panel.parent_row_key.clone(),
            relation_types: panel.relation_types.clone(),
            breadcrumb: panel.breadcrumb.clone(),
            selected: self.selection.selected_panels.contains(&id),
        })
    }

    pub fn views(&mut self) -> Vec<PanelView> {
        (0..self.stack.len()).filter_map(|i| self.view(i)).collect()
    }

    // ---- transitions -----------------------------------------------------

    pub fn apply(&mut self, action: Action) -> Vec<ExplorerEvent> {
        self.apply_at(action, Instant::now())
    }

    /// Apply one action as of `now`. Each call is a complete, atomic transition.
    pub fn apply_at(&mut self, action: Action, now: Instant) -> Vec<ExplorerEvent> {
        if self.torn_down {
            log::debug!("explorer torn down, ignoring {}", action_name(&action));
            return Vec::new();
        }
        let mut events = Vec::new();
        let persisted_change = match action {
            Action::SetGraph(graph) => self.resync(graph),
            Action::SetResultNodes(nodes) => self.upsert_result(nodes),
            Action::Expand { panel, row, multi_select } => self.expand(panel, &row, multi_select, &mut events),
            Action::Collapse { panel } => self.collapse(panel),
            Action::SetFilter { panel, column, filter } => {
                self.edit_filter(panel, |f, id| f.set_filter(id, &column, filter))
            }
            Action::ToggleFilterValue { panel, column, value, mode } => {
                self.edit_filter(panel, |f, id| f.toggle_value(id, &column, value, mode))
            }
            Action::SetFilterMode { panel, column, mode } => {
                self.edit_filter(panel, |f, id| f.set_mode(id, &column, mode))
            }
            Action::ClearFilter { panel, column } => self.edit_filter(panel, |f, id| f.clear_column(id, &column)),
            Action::ClearPanelFilters { panel } => self.edit_filter(panel, |f, id| f.clear_panel(id)),
            Action::OpenFilterMenu { panel, column } => {
                match self.stack.get(panel) {
                    Some(p) => self.open_filter = Some((p.id, column)),
                    None => log::warn!("open filter menu: no panel at index {}", panel),
                }
                false
            }
            Action::CloseFilterMenu => {
                self.open_filter = None;
                false
            }
            Action::SetPageSize { panel, page_size } => self.edit_paging(panel, |p, _| p.set_page_size(page_size)),
            Action::SetPage { panel, page } => self.edit_paging(panel, |p, total| p.set_page(page, total)),
            Action::SetViewAll { panel, view_all } => self.edit_paging(panel, |p, _| p.view_all = view_all),
            Action::ClickRow { panel, row } => {
                self.click_row(panel, &row, &mut events);
                false
            }
            Action::ToggleCheckbox { row } => {
                self.selection.toggle_checkbox(&row);
                events.push(ExplorerEvent::CheckboxSelectionChanged(self.selection.checkbox_selected_keys.clone()));
                false
            }
            Action::ToggleAllCheckboxes { panel } => {
                if let Some(view) = self.view(panel) {
                    let keys: Vec<NodeKey> = view.rows.into_iter().map(|n| n.key).collect();
                    if self.selection.toggle_all_checkboxes(&keys) {
                        events.push(ExplorerEvent::CheckboxSelectionChanged(
                            self.selection.checkbox_selected_keys.clone(),
                        ));
                    }
                }
                false
            }
            Action::ClearCheckboxes => {
                if self.selection.clear_checkboxes() {
                    events.push(ExplorerEvent::CheckboxSelectionChanged(BTreeSet::new()));
                }
                false
            }
            Action::TogglePanelSelection { panel } => self.toggle_panel_selection(panel),
            Action::ClickBreadcrumb { panel, segment } => {
                self.click_breadcrumb(panel, segment, now);
                false
            }
            Action::SetSearchTerms(terms) => {
                self.search_terms = terms;
                false
            }
            Action::QueryRow { panel, row } => {
                if let Some(node) = self.stack.get(panel).and_then(|p| p.node(&row)) {
                    events.push(ExplorerEvent::QueryNodes(vec![node.clone()]));
                }
                false
            }
            Action::QueryPanel { panel } => {
                self.emit_query(&[panel], &mut events);
                false
            }
            Action::QuerySelectedPanels => {
                let indices: Vec<usize> = self.selected_panel_indices().into_iter().collect();
                self.emit_query(&indices, &mut events);
                false
            }
            Action::RequestBulkOperation(kind) => {
                self.request_bulk(kind, &mut events);
                false
            }
            Action::Tick => {
                if self.selection.expire_highlight(now) {
                    log::trace!("transient highlight expired");
                }
                false
            }
        };
        if persisted_change {
            self.checkpointer.mark_dirty(now);
        }
        events
    }

    /// Stop emitting notifications and checkpoints; the host is unmounting.
    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.checkpointer.cancel();
    }

    /// Serialized state for the host once the debounce window has gone quiet.
    ///
    /// The snapshot is taken at fire time, so it always reflects the latest committed state.
    pub fn poll_state_change(&mut self, now: Instant) -> Option<PersistedState> {
        if self.torn_down || !self.checkpointer.take_due(now) {
            return None;
        }
        Some(PersistedState::from_explorer(self))
    }

    /// Emit any pending state change immediately.
    pub fn flush_state_change(&mut self) -> Option<PersistedState> {
        if self.torn_down || !self.checkpointer.take_pending() {
            return None;
        }
        Some(PersistedState::from_explorer(self))
    }

    pub fn snapshot(&self) -> PersistedState {
        PersistedState::from_explorer(self)
    }

    // Drop per-panel state for panels that no longer exist.
    fn prune(&mut self) {
        let live = self.stack.ids();
        self.filters.retain_panels(&live);
        self.pagination.retain(|id, _| live.contains(id));
        self.selection.retain_panels(&live);
        if let Some((id, _)) = &self.open_filter
            && !live.contains(id)
        {
            self.open_filter = None;
        }
    }

    pub(crate) fn resync(&mut self, graph: GraphData) -> bool {
        let changed = self.resync_panels(graph);
        if changed {
            self.clamp_pages();
        }
        changed
    }

    fn resync_panels(&mut self, graph: GraphData) -> bool {
        let nodes = graph.nodes().to_vec();
        let same_keys = self
            .stack
            .root()
            .map(|root| key_signature(&root.nodes) == key_signature(&nodes))
            .unwrap_or(false);
        self.graph = graph;

        if self.stack.root().is_none() {
            let root = Panel::root(self.stack.alloc_id(), nodes);
            self.stack.set_root(root);
            self.prune();
            return true;
        }
        if same_keys {
            log::debug!("resync: key set unchanged, refreshing root rows in place");
            if let Some(root) = self.stack.root_mut() {
                root.replace_nodes(nodes);
            }
            return true;
        }

        log::debug!("resync: key set changed ({} nodes), resetting downstream panels", nodes.len());
        let present: HashSet<NodeKey> = nodes.iter().map(|n| n.key.clone()).collect();
        if let Some(root) = self.stack.root_mut() {
            root.replace_nodes(nodes);
        }
        self.stack.set_result(None);
        if self.preserve_expansions_on_resync {
            let graph = &self.graph;
            let mut refreshed: HashMap<PanelId, (Vec<Node>, HashMap<NodeKey, Vec<String>>)> = HashMap::new();
            self.stack.retain_expansions(|p| {
                let Some(key) = p.parent_row_key.as_deref() else { return false };
                if !present.contains(key) {
                    return false;
                }
                let related = graph.related(key);
                if related.is_empty() {
                    return false;
                }
                refreshed.insert(p.id, (related.neighbors, related.relation_types));
                true
            });
            for (id, (neighbors, relation_types)) in refreshed {
                if let Some(index) = self.stack.index_of(id)
                    && let Some(panel) = self.stack.panel_mut(index)
                {
                    panel.replace_nodes(neighbors);
                    panel.relation_types = relation_types;
                }
            }
        } else {
            self.stack.retain_expansions(|_| false);
        }
        self.prune();
        true
    }

    pub(crate) fn upsert_result(&mut self, nodes: Option<Vec<Node>>) -> bool {
        match nodes.filter(|n| !n.is_empty()) {
            Some(nodes) => {
                if let Some(result) = self.stack.result_mut() {
                    result.replace_nodes(nodes);
                } else {
                    let panel = Panel::result(self.stack.alloc_id(), nodes);
                    self.stack.set_result(Some(panel));
                }
                if let Some(index) = self.stack.result_index() {
                    self.clamp_page(index);
                }
                true
            }
            None => {
                if self.stack.result().is_none() {
                    return false;
                }
                self.stack.set_result(None);
                self.prune();
                true
            }
        }
    }

    fn expand(&mut self, index: usize, row_key: &str, multi_select: bool, events: &mut Vec<ExplorerEvent>) -> bool {
        let Some(panel) = self.stack.get(index) else {
            log::warn!("expand: no panel at index {}", index);
            return false;
        };
        let Some(row) = panel.node(row_key) else {
            log::warn!("expand: row {} not in panel {}", row_key, index);
            return false;
        };
        let related = self.graph.related(row_key);
        if related.is_empty() {
            log::debug!("expand: {} has no neighbors", row_key);
            return false;
        }
        let breadcrumb = extend_breadcrumb(panel, row);
        let from_result = panel.kind == PanelKind::Result;
        let parent_id = (!from_result).then_some(panel.id);

        if (multi_select || from_result) && self.stack.has_expansion(parent_id, row_key) {
            log::debug!("expand: ({}, {}) already open", index, row_key);
            return false;
        }
        let row = row.clone();
        if !multi_select && !from_result {
            self.stack.truncate_after(index);
        }
        let new_panel = Panel::expansion(self.stack.alloc_id(), parent_id, &row, related, breadcrumb);
        let new_index = self.stack.push(new_panel);
        self.prune();
        log::debug!("expand: opened panel {} from {} in panel {}", new_index, row_key, index);
        events.push(ExplorerEvent::PanelCreated { index: new_index });
        true
    }

    fn collapse(&mut self, index: usize) -> bool {
        let Some(panel) = self.stack.get(index) else {
            log::warn!("collapse: no panel at index {}", index);
            return false;
        };
        if panel.kind == PanelKind::Root {
            self.stack.truncate_after(index);
            self.stack.set_result(None);
        } else {
            self.stack.remove(index);
        }
        self.prune();
        log::debug!("collapse: panel {} closed, {} remain", index, self.stack.len());
        true
    }

    fn edit_filter<F>(&mut self, index: usize, edit: F) -> bool
    where
        F: FnOnce(&mut FilterEngine, PanelId) -> bool,
    {
        let Some(id) = self.stack.get(index).map(|p| p.id) else {
            log::warn!("filter edit: no panel at index {}", index);
            return false;
        };
        if !edit(&mut self.filters, id) {
            return false;
        }
        // Narrowing may leave the current page past the end
        self.clamp_page(index);
        true
    }

    fn clamp_page(&mut self, index: usize) {
        let Some(total) = self.filtered_indices(index).map(|r| r.len()) else { return };
        let Some(id) = self.stack.get(index).map(|p| p.id) else { return };
        let mut paging = self.pagination_for(id);
        if paging.clamp(total) {
            log::debug!("panel {} page clamped to {}", index, paging.current_page);
            self.pagination.insert(id, paging);
        }
    }

    pub(crate) fn clamp_pages(&mut self) {
        for index in 0..self.stack.len() {
            self.clamp_page(index);
        }
    }

    fn edit_paging<F>(&mut self, index: usize, edit: F) -> bool
    where
        F: FnOnce(&mut PaginationState, usize),
    {
        let Some(total) = self.filtered_indices(index).map(|r| r.len()) else {
            log::warn!("paging: no panel at index {}", index);
            return false;
        };
        let Some(id) = self.stack.get(index).map(|p| p.id) else { return false };
        let before = self.pagination_for(id);
        let mut after = before;
        edit(&mut after, total);
        if after == before {
            return false;
        }
        self.pagination.insert(id, after);
        true
    }

    fn click_row(&mut self, index: usize, row_key: &str, events: &mut Vec<ExplorerEvent>) {
        let Some(panel) = self.stack.get(index) else {
            log::warn!("row click: no panel at index {}", index);
            return;
        };
        if !panel.contains_key(row_key) {
            return;
        }
        match panel.kind {
            PanelKind::Expansion => self.selection.set_breadcrumb_highlight(panel.breadcrumb_keys()),
            PanelKind::Root => self.selection.clear_breadcrumb_highlight(),
            PanelKind::Result => {}
        }
        self.selection.toggle_row(row_key);
        events.push(ExplorerEvent::SelectionChanged(self.selection.selected_row_keys.clone()));
    }

    fn toggle_panel_selection(&mut self, index: usize) -> bool {
        match self.stack.get(index) {
            Some(p) if p.kind != PanelKind::Result => {
                self.selection.toggle_panel(p.id);
                true
            }
            Some(_) => false,
            None => {
                log::warn!("panel select: no panel at index {}", index);
                false
            }
        }
    }

    fn click_breadcrumb(&mut self, index: usize, segment: Option<usize>, now: Instant) {
        let Some(panel) = self.stack.get(index) else { return };
        let keys = panel.breadcrumb_keys();
        let keys = match segment {
            Some(seg) if seg < keys.len() => keys[..=seg].to_vec(),
            Some(seg) => {
                log::warn!("breadcrumb click: segment {} out of range for panel {}", seg, index);
                return;
            }
            None => keys,
        };
        if keys.is_empty() {
            return;
        }
        self.selection.set_transient_highlight(keys, now);
    }

    /// Rows of the given panels plus their breadcrumb ancestors, first occurrence wins.
    pub fn gather_nodes(&mut self, indices: &[usize]) -> Vec<Node> {
        let mut seen: HashSet<NodeKey> = HashSet::new();
        let mut out = Vec::new();
        for &index in indices {
            let rows = self.filtered_rows(index);
            let Some(panel) = self.stack.get(index) else { continue };
            let ancestors = panel.breadcrumb.iter().filter_map(|b| self.graph.get_node(&b.key).cloned());
            for node in rows.into_iter().chain(ancestors) {
                if seen.insert(node.key.clone()) {
                    out.push(node);
                }
            }
        }
        out
    }

    fn emit_query(&mut self, indices: &[usize], events: &mut Vec<ExplorerEvent>) {
        let nodes = self.gather_nodes(indices);
        if nodes.is_empty() {
            return;
        }
        events.push(ExplorerEvent::QueryNodes(nodes));
    }

    fn resolve_key(&self, key: &str) -> Option<&Node> {
        self.graph.get_node(key).or_else(|| self.stack.iter().find_map(|p| p.node(key)))
    }

    fn request_bulk(&mut self, kind: BulkOperation, events: &mut Vec<ExplorerEvent>) {
        let nodes: Vec<Node> = self
            .selection
            .checkbox_selected_keys
            .iter()
            .filter_map(|k| self.resolve_key(k).cloned())
            .collect();
        if nodes.len() < kind.min_nodes() {
            log::debug!("{:?} needs {} checked rows, have {}", kind, kind.min_nodes(), nodes.len());
            return;
        }
        events.push(ExplorerEvent::BulkOperationRequested { kind, nodes });
    }
}

fn action_name(action: &Action) -> &'static str {
    match action {
        Action::SetGraph(_) => "SetGraph",
        Action::SetResultNodes(_) => "SetResultNodes",
        Action::Expand { .. } => "Expand",
        Action::Collapse { .. } => "Collapse",
        Action::SetFilter { .. } => "SetFilter",
        Action::ToggleFilterValue { .. } => "ToggleFilterValue",
        Action::SetFilterMode { .. } => "SetFilterMode",
        Action::ClearFilter { .. } => "ClearFilter",
        Action::ClearPanelFilters { .. } => "ClearPanelFilters",
        Action::OpenFilterMenu { .. } => "OpenFilterMenu",
        Action::CloseFilterMenu => "CloseFilterMenu",
        Action::SetPageSize { .. } => "SetPageSize",
        Action::SetPage { .. } => "SetPage",
        Action::SetViewAll { .. } => "SetViewAll",
        Action::ClickRow { .. } => "ClickRow",
        Action::ToggleCheckbox { .. } => "ToggleCheckbox",
        Action::ToggleAllCheckboxes { .. } => "ToggleAllCheckboxes",
        Action::ClearCheckboxes => "ClearCheckboxes",
        Action::TogglePanelSelection { .. } => "TogglePanelSelection",
        Action::ClickBreadcrumb { .. } => "ClickBreadcrumb",
        Action::SetSearchTerms(_) => "SetSearchTerms",
        Action::QueryRow { .. } => "QueryRow",
        Action::QueryPanel { .. } => "QueryPanel",
        Action::QuerySelectedPanels => "QuerySelectedPanels",
        Action::RequestBulkOperation(_) => "RequestBulkOperation",
        Action::Tick => "Tick",
    }
}
