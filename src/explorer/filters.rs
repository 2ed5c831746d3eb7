use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::num::NonZeroUsize;

use lru::LruCache;

use serde::{Deserialize, Serialize};

use super::columns::{cell_value, CellValue};
use crate::graph_utils::graph::Node;

/// Stable identity of a panel, independent of its position in the panel list.
pub type PanelId = u64;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterMode {
    #[default]
    Include,
    Exclude,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnFilter {
    pub mode: FilterMode,
    pub selected_values: BTreeSet<CellValue>,
}

impl ColumnFilter {
    pub fn new(mode: FilterMode, values: impl IntoIterator<Item = CellValue>) -> Self {
        ColumnFilter { mode, selected_values: values.into_iter().collect() }
    }

    pub fn include(values: impl IntoIterator<Item = CellValue>) -> Self {
        Self::new(FilterMode::Include, values)
    }

    pub fn exclude(values: impl IntoIterator<Item = CellValue>) -> Self {
        Self::new(FilterMode::Exclude, values)
    }

    /// An empty value set restricts nothing regardless of mode.
    pub fn is_active(&self) -> bool { !self.selected_values.is_empty() }

    pub fn passes(&self, value: &CellValue) -> bool {
        let hit = self.selected_values.contains(value);
        match self.mode {
            FilterMode::Include => hit,
            FilterMode::Exclude => !hit,
        }
    }
}

type Signature = Vec<(String, FilterMode, Vec<CellValue>)>;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum CacheKey {
    Rows { panel: PanelId, revision: u64, signature: Signature },
    Unique { panel: PanelId, revision: u64, column: String, signature: Signature },
}

impl CacheKey {
    fn panel(&self) -> PanelId {
        match self {
            CacheKey::Rows { panel, .. } | CacheKey::Unique { panel, .. } => *panel,
        }
    }
}

#[derive(Clone, Debug)]
enum CacheEntry {
    Rows(Vec<usize>),
    Unique(Vec<CellValue>),
}

/// Bounded memo of filter results. Lookups do not refresh recency, so the
/// oldest inserted entry is the one evicted once full.
#[derive(Debug)]
pub struct FilterCache {
    entries: LruCache<CacheKey, CacheEntry>,
}

impl FilterCache {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        FilterCache { entries: LruCache::new(cap) }
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
    pub fn capacity(&self) -> usize { self.entries.cap().get() }

    fn get(&self, key: &CacheKey) -> Option<&CacheEntry> { self.entries.peek(key) }

    fn insert(&mut self, key: CacheKey, entry: CacheEntry) {
        let refresh = self.entries.contains(&key);
        if let Some((evicted, _)) = self.entries.push(key, entry)
            && !refresh
        {
            log::trace!("filter cache full, evicted entry for panel {}", evicted.panel());
        }
    }

    fn invalidate_where(&mut self, mut stale: impl FnMut(PanelId) -> bool) {
        let keys: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(k, _)| stale(k.panel()))
            .map(|(k, _)| k.clone())
            .collect();
        for k in keys {
            self.entries.pop(&k);
        }
    }

    pub fn invalidate_panel(&mut self, panel: PanelId) {
        self.invalidate_where(|p| p == panel);
    }

    pub fn clear(&mut self) { self.entries.clear(); }
}

/// Per-panel column filters with progressive (sequential) application.
#[derive(Debug)]
pub struct FilterEngine {
    filters: HashMap<PanelId, BTreeMap<String, ColumnFilter>>,
    cache: FilterCache,
}

impl FilterEngine {
    pub fn new(cache_capacity: usize) -> Self {
        FilterEngine { filters: HashMap::new(), cache: FilterCache::new(cache_capacity) }
    }

    pub fn cache(&self) -> &FilterCache { &self.cache }

    pub fn filters_for(&self, panel: PanelId) -> Option<&BTreeMap<String, ColumnFilter>> {
        self.filters.get(&panel)
    }

    pub fn filter(&self, panel: PanelId, column: &str) -> Option<&ColumnFilter> {
        self.filters.get(&panel).and_then(|f| f.get(column))
    }

    pub fn active_count(&self, panel: PanelId) -> usize {
        self.filters.get(&panel).map(|f| f.len()).unwrap_or(0)
    }

    /// Replace the filter on one column. Inactive filters are removed rather than stored.
    /// Returns whether anything changed.
    pub fn set_filter(&mut self, panel: PanelId, column: &str, filter: ColumnFilter) -> bool {
        let current = self.filter(panel, column);
        let changed = match (current, filter.is_active()) {
            (Some(existing), true) => existing != &filter,
            (Some(_), false) => true,
            (None, active) => active,
        };
        if !changed {
            return false;
        }
        let panel_filters = self.filters.entry(panel).or_default();
        if filter.is_active() {
            panel_filters.insert(column.to_string(), filter);
        } else {
            panel_filters.remove(column);
        }
        if panel_filters.is_empty() {
            self.filters.remove(&panel);
        }
        self.cache.invalidate_panel(panel);
        true
    }

    /// Add or remove one value from a column's selection, creating the filter in `mode` if absent.
    pub fn toggle_value(&mut self, panel: PanelId, column: &str, value: CellValue, mode: FilterMode) -> bool {
        let mut filter = self
            .filter(panel, column)
            .cloned()
            .unwrap_or_else(|| ColumnFilter::new(mode, []));
        if !filter.selected_values.remove(&value) {
            filter.selected_values.insert(value);
        }
        self.set_filter(panel, column, filter)
    }

    pub fn set_mode(&mut self, panel: PanelId, column: &str, mode: FilterMode) -> bool {
        match self.filter(panel, column).cloned() {
            Some(mut f) if f.mode != mode => {
                f.mode = mode;
                self.set_filter(panel, column, f)
            }
            _ => false,
        }
    }

    pub fn clear_column(&mut self, panel: PanelId, column: &str) -> bool {
        self.set_filter(panel, column, ColumnFilter::default())
    }

    pub fn clear_panel(&mut self, panel: PanelId) -> bool {
        self.cache.invalidate_panel(panel);
        self.filters.remove(&panel).is_some()
    }

    /// Drop every filter and cache entry for panels not in `live`.
    pub fn retain_panels(&mut self, live: &BTreeSet<PanelId>) {
        let dead: Vec<PanelId> = self.filters.keys().filter(|p| !live.contains(p)).copied().collect();
        for p in dead {
            self.clear_panel(p);
        }
        self.cache.invalidate_where(|p| !live.contains(&p));
    }

    /// Filtered rows of a panel, in original order.
    pub fn apply_filters<'n>(
        &mut self,
        panel: PanelId,
        revision: u64,
        nodes: &'n [Node],
        columns: &[String],
    ) -> Vec<&'n Node> {
        self.filtered_indices(panel, revision, nodes, columns)
            .into_iter()
            .map(|i| &nodes[i])
            .collect()
    }

    pub fn filtered_indices(&mut self, panel: PanelId, revision: u64, nodes: &[Node], columns: &[String]) -> Vec<usize> {
        self.narrow(panel, revision, nodes, columns, None)
    }

    /// Sorted distinct values of `column` over the rows left by every *other* active filter.
    pub fn unique_values(
        &mut self,
        panel: PanelId,
        revision: u64,
        column: &str,
        nodes: &[Node],
        columns: &[String],
    ) -> Vec<CellValue> {
        let signature = self.signature(panel, columns, Some(column));
        let key = CacheKey::Unique { panel, revision, column: column.to_string(), signature };
        if let Some(CacheEntry::Unique(values)) = self.cache.get(&key) {
            return values.clone();
        }
        let rows = self.narrow(panel, revision, nodes, columns, Some(column));
        let values: Vec<CellValue> = rows
            .into_iter()
            .map(|i| cell_value(&nodes[i], column))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        self.cache.insert(key, CacheEntry::Unique(values.clone()));
        values
    }

    /// Active filters of a panel in column order, optionally leaving one column out.
    fn ordered_filters<'a>(
        &'a self,
        panel: PanelId,
        columns: &'a [String],
        skip: Option<&str>,
    ) -> Vec<(&'a String, &'a ColumnFilter)> {
        let Some(panel_filters) = self.filters.get(&panel) else { return Vec::new() };
        columns
            .iter()
            .filter(|c| Some(c.as_str()) != skip)
            .filter_map(|c| panel_filters.get(c).map(|f| (c, f)))
            .collect()
    }

    fn signature(&self, panel: PanelId, columns: &[String], skip: Option<&str>) -> Signature {
        self.ordered_filters(panel, columns, skip)
            .into_iter()
            .map(|(c, f)| (c.clone(), f.mode, f.selected_values.iter().cloned().collect()))
            .collect()
    }

    // Each step feeds the next; every prefix is cached so editing a later column reuses earlier work.
    fn narrow(&mut self, panel: PanelId, revision: u64, nodes: &[Node], columns: &[String], skip: Option<&str>) -> Vec<usize> {
        let steps = self.signature(panel, columns, skip);
        let mut rows: Vec<usize> = (0..nodes.len()).collect();
        let mut prefix: Signature = Vec::with_capacity(steps.len());
        for step in steps {
            let (column, mode, values) = &step;
            prefix.push(step.clone());
            let key = CacheKey::Rows { panel, revision, signature: prefix.clone() };
            if let Some(CacheEntry::Rows(cached)) = self.cache.get(&key) {
                rows = cached.clone();
                continue;
            }
            let filter = ColumnFilter::new(*mode, values.iter().cloned());
            rows.retain(|&i| filter.passes(&cell_value(&nodes[i], column)));
            self.cache.insert(key, CacheEntry::Rows(rows.clone()));
        }
        rows
    }
}
