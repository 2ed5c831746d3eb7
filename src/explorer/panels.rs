use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::columns::project_columns;
use super::filters::PanelId;
use crate::graph_utils::graph::{Node, NodeKey, Related};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PanelKind {
    Root,
    Expansion,
    Result,
}

/// One hop of an expansion chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreadcrumbEntry {
    pub key: NodeKey,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
}

impl From<&Node> for BreadcrumbEntry {
    fn from(n: &Node) -> Self {
        BreadcrumbEntry { key: n.key.clone(), name: n.name.clone(), node_type: n.node_type.clone() }
    }
}

/// A table over a node subset.
#[derive(Clone, Debug)]
pub struct Panel {
    pub(crate) id: PanelId,
    pub(crate) kind: PanelKind,
    pub(crate) nodes: Vec<Node>,
    pub(crate) columns: Vec<String>,
    /// Bumped whenever `nodes` is swapped so cached filter results go stale.
    pub(crate) revision: u64,
    pub(crate) parent_panel: Option<PanelId>,
    pub(crate) parent_row_key: Option<NodeKey>,
    pub(crate) relation_types: HashMap<NodeKey, Vec<String>>,
    pub(crate) breadcrumb: Vec<BreadcrumbEntry>,
}

impl Panel {
    pub(crate) fn root(id: PanelId, nodes: Vec<Node>) -> Self {
        Panel {
            id,
            kind: PanelKind::Root,
            columns: project_columns(&nodes),
            nodes,
            revision: 0,
            parent_panel: None,
            parent_row_key: None,
            relation_types: HashMap::new(),
            breadcrumb: Vec::new(),
        }
    }

    pub(crate) fn result(id: PanelId, nodes: Vec<Node>) -> Self {
        Panel { kind: PanelKind::Result, ..Panel::root(id, nodes) }
    }

    pub(crate) fn expansion(
        id: PanelId,
        parent: Option<PanelId>,
        row: &Node,
        related: Related,
        breadcrumb: Vec<BreadcrumbEntry>,
    ) -> Self {
        Panel {
            id,
            kind: PanelKind::Expansion,
            columns: project_columns(&related.neighbors),
            nodes: related.neighbors,
            revision: 0,
            parent_panel: parent,
            parent_row_key: Some(row.key.clone()),
            relation_types: related.relation_types,
            breadcrumb,
        }
    }

    pub fn id(&self) -> PanelId { self.id }
    pub fn kind(&self) -> PanelKind { self.kind }
    pub fn nodes(&self) -> &[Node] { &self.nodes }
    pub fn columns(&self) -> &[String] { &self.columns }
    pub fn revision(&self) -> u64 { self.revision }
    pub fn parent_row_key(&self) -> Option<&str> { self.parent_row_key.as_deref() }
    pub fn relation_types(&self) -> &HashMap<NodeKey, Vec<String>> { &self.relation_types }
    pub fn breadcrumb(&self) -> &[BreadcrumbEntry] { &self.breadcrumb }

    pub fn breadcrumb_keys(&self) -> Vec<NodeKey> {
        self.breadcrumb.iter().map(|b| b.key.clone()).collect()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.nodes.iter().any(|n| n.key == key)
    }

    pub fn node(&self, key: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.key == key)
    }

    /// Swap in a new node list without changing the panel's identity.
    pub(crate) fn replace_nodes(&mut self, nodes: Vec<Node>) {
        self.columns = project_columns(&nodes);
        self.nodes = nodes;
        self.revision += 1;
    }
}

/// Sorted key set used to decide whether a host update changed membership.
pub fn key_signature(nodes: &[Node]) -> BTreeSet<&str> {
    nodes.iter().map(|n| n.key.as_str()).collect()
}

/// Breadcrumb for a panel expanded from `row` inside `parent`.
///
/// Rows of the Root (or Result) panel start a fresh trail.
pub fn extend_breadcrumb(parent: &Panel, row: &Node) -> Vec<BreadcrumbEntry> {
    let mut trail = match parent.kind {
        PanelKind::Expansion => parent.breadcrumb.clone(),
        PanelKind::Root | PanelKind::Result => Vec::new(),
    };
    trail.push(BreadcrumbEntry::from(row));
    trail
}

/// Ordered panel list: Root at index 0, expansions after it, the optional Result panel last.
#[derive(Clone, Debug, Default)]
pub struct PanelStack {
    panels: Vec<Panel>,
    result: Option<Panel>,
    next_id: PanelId,
}

impl PanelStack {
    pub fn new() -> Self { Self::default() }

    pub(crate) fn alloc_id(&mut self) -> PanelId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn len(&self) -> usize { self.panels.len() + usize::from(self.result.is_some()) }
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn get(&self, index: usize) -> Option<&Panel> {
        if index < self.panels.len() {
            self.panels.get(index)
        } else if index == self.panels.len() {
            self.result.as_ref()
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Panel> {
        self.panels.iter().chain(self.result.iter())
    }

    pub fn root(&self) -> Option<&Panel> { self.panels.first() }

    pub(crate) fn root_mut(&mut self) -> Option<&mut Panel> { self.panels.first_mut() }

    pub fn result(&self) -> Option<&Panel> { self.result.as_ref() }

    pub fn result_index(&self) -> Option<usize> {
        self.result.as_ref().map(|_| self.panels.len())
    }

    pub fn index_of(&self, id: PanelId) -> Option<usize> {
        self.iter().position(|p| p.id == id)
    }

    pub fn by_id(&self, id: PanelId) -> Option<&Panel> {
        self.iter().find(|p| p.id == id)
    }

    /// Index of a panel's parent, `None` for Root/Result and for orphans.
    pub fn parent_index(&self, panel: &Panel) -> Option<usize> {
        panel.parent_panel.and_then(|id| self.index_of(id))
    }

    pub fn ids(&self) -> BTreeSet<PanelId> {
        self.iter().map(|p| p.id).collect()
    }

    pub(crate) fn set_root(&mut self, root: Panel) {
        self.panels.clear();
        self.panels.push(root);
    }

    /// Whether an Expansion for `(parent, row_key)` is already open.
    pub fn has_expansion(&self, parent: Option<PanelId>, row_key: &str) -> bool {
        self.panels.iter().any(|p| {
            p.kind == PanelKind::Expansion && p.parent_panel == parent && p.parent_row_key.as_deref() == Some(row_key)
        })
    }

    /// Keep panels `0..=index` of the main list; the Result panel is untouched.
    pub(crate) fn truncate_after(&mut self, index: usize) {
        self.panels.truncate(index + 1);
    }

    /// Insert before the Result panel. Returns the new panel's index.
    pub(crate) fn push(&mut self, panel: Panel) -> usize {
        self.panels.push(panel);
        self.panels.len() - 1
    }

    pub(crate) fn remove(&mut self, index: usize) -> Option<Panel> {
        if index < self.panels.len() {
            Some(self.panels.remove(index))
        } else if index == self.panels.len() {
            self.result.take()
        } else {
            None
        }
    }

    pub(crate) fn retain_expansions<F: FnMut(&Panel) -> bool>(&mut self, mut keep: F) {
        self.panels.retain(|p| p.kind != PanelKind::Expansion || keep(p));
    }

    pub(crate) fn set_result(&mut self, result: Option<Panel>) {
        self.result = result;
    }

    pub(crate) fn result_mut(&mut self) -> Option<&mut Panel> { self.result.as_mut() }

    pub(crate) fn panel_mut(&mut self, index: usize) -> Option<&mut Panel> {
        if index < self.panels.len() {
            self.panels.get_mut(index)
        } else if index == self.panels.len() {
            self.result.as_mut()
        } else {
            None
        }
    }
}
