use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::graph_utils::graph::{format_number, Node, PropertyValue};

/// Display fields always offered first, in this order, when present.
pub const PREFERRED_COLUMNS: &[&str] = &["name", "type", "key", "label", "description"];

/// Normalized value of a single table cell, used for filtering and facets.
///
/// Missing properties and explicit nulls collapse into `Empty`, which sorts
/// after every other value.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum CellValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    fn rank(&self) -> u8 {
        match self {
            CellValue::Bool(_) => 0,
            CellValue::Number(_) => 1,
            CellValue::Text(_) => 2,
            CellValue::Empty => 3,
        }
    }

    pub fn is_empty(&self) -> bool { matches!(self, CellValue::Empty) }

    pub fn display(&self) -> String {
        match self {
            CellValue::Bool(b) => b.to_string(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
            CellValue::Empty => "(empty)".to_string(),
        }
    }
}

impl From<&PropertyValue> for CellValue {
    fn from(v: &PropertyValue) -> Self {
        match v {
            PropertyValue::Null => CellValue::Empty,
            PropertyValue::Bool(b) => CellValue::Bool(*b),
            PropertyValue::Number(n) if n.is_nan() => CellValue::Empty,
            PropertyValue::Number(n) => CellValue::Number(*n),
            PropertyValue::String(s) | PropertyValue::Nested(s) => CellValue::Text(s.clone()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self { CellValue::Text(s.to_string()) }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self { CellValue::Number(n) }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self { CellValue::Number(n as f64) }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self { CellValue::Bool(b) }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            (CellValue::Number(a), CellValue::Number(b)) => a.total_cmp(b),
            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal }
}

impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            CellValue::Bool(b) => b.hash(state),
            // -0.0 and 0.0 compare unequal under total_cmp, so hashing raw bits is consistent
            CellValue::Number(n) => n.to_bits().hash(state),
            CellValue::Text(s) => s.hash(state),
            CellValue::Empty => {}
        }
    }
}

/// Look up the cell for `column` on `node`. Top-level fields shadow properties of the same name.
pub fn cell_value(node: &Node, column: &str) -> CellValue {
    match column {
        "key" => CellValue::Text(node.key.clone()),
        "name" => CellValue::Text(node.name.clone()),
        "type" => CellValue::Text(node.node_type.clone()),
        _ => node
            .properties
            .get(column)
            .map(CellValue::from)
            .unwrap_or(CellValue::Empty),
    }
}

/// Display text for a cell; empty cells render as an empty string.
pub fn cell_text(node: &Node, column: &str) -> String {
    match cell_value(node, column) {
        CellValue::Empty => String::new(),
        v => v.display(),
    }
}

/// Ordered display columns for a node set: preferred fields first, the rest alphabetical.
pub fn project_columns(nodes: &[Node]) -> Vec<String> {
    if nodes.is_empty() {
        return Vec::new();
    }
    let mut present: BTreeSet<&str> = ["key", "name", "type"].into_iter().collect();
    for n in nodes {
        present.extend(n.properties.keys().map(String::as_str));
    }

    let mut out: Vec<String> = PREFERRED_COLUMNS
        .iter()
        .filter(|c| present.contains(*c))
        .map(|c| c.to_string())
        .collect();
    out.extend(
        present
            .into_iter()
            .filter(|c| !PREFERRED_COLUMNS.contains(c))
            .map(str::to_string),
    );
    out
}
