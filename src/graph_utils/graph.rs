use std::collections::HashMap;
use std::fmt;
use serde::{Serialize, Deserialize};
use serde_json::Value as JsonValue;

// Basic type aliases for clarity
pub type NodeKey = String;
type Key = String;


/// A single entry in a node's property bag.
///
/// Host data is arbitrary JSON; scalars keep their kind, anything nested
/// (arrays, objects) is kept as its serialized JSON text and is displayed
/// and filtered in that form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "JsonValue", into = "JsonValue")]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Nested(String),
}

impl PropertyValue {
    pub fn is_null(&self) -> bool { matches!(self, PropertyValue::Null) }

    /// Display form used for table cells and search highlighting.
    pub fn display(&self) -> String {
        match self {
            PropertyValue::Null => String::new(),
            PropertyValue::Bool(b) => b.to_string(),
            PropertyValue::Number(n) => format_number(*n),
            PropertyValue::String(s) | PropertyValue::Nested(s) => s.clone(),
        }
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<JsonValue> for PropertyValue {
    fn from(v: JsonValue) -> Self {
        match v {
            JsonValue::Null => PropertyValue::Null,
            JsonValue::Bool(b) => PropertyValue::Bool(b),
            JsonValue::Number(n) => match n.as_f64() {
                Some(f) => PropertyValue::Number(f),
                None => PropertyValue::String(n.to_string()),
            },
            JsonValue::String(s) => PropertyValue::String(s),
            nested @ (JsonValue::Array(_) | JsonValue::Object(_)) => {
                PropertyValue::Nested(nested.to_string())
            }
        }
    }
}

impl From<PropertyValue> for JsonValue {
    fn from(v: PropertyValue) -> Self {
        match v {
            PropertyValue::Null => JsonValue::Null,
            PropertyValue::Bool(b) => JsonValue::Bool(b),
            PropertyValue::Number(n) => serde_json::Number::from_f64(n)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            PropertyValue::String(s) => JsonValue::String(s),
            // Re-inflate nested structures so round trips through the host keep their shape
            PropertyValue::Nested(s) => serde_json::from_str(&s).unwrap_or(JsonValue::String(s)),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self { PropertyValue::String(s.to_string()) }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self { PropertyValue::String(s) }
}

impl From<f64> for PropertyValue {
    fn from(n: f64) -> Self { PropertyValue::Number(n) }
}

impl From<i64> for PropertyValue {
    fn from(n: i64) -> Self { PropertyValue::Number(n as f64) }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self { PropertyValue::Bool(b) }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}


#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub key: NodeKey,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(default)]
    pub properties: HashMap<Key, PropertyValue>,
}

impl Node {
    pub fn new(key: impl Into<String>, name: impl Into<String>, node_type: impl Into<String>) -> Self {
        Node {
            key: key.into(),
            name: name.into(),
            node_type: node_type.into(),
            properties: HashMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeKey,
    pub target: NodeKey,
    #[serde(rename = "relationType", alias = "relation_type")]
    pub relation_type: String,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, relation_type: impl Into<String>) -> Self {
        Edge {
            source: source.into(),
            target: target.into(),
            relation_type: relation_type.into(),
        }
    }

    /// The endpoint opposite `key`, if this edge touches it and is not a self-loop.
    fn other_end(&self, key: &str) -> Option<&str> {
        if self.source == self.target {
            return None;
        }
        if self.source == key {
            Some(&self.target)
        } else if self.target == key {
            Some(&self.source)
        } else {
            None
        }
    }
}

/// Neighbors of one node with the relation labels that connect them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Related {
    /// In order of first discovery along the edge list.
    pub neighbors: Vec<Node>,
    pub relation_types: HashMap<NodeKey, Vec<String>>,
}

impl Related {
    pub fn is_empty(&self) -> bool { self.neighbors.is_empty() }
}

/// Immutable snapshot of the host graph. Replaced wholesale on every host update.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(from = "RawGraph", into = "RawGraph")]
pub struct GraphData {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index: HashMap<NodeKey, usize>,
}

#[derive(Serialize, Deserialize)]
struct RawGraph {
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    edges: Vec<Edge>,
}

impl From<RawGraph> for GraphData {
    fn from(raw: RawGraph) -> Self { GraphData::new(raw.nodes, raw.edges) }
}

impl From<GraphData> for RawGraph {
    fn from(g: GraphData) -> Self { RawGraph { nodes: g.nodes, edges: g.edges } }
}

impl GraphData {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, n) in nodes.iter().enumerate() {
            // First record wins if the host sends a duplicate key
            index.entry(n.key.clone()).or_insert(i);
        }
        GraphData { nodes, edges, index }
    }

    pub fn nodes(&self) -> &[Node] { &self.nodes }
    pub fn edges(&self) -> &[Edge] { &self.edges }
    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    pub fn get_node(&self, key: &str) -> Option<&Node> {
        self.index.get(key).map(|&i| &self.nodes[i])
    }

    pub fn related(&self, node_key: &str) -> Related {
        resolve_related(node_key, &self.edges, |k| self.get_node(k))
    }
}

/// Resolve the neighbors of `node_key` over an undirected reading of `edges`.
///
/// Self-loops are skipped and edges whose far end has no node record are
/// dropped silently.
pub fn related(node_key: &str, nodes: &[Node], edges: &[Edge]) -> Related {
    let lookup: HashMap<&str, &Node> = nodes.iter().map(|n| (n.key.as_str(), n)).collect();
    resolve_related(node_key, edges, |k| lookup.get(k).copied())
}

fn resolve_related<'a, F>(node_key: &str, edges: &[Edge], lookup: F) -> Related
where
    F: Fn(&str) -> Option<&'a Node>,
{
    let mut out = Related::default();
    for edge in edges {
        let Some(other) = edge.other_end(node_key) else { continue };
        let Some(node) = lookup(other) else {
            log::trace!("skipping dangling edge {} -> {}", edge.source, edge.target);
            continue;
        };
        match out.relation_types.get_mut(other) {
            Some(labels) => {
                if !labels.iter().any(|l| l == &edge.relation_type) {
                    labels.push(edge.relation_type.clone());
                }
            }
            None => {
                out.relation_types.insert(other.to_string(), vec![edge.relation_type.clone()]);
                out.neighbors.push(node.clone());
            }
        }
    }
    out
}
