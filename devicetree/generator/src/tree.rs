// Licensed under the Apache-2.0 license

//! Device tree input model and the tree reducer.
//!
//! The parser collaborator hands over a [`SourceTree`]: nested nodes with
//! ordered properties and ordered children. [`ReducedTree::reduce`] flattens it
//! into a path-keyed table in pre-order (parent before children), dropping
//! disabled subtrees, and builds the handle, alias and chosen indices that the
//! extractors use to follow references.
//!
//! ```text
//! SourceTree                       ReducedTree
//! "/"                              nodes:   "/" → Node
//! ├── aliases                               "/aliases" → Node
//! ├── chosen                                "/soc" → Node ...
//! └── soc                          handles: 1 → "/soc/rcc@40023800"
//!     ├── rcc@40023800             aliases: "uart-0" → "/soc/uart@40011000"
//!     └── uart@40011000            chosen:  "zephyr,console" → "/soc/uart@40011000"
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::util::{child_path, is_descendant, node_name, parent_path, path_chain};

/// Property holding a node's handle.
pub const HANDLE_PROP: &str = "phandle";
/// Legacy spelling of [`HANDLE_PROP`].
pub const LEGACY_HANDLE_PROP: &str = "linux,phandle";
/// Property holding a node's status.
pub const STATUS_PROP: &str = "status";
/// Status value that removes a node and its whole subtree.
pub const STATUS_DISABLED: &str = "disabled";

const ALIASES_PATH: &str = "/aliases";
const CHOSEN_PATH: &str = "/chosen";

//=============================================================================
// Property values
//=============================================================================

/// A property value, classified once when the tree is built.
///
/// Single-element lists are normalized to scalars, so downstream code never
/// has to guess whether a one-cell property is a list.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "RawPropertyValue")]
pub enum PropertyValue {
    /// A property with no value (a boolean flag).
    Empty,
    /// A single cell.
    Int(u64),
    /// A single string.
    Str(String),
    /// Several cells. Handles appear here as plain cells.
    IntList(Vec<u64>),
    /// Several strings.
    StrList(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPropertyValue {
    Empty,
    Flag(bool),
    Int(u64),
    Str(String),
    IntList(Vec<u64>),
    StrList(Vec<String>),
}

impl From<RawPropertyValue> for PropertyValue {
    fn from(raw: RawPropertyValue) -> Self {
        match raw {
            RawPropertyValue::Empty | RawPropertyValue::Flag(_) => PropertyValue::Empty,
            RawPropertyValue::Int(v) => PropertyValue::Int(v),
            RawPropertyValue::Str(s) => PropertyValue::Str(s),
            RawPropertyValue::IntList(v) => PropertyValue::IntList(v).normalized(),
            RawPropertyValue::StrList(v) => PropertyValue::StrList(v).normalized(),
        }
    }
}

/// Reads a property table, leaving out flags spelled `false`. An absent
/// flag and a `false` one mean the same thing.
fn present_props<'de, D>(
    deserializer: D,
) -> std::result::Result<IndexMap<String, PropertyValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = IndexMap::<String, RawPropertyValue>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter(|(_, value)| !matches!(value, RawPropertyValue::Flag(false)))
        .map(|(name, value)| (name, value.into()))
        .collect())
}

impl PropertyValue {
    /// Collapses empty and single-element lists.
    pub fn normalized(self) -> Self {
        match self {
            PropertyValue::IntList(v) if v.is_empty() => PropertyValue::Empty,
            PropertyValue::IntList(v) if v.len() == 1 => PropertyValue::Int(v[0]),
            PropertyValue::StrList(v) if v.is_empty() => PropertyValue::Empty,
            PropertyValue::StrList(mut v) if v.len() == 1 => PropertyValue::Str(v.remove(0)),
            other => other,
        }
    }

    /// The value as a flat cell list, if it holds integers.
    pub fn cells(&self) -> Option<&[u64]> {
        match self {
            PropertyValue::Int(v) => Some(std::slice::from_ref(v)),
            PropertyValue::IntList(v) => Some(v),
            _ => None,
        }
    }

    /// The value as a single integer.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            PropertyValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as a single string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The value as a string list (a single string counts as one entry).
    pub fn strings(&self) -> Vec<&str> {
        match self {
            PropertyValue::Str(s) => vec![s.as_str()],
            PropertyValue::StrList(v) => v.iter().map(String::as_str).collect(),
            _ => vec![],
        }
    }
}

//=============================================================================
// Source tree (parser output)
//=============================================================================

/// A node as delivered by the tree parser.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SourceNode {
    /// Properties in source order.
    #[serde(default, deserialize_with = "present_props")]
    pub props: IndexMap<String, PropertyValue>,
    /// Children in source order, keyed by node name (`uart@40011000`).
    #[serde(default)]
    pub children: IndexMap<String, SourceNode>,
}

impl SourceNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property.
    pub fn prop(mut self, name: &str, value: PropertyValue) -> Self {
        self.props.insert(name.to_string(), value);
        self
    }

    /// Add a string property.
    pub fn str_prop(self, name: &str, value: &str) -> Self {
        self.prop(name, PropertyValue::Str(value.to_string()))
    }

    /// Add an integer-list property.
    pub fn cells_prop(self, name: &str, cells: &[u64]) -> Self {
        self.prop(name, PropertyValue::IntList(cells.to_vec()))
    }

    /// Add a child node.
    pub fn child(mut self, name: &str, node: SourceNode) -> Self {
        self.children.insert(name.to_string(), node);
        self
    }
}

/// The parser's output: top-level nodes keyed by name. A well-formed tree has
/// exactly one, named `/`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SourceTree {
    pub nodes: IndexMap<String, SourceNode>,
}

impl SourceTree {
    /// Build a tree from its root node.
    pub fn with_root(root: SourceNode) -> Self {
        let mut nodes = IndexMap::new();
        nodes.insert("/".to_string(), root);
        Self { nodes }
    }

    /// Parse the JSON form `{"/": {"props": {...}, "children": {...}}}`.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

//=============================================================================
// Reduced tree
//=============================================================================

/// An enabled node of the reduced tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    /// Absolute path, the node's unique key.
    pub path: String,
    /// Properties in source order.
    pub props: IndexMap<String, PropertyValue>,
}

impl Node {
    pub fn prop(&self, name: &str) -> Option<&PropertyValue> {
        self.props.get(name)
    }

    /// Final path segment.
    pub fn name(&self) -> &str {
        node_name(&self.path)
    }

    /// The canonical (first) compatible identifier.
    pub fn compatible(&self) -> Option<&str> {
        self.prop("compatible")
            .and_then(|v| v.strings().first().copied())
    }

    /// All compatible identifiers, canonical first.
    pub fn compatibles(&self) -> Vec<&str> {
        self.prop("compatible").map(|v| v.strings()).unwrap_or_default()
    }

    /// The node's handle, if it declares one.
    pub fn handle(&self) -> Option<u64> {
        self.prop(HANDLE_PROP)
            .or_else(|| self.prop(LEGACY_HANDLE_PROP))
            .and_then(PropertyValue::as_u64)
    }

    fn is_disabled(props: &IndexMap<String, PropertyValue>) -> bool {
        props.get(STATUS_PROP).and_then(PropertyValue::as_str) == Some(STATUS_DISABLED)
    }
}

/// The flattened tree plus its lookup indices. Read-only after
/// [`ReducedTree::reduce`].
#[derive(Clone, Debug, Default)]
pub struct ReducedTree {
    /// Enabled nodes in pre-order.
    nodes: IndexMap<String, Node>,
    /// Handle → owning path.
    handles: BTreeMap<u64, String>,
    /// Alias name → path.
    aliases: BTreeMap<String, String>,
    /// Chosen selector → path or alias name, as written in the tree.
    chosen: BTreeMap<String, String>,
}

impl ReducedTree {
    /// Flatten `tree`, dropping every disabled node together with its subtree.
    pub fn reduce(tree: &SourceTree) -> Result<Self> {
        let root = tree
            .nodes
            .get("/")
            .ok_or_else(|| Error::MalformedTree("missing root node \"/\"".to_string()))?;
        if Node::is_disabled(&root.props) {
            return Err(Error::MalformedTree("the root node is disabled".to_string()));
        }

        let mut reduced = ReducedTree::default();
        // Explicit stack, children pushed in reverse so pops follow source order.
        let mut stack: Vec<(String, &SourceNode)> = vec![("/".to_string(), root)];
        while let Some((path, source)) = stack.pop() {
            if Node::is_disabled(&source.props) {
                log::debug!("Dropping disabled subtree {path}");
                continue;
            }
            let props = source
                .props
                .iter()
                .map(|(k, v)| (k.clone(), v.clone().normalized()))
                .collect();
            let node = Node {
                path: path.clone(),
                props,
            };
            if let Some(handle) = node.handle() {
                if let Some(first) = reduced.handles.insert(handle, path.clone()) {
                    return Err(Error::DuplicateHandle {
                        handle,
                        first,
                        second: path,
                    });
                }
            }
            for (name, child) in source.children.iter().rev() {
                stack.push((child_path(&path, name), child));
            }
            reduced.nodes.insert(path, node);
        }

        if let Some(aliases) = reduced.nodes.get(ALIASES_PATH) {
            for (name, value) in &aliases.props {
                if let Some(target) = value.as_str() {
                    reduced.aliases.insert(name.clone(), target.to_string());
                }
            }
        }
        if let Some(chosen) = reduced.nodes.get(CHOSEN_PATH) {
            for (key, value) in &chosen.props {
                if let Some(target) = value.as_str() {
                    reduced.chosen.insert(key.clone(), target.to_string());
                }
            }
        }

        log::debug!(
            "Reduced tree: {} nodes, {} handles, {} aliases",
            reduced.nodes.len(),
            reduced.handles.len(),
            reduced.aliases.len()
        );
        Ok(reduced)
    }

    /// The root node.
    pub fn root(&self) -> Option<&Node> {
        self.nodes.get("/")
    }

    pub fn node(&self, path: &str) -> Option<&Node> {
        self.nodes.get(path)
    }

    /// Enabled nodes in pre-order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The node owning `handle`.
    pub fn resolve_handle(&self, handle: u64) -> Option<&Node> {
        self.handles.get(&handle).and_then(|p| self.nodes.get(p))
    }

    /// The path an alias names.
    pub fn alias(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(String::as_str)
    }

    /// The node a chosen selector designates.
    ///
    /// Returns `Ok(None)` when the selector is absent and an error when it is
    /// present but designates no enabled node. Targets may be paths or alias
    /// names.
    pub fn chosen(&self, selector: &str) -> Result<Option<&Node>> {
        let Some(target) = self.chosen.get(selector) else {
            return Ok(None);
        };
        let path = if target.starts_with('/') {
            target.as_str()
        } else {
            self.alias(target).unwrap_or(target.as_str())
        };
        self.nodes
            .get(path)
            .map(Some)
            .ok_or_else(|| Error::UnknownNode {
                selector: selector.to_string(),
                target: target.clone(),
            })
    }

    /// The parent of a node.
    pub fn parent(&self, node: &Node) -> Option<&Node> {
        parent_path(&node.path).and_then(|p| self.nodes.get(p))
    }

    /// Nodes from the root down to `node`, inclusive.
    pub fn lineage<'a>(&'a self, node: &Node) -> impl Iterator<Item = &'a Node> + 'a {
        path_chain(&node.path)
            .into_iter()
            .filter_map(move |p| self.nodes.get(&p))
    }

    /// Direct children of a node in source order.
    pub fn children<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes
            .values()
            .filter(move |n| parent_path(&n.path) == Some(node.path.as_str()))
    }

    /// All nodes below `node` in pre-order.
    pub fn descendants<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes
            .values()
            .filter(move |n| is_descendant(&n.path, &node.path))
    }

    /// Every compatible identifier declared by an enabled node.
    pub fn compatibles(&self) -> BTreeSet<String> {
        self.nodes
            .values()
            .flat_map(|n| n.compatibles())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SourceTree {
        SourceTree::with_root(
            SourceNode::new()
                .str_prop("compatible", "st,stm32f4")
                .child(
                    "aliases",
                    SourceNode::new().str_prop("uart-1", "/soc/uart@40011000"),
                )
                .child(
                    "chosen",
                    SourceNode::new()
                        .str_prop("zephyr,console", "uart-1")
                        .str_prop("zephyr,flash", "/soc/flash@8000000"),
                )
                .child(
                    "soc",
                    SourceNode::new()
                        .child(
                            "rcc@40023800",
                            SourceNode::new().prop("phandle", PropertyValue::Int(1)),
                        )
                        .child(
                            "uart@40011000",
                            SourceNode::new()
                                .str_prop("compatible", "st,stm32-usart")
                                .prop("phandle", PropertyValue::Int(2)),
                        )
                        .child(
                            "spi@40013000",
                            SourceNode::new()
                                .str_prop("status", "disabled")
                                .prop("phandle", PropertyValue::Int(3))
                                .child(
                                    "flash@0",
                                    SourceNode::new()
                                        .str_prop("status", "okay")
                                        .prop("phandle", PropertyValue::Int(4)),
                                ),
                        ),
                ),
        )
    }

    #[test]
    fn test_preorder_paths() {
        let tree = ReducedTree::reduce(&sample()).unwrap();
        let paths: Vec<_> = tree.nodes().map(|n| n.path.as_str()).collect();
        assert_eq!(
            paths,
            [
                "/",
                "/aliases",
                "/chosen",
                "/soc",
                "/soc/rcc@40023800",
                "/soc/uart@40011000",
            ]
        );
    }

    #[test]
    fn test_disabled_subtree_is_dropped_with_handles() {
        let tree = ReducedTree::reduce(&sample()).unwrap();
        assert!(tree.node("/soc/spi@40013000").is_none());
        assert!(tree.node("/soc/spi@40013000/flash@0").is_none());
        assert!(tree.resolve_handle(3).is_none());
        assert!(tree.resolve_handle(4).is_none());
        assert_eq!(
            tree.resolve_handle(2).map(|n| n.path.as_str()),
            Some("/soc/uart@40011000")
        );
    }

    #[test]
    fn test_disabled_parent_hides_child_without_status() {
        let source = SourceTree::with_root(
            SourceNode::new().child(
                "bus",
                SourceNode::new()
                    .str_prop("status", "disabled")
                    .child("dev", SourceNode::new().prop("phandle", PropertyValue::Int(9))),
            ),
        );
        let tree = ReducedTree::reduce(&source).unwrap();
        assert!(tree.node("/bus/dev").is_none());
        assert!(tree.resolve_handle(9).is_none());
    }

    #[test]
    fn test_chosen_resolves_paths_and_aliases() {
        let tree = ReducedTree::reduce(&sample()).unwrap();
        let console = tree.chosen("zephyr,console").unwrap().unwrap();
        assert_eq!(console.path, "/soc/uart@40011000");
        assert!(tree.chosen("zephyr,sram").unwrap().is_none());
        // The flash path does not exist in the sample.
        assert!(matches!(
            tree.chosen("zephyr,flash"),
            Err(Error::UnknownNode { .. })
        ));
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let source = SourceTree::default();
        assert!(matches!(
            ReducedTree::reduce(&source),
            Err(Error::MalformedTree(_))
        ));
    }

    #[test]
    fn test_duplicate_handle_is_fatal() {
        let source = SourceTree::with_root(
            SourceNode::new()
                .child("a", SourceNode::new().prop("phandle", PropertyValue::Int(1)))
                .child("b", SourceNode::new().prop("phandle", PropertyValue::Int(1))),
        );
        assert_eq!(
            ReducedTree::reduce(&source).unwrap_err(),
            Error::DuplicateHandle {
                handle: 1,
                first: "/a".to_string(),
                second: "/b".to_string(),
            }
        );
    }

    #[test]
    fn test_values_are_normalized() {
        let source = SourceTree::from_json(
            r#"{"/": {"props": {"a": [5], "b": ["x"], "c": [], "d": true, "e": [1, 2], "f": null, "wakeup-source": false}}}"#,
        )
        .unwrap();
        let tree = ReducedTree::reduce(&source).unwrap();
        let root = tree.root().unwrap();
        assert_eq!(root.prop("a"), Some(&PropertyValue::Int(5)));
        assert_eq!(root.prop("b"), Some(&PropertyValue::Str("x".to_string())));
        assert_eq!(root.prop("c"), Some(&PropertyValue::Empty));
        assert_eq!(root.prop("d"), Some(&PropertyValue::Empty));
        assert_eq!(root.prop("e"), Some(&PropertyValue::IntList(vec![1, 2])));
        assert_eq!(root.prop("f"), Some(&PropertyValue::Empty));
        assert_eq!(root.prop("wakeup-source"), None);
        assert_eq!(root.props.len(), 6);
        // Programmatic lists are normalized during reduction too.
        let source = SourceTree::with_root(SourceNode::new().cells_prop("g", &[7]));
        let tree = ReducedTree::reduce(&source).unwrap();
        assert_eq!(tree.root().unwrap().prop("g"), Some(&PropertyValue::Int(7)));
    }

    #[test]
    fn test_compatible_and_lineage() {
        let tree = ReducedTree::reduce(&sample()).unwrap();
        let uart = tree.node("/soc/uart@40011000").unwrap();
        assert_eq!(uart.compatible(), Some("st,stm32-usart"));
        let lineage: Vec<_> = tree.lineage(uart).map(|n| n.path.as_str()).collect();
        assert_eq!(lineage, ["/", "/soc", "/soc/uart@40011000"]);
        assert_eq!(tree.parent(uart).map(|n| n.path.as_str()), Some("/soc"));
        let soc = tree.node("/soc").unwrap();
        assert_eq!(tree.children(soc).count(), 2);
        assert!(tree.compatibles().contains("st,stm32f4"));
    }
}
