// Licensed under the Apache-2.0 license

//! Core data types produced by extraction.
//!
//! Extractors append [`ExtractedSymbol`]s and [`AliasEntry`]s to a
//! [`SymbolTable`] and return [`StructuredRecord`]s. Both are owned by a
//! single generation run and never shared across runs.
//!
//! ## Symbol Table Layout
//!
//! ```text
//! SymbolTable
//! ├── nodes: path → NodeDefs              # insertion order, sorted on output
//! │   ├── symbols: [UART0_BASE_ADDRESS_0 = 0x1000, UART0_SIZE_0 = 256]
//! │   └── aliases: [UART0_BASE_ADDRESS → UART0_BASE_ADDRESS_0, ...]
//! │
//! └── owners: name → origin               # one namespace, symbols and aliases
//! ```

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::util::hex_literal;

//=============================================================================
// Symbols
//=============================================================================

/// Value of a generated symbol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolValue {
    /// Printed in decimal.
    Int(u64),
    /// An address, printed as `0x...`.
    Hex(u64),
    /// Printed with surrounding double quotes.
    Str(String),
}

impl fmt::Display for SymbolValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolValue::Int(v) => write!(f, "{v}"),
            SymbolValue::Hex(v) => f.write_str(&hex_literal(*v)),
            SymbolValue::Str(s) => write!(f, "\"{s}\""),
        }
    }
}

/// A uniquely named constant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExtractedSymbol {
    pub name: String,
    pub value: SymbolValue,
}

impl ExtractedSymbol {
    pub fn new(name: impl Into<String>, value: SymbolValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A secondary name for a symbol defined canonically on the same node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AliasEntry {
    pub alias: String,
    pub target: String,
}

/// Symbols and aliases produced for one node (or one fallback entry).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NodeDefs {
    pub path: String,
    pub symbols: Vec<ExtractedSymbol>,
    pub aliases: Vec<AliasEntry>,
}

impl NodeDefs {
    fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            ..Default::default()
        }
    }

    /// Look up a value by symbol or alias name.
    pub fn lookup(&self, name: &str) -> Option<&SymbolValue> {
        let name = self
            .aliases
            .iter()
            .find(|a| a.alias == name)
            .map_or(name, |a| a.target.as_str());
        self.symbols
            .iter()
            .find(|s| s.name == name)
            .map(|s| &s.value)
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty() && self.aliases.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Owner {
    origin: String,
    alias_target: Option<String>,
}

/// Accumulates symbols and aliases, rejecting any reuse of a name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SymbolTable {
    nodes: IndexMap<String, NodeDefs>,
    owners: HashMap<String, Owner>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn collision(&self, name: &str, path: &str, property: &str) -> Option<Error> {
        self.owners.get(name).map(|owner| Error::SymbolCollision {
            name: name.to_string(),
            path: path.to_string(),
            property: property.to_string(),
            first: owner.origin.clone(),
        })
    }

    /// Add a canonical symbol for the node at `path`.
    pub fn insert_symbol(
        &mut self,
        path: &str,
        property: &str,
        symbol: ExtractedSymbol,
    ) -> Result<()> {
        if let Some(err) = self.collision(&symbol.name, path, property) {
            return Err(err);
        }
        self.owners.insert(
            symbol.name.clone(),
            Owner {
                origin: format!("{path}: {property}"),
                alias_target: None,
            },
        );
        self.nodes
            .entry(path.to_string())
            .or_insert_with(|| NodeDefs::new(path))
            .symbols
            .push(symbol);
        Ok(())
    }

    /// Add an alias for the node at `path`. Re-adding an identical alias is
    /// a no-op; any other reuse of the name is a collision.
    pub fn insert_alias(&mut self, path: &str, property: &str, alias: &str, target: &str) -> Result<()> {
        if let Some(owner) = self.owners.get(alias) {
            if owner.alias_target.as_deref() == Some(target) {
                return Ok(());
            }
        }
        if let Some(err) = self.collision(alias, path, property) {
            return Err(err);
        }
        self.owners.insert(
            alias.to_string(),
            Owner {
                origin: format!("{path}: {property}"),
                alias_target: Some(target.to_string()),
            },
        );
        self.nodes
            .entry(path.to_string())
            .or_insert_with(|| NodeDefs::new(path))
            .aliases
            .push(AliasEntry {
                alias: alias.to_string(),
                target: target.to_string(),
            });
        Ok(())
    }

    /// Per-node entries in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeDefs> {
        self.nodes.values()
    }

    pub fn node(&self, path: &str) -> Option<&NodeDefs> {
        self.nodes.get(path)
    }

    /// Look up a symbol or alias anywhere in the table.
    pub fn lookup(&self, name: &str) -> Option<&SymbolValue> {
        self.nodes.values().find_map(|n| n.lookup(name))
    }

    pub fn symbol_count(&self) -> usize {
        self.nodes.values().map(|n| n.symbols.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.symbol_count() == 0
    }
}

//=============================================================================
// Structured records
//=============================================================================

/// One named value of a record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecordField {
    pub name: String,
    pub value: SymbolValue,
    /// The symbol holding this value, when symbols were generated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

/// A (pin, function) pair of a pin-multiplexing group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PinConfig {
    pub pin: u64,
    pub function: u64,
}

/// Structured data for one occurrence of an extracted property.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StructuredRecord {
    /// Source property (`reg`, `interrupts`, `clocks`, `pinctrl-0`, ...).
    pub property: String,
    /// Occurrence index within the property.
    pub index: usize,
    /// Name from the paired `-names` property.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub fields: Vec<RecordField>,
    /// Path of the node whose binding decoded the cells (interrupt parent,
    /// clock controller, pin controller).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_parent: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pins: Vec<PinConfig>,
}

impl StructuredRecord {
    pub fn new(property: &str, index: usize) -> Self {
        Self {
            property: property.to_string(),
            index,
            ..Default::default()
        }
    }

    pub fn field(&self, name: &str) -> Option<&RecordField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// All records of one node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NodeRecords {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compatible: Option<String>,
    /// Base label the node's symbols are built on.
    pub label: String,
    pub records: Vec<StructuredRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_display() {
        assert_eq!(SymbolValue::Int(256).to_string(), "256");
        assert_eq!(SymbolValue::Hex(0x1000).to_string(), "0x1000");
        assert_eq!(SymbolValue::Str("UART_1".into()).to_string(), "\"UART_1\"");
    }

    #[test]
    fn test_symbol_collision() {
        let mut table = SymbolTable::new();
        table
            .insert_symbol("/a", "label", ExtractedSymbol::new("FOO_BAR", SymbolValue::Int(1)))
            .unwrap();
        let err = table
            .insert_symbol("/b", "label", ExtractedSymbol::new("FOO_BAR", SymbolValue::Int(1)))
            .unwrap_err();
        assert_eq!(
            err,
            Error::SymbolCollision {
                name: "FOO_BAR".to_string(),
                path: "/b".to_string(),
                property: "label".to_string(),
                first: "/a: label".to_string(),
            }
        );
    }

    #[test]
    fn test_aliases_share_the_namespace() {
        let mut table = SymbolTable::new();
        table
            .insert_symbol("/a", "reg", ExtractedSymbol::new("A_SIZE_0", SymbolValue::Int(4)))
            .unwrap();
        table.insert_alias("/a", "reg", "A_SIZE", "A_SIZE_0").unwrap();
        // Identical alias is accepted again.
        table.insert_alias("/a", "reg", "A_SIZE", "A_SIZE_0").unwrap();
        assert!(table.insert_alias("/b", "reg", "A_SIZE", "B_SIZE_0").is_err());
        assert!(table.insert_alias("/b", "reg", "A_SIZE_0", "B_SIZE_0").is_err());
        assert!(table
            .insert_symbol("/b", "reg", ExtractedSymbol::new("A_SIZE", SymbolValue::Int(4)))
            .is_err());

        assert_eq!(table.lookup("A_SIZE"), Some(&SymbolValue::Int(4)));
        assert_eq!(table.node("/a").unwrap().aliases.len(), 1);
        assert_eq!(table.symbol_count(), 1);
    }

    #[test]
    fn test_empty_table() {
        let table = SymbolTable::new();
        assert!(table.is_empty());
        assert_eq!(table.nodes().count(), 0);
    }
}
