// Licensed under the Apache-2.0 license

//! Main extraction logic: turning a reduced tree and resolved bindings into
//! symbols and structured records.
//!
//! A [`Generator`] holds the read-only inputs of one run. The mutable state
//! (symbol table and per-node records) lives in an [`Accumulator`] threaded
//! through every extraction call and consumed by assembly.
//!
//! The implementation is split across submodules:
//! - `cells`: the handle-plus-cells decoder shared by clocks, GPIOs and
//!   interrupts
//! - `extract`: region, interrupt, pin-multiplexing and generic extractors
//! - `assemble`: forced chosen-node extraction and record grouping

mod assemble;
mod cells;
mod extract;

use indexmap::IndexMap;
use std::collections::BTreeMap;

use crate::config::GeneratorConfig;
use crate::error::{Error, Result};
use crate::output::{GeneratedDefs, GeneratedRecords};
use crate::schema::{self, ExtractorKind, Generation, PropertyRule, RawSchema, Schema};
use crate::tree::{Node, PropertyValue, ReducedTree, SourceTree};
use crate::types::{
    ExtractedSymbol, NodeRecords, RecordField, StructuredRecord, SymbolTable, SymbolValue,
};
use crate::util::{join_label, label, unit_suffix};

use extract::RegionRequest;

/// Everything a generation run produces.
#[derive(Clone, Debug)]
pub struct Generated {
    /// Path-keyed symbol table with aliases.
    pub defs: GeneratedDefs,
    /// Compatible-keyed instance lists.
    pub records: GeneratedRecords,
}

/// Read-only context of one run.
struct Generator<'a> {
    tree: &'a ReducedTree,
    schemas: &'a BTreeMap<String, Schema>,
    config: &'a GeneratorConfig,
}

/// Mutable state of one run.
#[derive(Default)]
struct Accumulator {
    defs: SymbolTable,
    /// Records per node path, in order of first extraction.
    records: IndexMap<String, NodeRecords>,
}

impl Accumulator {
    fn push_records(&mut self, node: &Node, base: &str, records: Vec<StructuredRecord>) {
        if records.is_empty() {
            return;
        }
        self.records
            .entry(node.path.clone())
            .or_insert_with(|| NodeRecords {
                path: node.path.clone(),
                compatible: node.compatible().map(str::to_string),
                label: base.to_string(),
                records: Vec::new(),
            })
            .records
            .extend(records);
    }
}

/// Writes the symbols of one property into a symbol table.
///
/// With `define` unset the emitter only builds record fields, which is how
/// `generation: structure` rules are honored.
struct Emitter<'t> {
    defs: &'t mut SymbolTable,
    path: &'t str,
    property: &'t str,
    define: bool,
}

impl Emitter<'_> {
    /// Emit `name = value` and return the record field describing it.
    fn field(&mut self, field: &str, name: String, value: SymbolValue) -> Result<RecordField> {
        let symbol = if self.define {
            self.defs.insert_symbol(
                self.path,
                self.property,
                ExtractedSymbol::new(name.clone(), value.clone()),
            )?;
            Some(name)
        } else {
            None
        };
        Ok(RecordField {
            name: field.to_string(),
            value,
            symbol,
        })
    }

    /// Like [`Emitter::field`], but a symbol this node already defined with
    /// the same value is reused instead of colliding.
    fn shared_field(&mut self, field: &str, name: String, value: SymbolValue) -> Result<RecordField> {
        let existing = self
            .defs
            .node(self.path)
            .and_then(|n| n.symbols.iter().find(|s| s.name == name));
        match existing {
            Some(symbol) if symbol.value == value && self.define => Ok(RecordField {
                name: field.to_string(),
                value,
                symbol: Some(name),
            }),
            _ => self.field(field, name, value),
        }
    }

    fn alias(&mut self, alias: &str, target: &str) -> Result<()> {
        if self.define {
            self.defs
                .insert_alias(self.path, self.property, alias, target)
        } else {
            Ok(())
        }
    }
}

/// Base label of a node described by `schema`.
fn base_label(schema: &Schema, node: &Node) -> String {
    let base = match &schema.base_label {
        Some(fixed) => label(fixed),
        None => join_label(&[label(&schema.compatible), label(unit_suffix(node.name()))]),
    };
    match node.prop("label").and_then(PropertyValue::as_str) {
        Some(human) if schema.use_property_label => join_label(&[base, label(human)]),
        _ => base,
    }
}

/// Names attached to the occurrences of `property`, from its `-names`
/// companion.
fn occurrence_names(node: &Node, property: &str) -> Vec<String> {
    let candidates = if property.starts_with("pinctrl-") {
        vec!["pinctrl-names".to_string()]
    } else if property == "interrupts-extended" {
        vec!["interrupt-names".to_string()]
    } else {
        property
            .strip_suffix('s')
            .map(|p| format!("{p}-names"))
            .into_iter()
            .chain(std::iter::once(format!("{property}-names")))
            .collect()
    };
    candidates
        .iter()
        .find_map(|key| node.prop(key))
        .map(|v| v.strings().into_iter().map(str::to_string).collect())
        .unwrap_or_default()
}

impl<'a> Generator<'a> {
    /// The binding a referenced node must have for `property` of `node` to
    /// be decoded.
    fn schema_of(&self, node: &Node, property: &str, target: &Node) -> Result<&'a Schema> {
        let schemas = self.schemas;
        target
            .compatible()
            .and_then(|c| schemas.get(c))
            .ok_or_else(|| Error::MissingSchema {
                path: node.path.clone(),
                property: property.to_string(),
                target: target.path.clone(),
                compatible: target.compatible().unwrap_or("<none>").to_string(),
            })
    }

    /// Schema-driven scan over every enabled node in pre-order.
    fn scan(&self, acc: &mut Accumulator) -> Result<()> {
        let tree = self.tree;
        for node in tree.nodes() {
            let Some(compatible) = node.compatible() else {
                continue;
            };
            let Some(schema) = self.schemas.get(compatible) else {
                log::warn!("{}: no binding for {compatible}, skipping", node.path);
                continue;
            };
            self.extract_node(acc, node, schema, &schema.rules)?;
        }
        Ok(())
    }

    /// Apply `rules` to `node`, and nested rule lists to its descendants.
    fn extract_node(
        &self,
        acc: &mut Accumulator,
        node: &Node,
        schema: &Schema,
        rules: &[PropertyRule],
    ) -> Result<()> {
        let tree = self.tree;
        let base = base_label(schema, node);
        for rule in rules {
            if !rule.children.is_empty() {
                for descendant in tree.descendants(node) {
                    self.extract_node(acc, descendant, schema, &rule.children)?;
                }
            }
            let Some(generation) = rule.generation else {
                continue;
            };
            for (property, value, kind) in rule.matches(node) {
                log::debug!("{}: extracting {property} ({kind:?})", node.path);
                let mut emit = Emitter {
                    defs: &mut acc.defs,
                    path: &node.path,
                    property,
                    define: generation == Generation::Define,
                };
                let records =
                    self.extract_property(&mut emit, node, rule, &base, property, value, kind)?;
                acc.push_records(node, &base, records);
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn extract_property(
        &self,
        emit: &mut Emitter,
        node: &Node,
        rule: &PropertyRule,
        base: &str,
        property: &str,
        value: &PropertyValue,
        kind: ExtractorKind,
    ) -> Result<Vec<StructuredRecord>> {
        let names = occurrence_names(node, property);
        match kind {
            ExtractorKind::Region => self.extract_regions(
                emit,
                RegionRequest {
                    node,
                    base,
                    names: &names,
                    divisor: 1,
                    post_label: rule.label.as_deref(),
                },
            ),
            ExtractorKind::Interrupts { extended } => {
                self.extract_interrupts(emit, node, property, value, base, &names, extended)
            }
            ExtractorKind::Pinctrl { index } => {
                self.extract_pinctrl(emit, node, property, value, base, names.get(index))
            }
            ExtractorKind::Cells { count_key } => {
                let base = if rule.use_name_prefix {
                    join_label(&[base.to_string(), label(property)])
                } else {
                    base.to_string()
                };
                self.extract_cells(emit, node, property, value, &base, &count_key, &names)
            }
            ExtractorKind::Generic => extract::extract_single(emit, base, property, value),
        }
    }
}

/// Run extraction over an already reduced tree and resolved bindings.
pub fn generate_resolved(
    tree: &ReducedTree,
    schemas: &BTreeMap<String, Schema>,
    config: &GeneratorConfig,
) -> Result<Generated> {
    log::info!(
        "Extracting from {} nodes with {} bindings",
        tree.len(),
        schemas.len()
    );
    let generator = Generator {
        tree,
        schemas,
        config,
    };
    let mut acc = Accumulator::default();
    generator.scan(&mut acc)?;
    if acc.defs.is_empty() {
        return Err(Error::EmptyResult);
    }
    let generated = generator.assemble(acc)?;
    log::info!(
        "Generated {} symbols for {} nodes",
        generated.defs.table.symbol_count(),
        generated.defs.table.nodes().count()
    );
    Ok(generated)
}

/// Reduce `source`, resolve `bindings` and run extraction.
pub fn generate(
    source: &SourceTree,
    bindings: &BTreeMap<String, RawSchema>,
    config: &GeneratorConfig,
) -> Result<Generated> {
    let tree = ReducedTree::reduce(source)?;
    let schemas = schema::resolve(bindings)?;
    generate_resolved(&tree, &schemas, config)
}
