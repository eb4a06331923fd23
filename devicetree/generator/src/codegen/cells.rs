// Licensed under the Apache-2.0 license

//! Decoding of handle-plus-cells specifiers.
//!
//! A specifier property such as `clocks = <&rcc 1 0x10 &osc>` is a flat list
//! in which each handle is followed by as many cells as the referenced node
//! declares in its `#<key>-cells` property. The referenced node's binding
//! names those cells through its `#cells` list.
//!
//! ```text
//! clocks = <1  0 0x4000  2>        rcc (phandle 1): #clock-cells = <2>
//!           │  └──┬───┘  │                          #cells: [bus, bits]
//!           │     │      │                          cell_string: CLOCK
//!           │     │      └── handle 2: #clock-cells = <0>, no cells
//!           └─────┴── occurrence 0
//!
//! BASE_CLOCK_0_BUS  = 0       alias BASE_CLOCK_BUS
//! BASE_CLOCK_0_BITS = 16384   alias BASE_CLOCK_BITS
//! ```

use super::*;

/// One specifier's cells with the naming context they are labelled in.
pub(super) struct CellEntry<'e> {
    pub base: &'e str,
    /// Upper-cased cell string of the decoding binding, or empty.
    pub cell_prefix: &'e str,
    pub index: usize,
    /// Upper-cased occurrence name from the `-names` companion.
    pub name: Option<&'e str>,
    pub fields: &'e [String],
    pub values: &'e [u64],
}

/// Emit one symbol per cell, plus the name alias and the index-0 alias.
pub(super) fn decode_entry(emit: &mut Emitter, entry: &CellEntry) -> Result<Vec<RecordField>> {
    let idx = entry.index.to_string();
    let mut fields = Vec::with_capacity(entry.values.len());
    for (field, &value) in entry.fields.iter().zip(entry.values) {
        let field_label = label(field);
        // CLOCK_0 rather than CLOCK_0_CLOCK
        let field_part = if field_label == entry.cell_prefix {
            ""
        } else {
            field_label.as_str()
        };
        let fqn = join_label(&[entry.base, entry.cell_prefix, idx.as_str(), field_part]);
        fields.push(emit.field(field, fqn.clone(), SymbolValue::Int(value))?);
        if let Some(name) = entry.name {
            emit.alias(&join_label(&[entry.base, name, field_part]), &fqn)?;
        }
        if entry.index == 0 {
            emit.alias(
                &join_label(&[entry.base, entry.cell_prefix, field_part]),
                &fqn,
            )?;
        }
    }
    Ok(fields)
}

impl Generator<'_> {
    /// Decode a chain of specifiers counted by `count_key` on each
    /// referenced node.
    #[allow(clippy::too_many_arguments)]
    pub(super) fn extract_cells(
        &self,
        emit: &mut Emitter,
        node: &Node,
        property: &str,
        value: &PropertyValue,
        base: &str,
        count_key: &str,
        names: &[String],
    ) -> Result<Vec<StructuredRecord>> {
        let tree = self.tree;
        let cells = match value {
            PropertyValue::Empty => return Ok(Vec::new()),
            other => other.cells().ok_or_else(|| {
                Error::invalid_property(&node.path, property, "expected a handle followed by cells")
            })?,
        };

        let mut records = Vec::new();
        let mut rest = cells;
        let mut index = 0;
        while let Some((&handle, tail)) = rest.split_first() {
            let parent = tree
                .resolve_handle(handle)
                .ok_or_else(|| Error::UnresolvedHandle {
                    path: node.path.clone(),
                    property: property.to_string(),
                    handle,
                })?;
            let schema = self.schema_of(node, property, parent)?;
            let count = parent
                .prop(count_key)
                .and_then(PropertyValue::as_u64)
                .unwrap_or(0) as usize;
            if count > schema.cells.len() {
                return Err(Error::invalid_schema(
                    &schema.compatible,
                    format!(
                        "{} declares {count_key} = {count} but #cells names {} fields",
                        parent.path,
                        schema.cells.len()
                    ),
                ));
            }
            if tail.len() < count {
                return Err(Error::invalid_property(
                    &node.path,
                    property,
                    format!(
                        "specifier {index} needs {count} cells after handle {handle}, found {}",
                        tail.len()
                    ),
                ));
            }
            let (values, remaining) = tail.split_at(count);
            let name = names.get(index).map(|n| label(n));
            let fields = decode_entry(
                emit,
                &CellEntry {
                    base,
                    cell_prefix: &schema.cell_prefix(),
                    index,
                    name: name.as_deref(),
                    fields: &schema.cells[..count],
                    values,
                },
            )?;
            records.push(StructuredRecord {
                property: property.to_string(),
                index,
                name: names.get(index).cloned(),
                fields,
                cell_parent: Some(parent.path.clone()),
                pins: Vec::new(),
            });
            rest = remaining;
            index += 1;
        }
        Ok(records)
    }
}
