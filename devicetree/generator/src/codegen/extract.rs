// Licensed under the Apache-2.0 license

//! Specialized extractors: addressable regions, interrupt lines, pin
//! multiplexing groups and plain properties.

use super::cells::{decode_entry, CellEntry};
use super::*;
use crate::tree::{HANDLE_PROP, LEGACY_HANDLE_PROP, STATUS_PROP};
use crate::types::PinConfig;

const ADDRESS_CELLS: &str = "#address-cells";
const SIZE_CELLS: &str = "#size-cells";
const INTERRUPT_CELLS: &str = "#interrupt-cells";
const INTERRUPT_PARENT: &str = "interrupt-parent";

/// Devicetree defaults when no ancestor declares the widths.
const DEFAULT_ADDRESS_CELLS: usize = 2;
const DEFAULT_SIZE_CELLS: usize = 1;

/// Parameters of a region extraction.
pub(super) struct RegionRequest<'r> {
    pub node: &'r Node,
    pub base: &'r str,
    pub names: &'r [String],
    /// Sizes are divided by this before they become symbols. Zero acts as one.
    pub divisor: u64,
    /// Replaces `BASE_ADDRESS` in address symbol names.
    pub post_label: Option<&'r str>,
}

/// Assemble a multi-cell number, most significant cell first.
fn combine(cells: &[u64]) -> u64 {
    cells.iter().fold(0, |acc, &c| (acc << 32) | c)
}

impl Generator<'_> {
    /// Address and size widths for `node`'s `reg`, taken from the nearest
    /// ancestor that declares them.
    fn region_widths(&self, node: &Node) -> (usize, usize) {
        let tree = self.tree;
        let mut widths = (DEFAULT_ADDRESS_CELLS, DEFAULT_SIZE_CELLS);
        for ancestor in tree.lineage(node).filter(|n| n.path != node.path) {
            if let Some(cells) = ancestor.prop(ADDRESS_CELLS).and_then(PropertyValue::as_u64) {
                widths.0 = cells as usize;
            }
            if let Some(cells) = ancestor.prop(SIZE_CELLS).and_then(PropertyValue::as_u64) {
                widths.1 = cells as usize;
            }
        }
        widths
    }

    /// Decode `node`'s `reg` into (address, size) pairs.
    pub(super) fn decode_regions(&self, node: &Node) -> Result<Vec<(u64, u64)>> {
        let (address_cells, size_cells) = self.region_widths(node);
        let cells = node
            .prop("reg")
            .ok_or_else(|| Error::missing_property(&node.path, "reg"))?
            .cells()
            .ok_or_else(|| Error::invalid_property(&node.path, "reg", "expected address and size cells"))?;
        if address_cells > 2 || size_cells > 2 {
            return Err(Error::invalid_property(
                &node.path,
                "reg",
                format!("{address_cells} address cells and {size_cells} size cells do not fit in 64 bits"),
            ));
        }
        let group = address_cells + size_cells;
        if group == 0 || cells.len() % group != 0 {
            return Err(Error::invalid_property(
                &node.path,
                "reg",
                format!(
                    "{} cells do not divide into groups of {address_cells} address and {size_cells} size cells",
                    cells.len()
                ),
            ));
        }
        Ok(cells
            .chunks(group)
            .map(|c| (combine(&c[..address_cells]), combine(&c[address_cells..])))
            .collect())
    }

    /// Emit `<BASE>_BASE_ADDRESS_<i>` and `<BASE>_SIZE_<i>` per region.
    pub(super) fn extract_regions(
        &self,
        emit: &mut Emitter,
        req: RegionRequest,
    ) -> Result<Vec<StructuredRecord>> {
        let regions = self.decode_regions(req.node)?;
        let divisor = req.divisor.max(1);
        let addr_label = req
            .post_label
            .map(label)
            .unwrap_or_else(|| "BASE_ADDRESS".to_string());
        let size_label = "SIZE";

        let mut records = Vec::with_capacity(regions.len());
        for (index, (addr, size)) in regions.into_iter().enumerate() {
            let idx = index.to_string();
            let addr_fqn = join_label(&[req.base, addr_label.as_str(), idx.as_str()]);
            let size_fqn = join_label(&[req.base, size_label, idx.as_str()]);

            let mut record = StructuredRecord::new("reg", index);
            record
                .fields
                .push(emit.field("base", addr_fqn.clone(), SymbolValue::Hex(addr))?);
            record.fields.push(emit.field(
                "size",
                size_fqn.clone(),
                SymbolValue::Int(size / divisor),
            )?);

            if let Some(name) = req.names.get(index) {
                let name_label = label(name);
                emit.alias(
                    &join_label(&[req.base, name_label.as_str(), addr_label.as_str()]),
                    &addr_fqn,
                )?;
                emit.alias(
                    &join_label(&[req.base, name_label.as_str(), size_label]),
                    &size_fqn,
                )?;
                record.name = Some(name.clone());
            }
            if index == 0 {
                emit.alias(&join_label(&[req.base, addr_label.as_str()]), &addr_fqn)?;
                emit.alias(&join_label(&[req.base, size_label]), &size_fqn)?;
            }
            records.push(record);
        }
        Ok(records)
    }

    /// The interrupt routing parent: the last `interrupt-parent` seen on the
    /// way from the root down to `node`, inclusive.
    fn interrupt_parent(&self, node: &Node, property: &str) -> Result<&Node> {
        let tree = self.tree;
        let handle = tree
            .lineage(node)
            .filter_map(|n| n.prop(INTERRUPT_PARENT).and_then(PropertyValue::as_u64))
            .last()
            .ok_or_else(|| Error::NoInterruptParent {
                path: node.path.clone(),
                property: property.to_string(),
            })?;
        tree.resolve_handle(handle)
            .ok_or_else(|| Error::UnresolvedHandle {
                path: node.path.clone(),
                property: INTERRUPT_PARENT.to_string(),
                handle,
            })
    }

    /// Decode `interrupts`, or `interrupts-extended` when `extended`.
    #[allow(clippy::too_many_arguments)]
    pub(super) fn extract_interrupts(
        &self,
        emit: &mut Emitter,
        node: &Node,
        property: &str,
        value: &PropertyValue,
        base: &str,
        names: &[String],
        extended: bool,
    ) -> Result<Vec<StructuredRecord>> {
        let tree = self.tree;
        let cells = value.cells().ok_or_else(|| {
            Error::invalid_property(&node.path, property, "expected interrupt specifier cells")
        })?;
        let routing = if extended {
            None
        } else {
            Some(self.interrupt_parent(node, property)?)
        };

        let mut records = Vec::new();
        let mut rest = cells;
        let mut index = 0;
        while !rest.is_empty() {
            let parent = match routing {
                Some(parent) => parent,
                None => {
                    let Some((&handle, tail)) = rest.split_first() else {
                        break;
                    };
                    rest = tail;
                    tree.resolve_handle(handle)
                        .ok_or_else(|| Error::UnresolvedHandle {
                            path: node.path.clone(),
                            property: property.to_string(),
                            handle,
                        })?
                }
            };
            let schema = self.schema_of(node, property, parent)?;
            let count = parent
                .prop(INTERRUPT_CELLS)
                .and_then(PropertyValue::as_u64)
                .ok_or_else(|| Error::missing_property(&parent.path, INTERRUPT_CELLS))?
                as usize;
            if count == 0 && !extended {
                return Err(Error::invalid_property(
                    &parent.path,
                    INTERRUPT_CELLS,
                    "an interrupt controller needs at least one cell",
                ));
            }
            if count > schema.cells.len() {
                return Err(Error::invalid_schema(
                    &schema.compatible,
                    format!(
                        "{} declares {INTERRUPT_CELLS} = {count} but #cells names {} fields",
                        parent.path,
                        schema.cells.len()
                    ),
                ));
            }
            if rest.len() < count {
                return Err(Error::invalid_property(
                    &node.path,
                    property,
                    format!(
                        "interrupt {index} needs {count} cells, found {}",
                        rest.len()
                    ),
                ));
            }
            let (values, remaining) = rest.split_at(count);
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

    /// Decode `pinctrl-<n>`: every referenced group's per-pin entries become
    /// (pin, function) pairs. `tag` is the matching `pinctrl-names` entry.
    #[allow(clippy::too_many_arguments)]
    pub(super) fn extract_pinctrl(
        &self,
        emit: &mut Emitter,
        node: &Node,
        property: &str,
        value: &PropertyValue,
        base: &str,
        tag: Option<&String>,
    ) -> Result<Vec<StructuredRecord>> {
        let tree = self.tree;
        let handles = match value {
            PropertyValue::Empty => return Ok(Vec::new()),
            other => other.cells().ok_or_else(|| {
                Error::invalid_property(&node.path, property, "expected pin group handles")
            })?,
        };

        let mut records = Vec::with_capacity(handles.len());
        for (index, &handle) in handles.iter().enumerate() {
            let group = tree
                .resolve_handle(handle)
                .ok_or_else(|| Error::UnresolvedHandle {
                    path: node.path.clone(),
                    property: property.to_string(),
                    handle,
                })?;
            let controller = tree.parent(group).ok_or_else(|| {
                Error::invalid_property(
                    &node.path,
                    property,
                    format!("pin group {} has no controller", group.path),
                )
            })?;
            let schema = self.schema_of(node, property, controller)?;
            let fields = &schema.cells;
            if !(1..=2).contains(&fields.len()) {
                return Err(Error::invalid_schema(
                    &schema.compatible,
                    format!(
                        "a pin controller must name one or two cells, found {}",
                        fields.len()
                    ),
                ));
            }
            let prefix = schema.cell_prefix();
            let pin_label = label(&fields[0]);

            let mut record = StructuredRecord {
                property: property.to_string(),
                index,
                name: tag.cloned(),
                cell_parent: Some(controller.path.clone()),
                ..Default::default()
            };
            for entry in tree.children(group) {
                let root = join_label(&[
                    base.to_string(),
                    prefix.clone(),
                    label(group.name()),
                    label(entry.name()),
                ]);
                if let [pins_field, function_field] = fields.as_slice() {
                    let pins = entry
                        .prop(pins_field)
                        .and_then(PropertyValue::cells)
                        .ok_or_else(|| Error::missing_property(&entry.path, pins_field))?;
                    let function = entry
                        .prop(function_field)
                        .and_then(PropertyValue::as_u64)
                        .ok_or_else(|| Error::missing_property(&entry.path, function_field))?;
                    let function_label = label(function_field);
                    for (j, &pin) in pins.iter().enumerate() {
                        let j = j.to_string();
                        record.fields.push(emit.shared_field(
                            pins_field,
                            join_label(&[root.as_str(), pin_label.as_str(), j.as_str()]),
                            SymbolValue::Int(pin),
                        )?);
                        record.fields.push(emit.shared_field(
                            function_field,
                            join_label(&[root.as_str(), function_label.as_str(), j.as_str()]),
                            SymbolValue::Int(function),
                        )?);
                        record.pins.push(PinConfig { pin, function });
                    }
                } else {
                    let pin_props = entry.props.iter().filter(|(k, _)| {
                        !matches!(k.as_str(), HANDLE_PROP | LEGACY_HANDLE_PROP | STATUS_PROP)
                    });
                    for (prop, value) in pin_props {
                        let pairs = value
                            .cells()
                            .filter(|c| c.len() % 2 == 0)
                            .ok_or_else(|| {
                                Error::invalid_property(
                                    &entry.path,
                                    prop,
                                    "expected (pin, function) pairs",
                                )
                            })?;
                        let key = join_label(&[root.as_str(), pin_label.as_str(), label(prop).as_str()]);
                        let numbered = pairs.len() > 2;
                        for (j, pair) in pairs.chunks(2).enumerate() {
                            let j = if numbered { j.to_string() } else { String::new() };
                            let (pin, function) = (pair[0], pair[1]);
                            record.fields.push(emit.shared_field(
                                &fields[0],
                                join_label(&[key.as_str(), j.as_str()]),
                                SymbolValue::Int(pin),
                            )?);
                            record.fields.push(emit.shared_field(
                                "function",
                                join_label(&[key.as_str(), "FUNCTION", j.as_str()]),
                                SymbolValue::Int(function),
                            )?);
                            record.pins.push(PinConfig { pin, function });
                        }
                    }
                }
            }
            records.push(record);
        }
        Ok(records)
    }
}

/// Emit a plain property: one symbol, or one per element of a list.
pub(super) fn extract_single(
    emit: &mut Emitter,
    base: &str,
    property: &str,
    value: &PropertyValue,
) -> Result<Vec<StructuredRecord>> {
    let root = join_label(&[base.to_string(), label(property)]);
    let mut record = StructuredRecord::new(property, 0);
    match value {
        PropertyValue::IntList(values) => {
            for (i, &v) in values.iter().enumerate() {
                record.fields.push(emit.field(
                    &format!("{property}[{i}]"),
                    format!("{root}_{i}"),
                    SymbolValue::Int(v),
                )?);
            }
        }
        PropertyValue::StrList(values) => {
            for (i, v) in values.iter().enumerate() {
                record.fields.push(emit.field(
                    &format!("{property}[{i}]"),
                    format!("{root}_{i}"),
                    SymbolValue::Str(v.clone()),
                )?);
            }
        }
        scalar => {
            let value = match scalar {
                PropertyValue::Int(v) => SymbolValue::Int(*v),
                PropertyValue::Str(s) => SymbolValue::Str(s.clone()),
                _ => SymbolValue::Int(1),
            };
            record.fields.push(emit.field(property, root, value)?);
        }
    }
    Ok(vec![record])
}
