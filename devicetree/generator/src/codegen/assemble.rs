// Licensed under the Apache-2.0 license

//! Record assembly and the chosen-node extractions that run after the
//! schema-driven scan.

use super::*;
use crate::types::PinConfig;

const FLASH_BASE: &str = "CONFIG_FLASH";
const SRAM_BASE: &str = "CONFIG_SRAM";
/// Symbol-table keys for the all-zero fallbacks.
const FLASH_FALLBACK: &str = "dummy-flash";
const SRAM_FALLBACK: &str = "dummy-sram";

const CONSOLE_NAME: &str = "CONFIG_UART_CONSOLE_ON_DEV_NAME";
const LOAD_OFFSET: &str = "CONFIG_FLASH_LOAD_OFFSET";
const LOAD_SIZE: &str = "CONFIG_FLASH_LOAD_SIZE";

impl<'a> Generator<'a> {
    fn chosen(&self, selector: &Option<String>) -> Result<Option<&'a Node>> {
        let tree = self.tree;
        match GeneratorConfig::selector(selector) {
            Some(key) => tree.chosen(key),
            None => Ok(None),
        }
    }

    /// Extract the regions of a chosen node under `base`, or emit the zero
    /// pair under `fallback` when the selection is absent.
    fn force_region(
        &self,
        defs: &mut SymbolTable,
        chosen: &mut BTreeMap<String, NodeRecords>,
        selector: &Option<String>,
        base: &str,
        fallback: &str,
    ) -> Result<Option<&'a Node>> {
        let key = GeneratorConfig::selector(selector);
        let (Some(key), Some(node)) = (key, self.chosen(selector)?) else {
            log::info!("No {base} region chosen, using zero fallback");
            for part in ["BASE_ADDRESS", "SIZE"] {
                defs.insert_symbol(
                    fallback,
                    "chosen",
                    ExtractedSymbol::new(join_label(&[base, part]), SymbolValue::Int(0)),
                )?;
            }
            return Ok(None);
        };

        let mut emit = Emitter {
            defs,
            path: &node.path,
            property: "reg",
            define: true,
        };
        let records = self.extract_regions(
            &mut emit,
            RegionRequest {
                node,
                base,
                names: &[],
                divisor: self.config.region_divisor,
                post_label: None,
            },
        )?;
        chosen.insert(
            key.to_string(),
            NodeRecords {
                path: node.path.clone(),
                compatible: node.compatible().map(str::to_string),
                label: base.to_string(),
                records,
            },
        );
        Ok(Some(node))
    }

    /// Load offset and size of the code partition within flash.
    fn load_window(&self, flash: Option<&Node>) -> Result<(SymbolValue, SymbolValue)> {
        let partition = self.chosen(&self.config.code_partition_selector)?;
        match (flash, partition) {
            (Some(flash), Some(partition)) if flash.path != partition.path => {
                let mut scratch = SymbolTable::new();
                let mut emit = Emitter {
                    defs: &mut scratch,
                    path: &partition.path,
                    property: "reg",
                    define: true,
                };
                self.extract_regions(
                    &mut emit,
                    RegionRequest {
                        node: partition,
                        base: "PARTITION",
                        names: &[],
                        divisor: 1,
                        post_label: Some("offset"),
                    },
                )?;
                let lookup = |name: &str| scratch.lookup(name).cloned().unwrap_or(SymbolValue::Int(0));
                Ok((lookup("PARTITION_OFFSET"), lookup("PARTITION_SIZE")))
            }
            _ => Ok((SymbolValue::Int(0), SymbolValue::Int(0))),
        }
    }

    /// Boot-time pin table: pins of every configuration tagged with the
    /// default tag, keyed by pin controller compatible.
    fn pin_table(
        &self,
        records: &IndexMap<String, NodeRecords>,
    ) -> BTreeMap<String, Vec<PinConfig>> {
        let tree = self.tree;
        let tag = self.config.default_pinctrl_tag.as_str();
        let mut table: BTreeMap<String, Vec<PinConfig>> = BTreeMap::new();
        for node in tree.nodes() {
            let Some(entry) = records.get(&node.path) else {
                continue;
            };
            let pinctrl = entry.records.iter().filter(|r| {
                matches!(
                    ExtractorKind::classify(&r.property, false),
                    ExtractorKind::Pinctrl { .. }
                )
            });
            for record in pinctrl {
                if record.name.as_deref() != Some(tag) {
                    log::warn!(
                        "{}: {} configuration {:?} is not tagged {tag:?}, leaving it out of the pin table",
                        node.path,
                        record.property,
                        record.name.as_deref().unwrap_or("<unnamed>")
                    );
                    continue;
                }
                let Some(controller) = record.cell_parent.as_deref().and_then(|p| tree.node(p))
                else {
                    continue;
                };
                let key = controller.compatible().unwrap_or(controller.name());
                table
                    .entry(key.to_string())
                    .or_default()
                    .extend(record.pins.iter().copied());
            }
        }
        table
    }

    /// Forced extractions, then grouping of records by compatible.
    pub(super) fn assemble(&self, acc: Accumulator) -> Result<Generated> {
        let tree = self.tree;
        let config = self.config;
        let Accumulator { mut defs, mut records } = acc;
        let mut chosen = BTreeMap::new();

        let flash = self.force_region(
            &mut defs,
            &mut chosen,
            &config.flash_selector,
            FLASH_BASE,
            FLASH_FALLBACK,
        )?;
        self.force_region(
            &mut defs,
            &mut chosen,
            &config.sram_selector,
            SRAM_BASE,
            SRAM_FALLBACK,
        )?;

        if let Some(console) = self.chosen(&config.console_selector)? {
            let name = console
                .prop("label")
                .and_then(PropertyValue::as_str)
                .ok_or_else(|| Error::missing_property(&console.path, "label"))?;
            defs.insert_symbol(
                &console.path,
                "label",
                ExtractedSymbol::new(CONSOLE_NAME, SymbolValue::Str(name.to_string())),
            )?;
        }

        let (offset, size) = self.load_window(flash)?;
        let flash_key = flash.map_or(FLASH_FALLBACK, |n| n.path.as_str());
        defs.insert_symbol(flash_key, "chosen", ExtractedSymbol::new(LOAD_OFFSET, offset))?;
        defs.insert_symbol(flash_key, "chosen", ExtractedSymbol::new(LOAD_SIZE, size))?;

        let pin_config = self.pin_table(&records);

        // Instance order is traversal order, whatever order the scan
        // produced records in.
        let mut instances: BTreeMap<String, Vec<NodeRecords>> = BTreeMap::new();
        for node in tree.nodes() {
            let Some(entry) = records.shift_remove(&node.path) else {
                continue;
            };
            if let Some(compatible) = entry.compatible.clone() {
                instances.entry(compatible).or_default().push(entry);
            }
        }

        let driver_init = instances
            .keys()
            .filter_map(|compatible| {
                let init = self.schemas.get(compatible)?.driver_init.as_ref()?;
                Some((compatible.clone(), init.clone()))
            })
            .collect();

        Ok(Generated {
            defs: GeneratedDefs {
                root_compatible: tree.root().and_then(|r| r.compatible()).map(str::to_string),
                table: defs,
            },
            records: GeneratedRecords {
                instances,
                chosen,
                pin_config,
                driver_init,
            },
        })
    }
}
