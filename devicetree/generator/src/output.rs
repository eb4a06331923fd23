// Licensed under the Apache-2.0 license

//! Output types and the artifact writers.
//!
//! [`GeneratedDefs`] is the path-keyed symbol view and renders the C include
//! file and the key=value file. [`GeneratedRecords`] is the compatible-keyed
//! instance view; it renders the boot-time pin configuration table and one
//! driver instantiation file per compatible with a `#driver_init` template,
//! and serializes to JSON for downstream record emission.
//!
//! ## Generated Include Structure
//!
//! ```text
//! /**************************************************
//!  * Generated include file for st,stm32f429
//!  *               DO NOT MODIFY
//!  */
//!
//! #ifndef _DEVICE_TREE_BOARD_H
//! #define _DEVICE_TREE_BOARD_H
//!
//! /* uart@40011000 */
//! #define UART0_BASE_ADDRESS_0      0x40011000
//! #define UART0_SIZE_0              1024
//! #define UART0_BASE_ADDRESS        UART0_BASE_ADDRESS_0
//! #define UART0_SIZE                UART0_SIZE_0
//!
//! #endif
//! ```

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::schema::{DriverInit, InitMember, InitValue};
use crate::types::{NodeDefs, NodeRecords, PinConfig, SymbolTable, SymbolValue};
use crate::util::{label, node_name, tab_count};

const INCLUDE_GUARD: &str = "_DEVICE_TREE_BOARD_H";
const PIN_CONFIG_GUARD: &str = "_PIN_CONFIG_INIT_H";

//=============================================================================
// Generated Types
//=============================================================================

/// The symbol view of a run.
#[derive(Clone, Debug)]
pub struct GeneratedDefs {
    /// Canonical compatible of the root node, named in the banner.
    pub root_compatible: Option<String>,
    pub table: SymbolTable,
}

/// The record view of a run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GeneratedRecords {
    /// Per compatible, the records of every instance in traversal order.
    pub instances: BTreeMap<String, Vec<NodeRecords>>,
    /// Records of the force-extracted regions, keyed by chosen selector.
    pub chosen: BTreeMap<String, NodeRecords>,
    /// Boot-time pin configuration, keyed by pin controller compatible.
    pub pin_config: BTreeMap<String, Vec<PinConfig>>,
    /// Instantiation templates of the compatibles that have instances.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub driver_init: BTreeMap<String, DriverInit>,
}

//=============================================================================
// Include file
//=============================================================================

/// Nodes sorted by path, each with its symbols and aliases sorted by name.
fn sorted_nodes(table: &SymbolTable) -> Vec<NodeDefs> {
    let mut nodes: Vec<NodeDefs> = table.nodes().cloned().collect();
    nodes.sort_by(|a, b| a.path.cmp(&b.path));
    for node in &mut nodes {
        node.symbols.sort_by(|a, b| a.name.cmp(&b.name));
        node.aliases.sort_by(|a, b| a.alias.cmp(&b.alias));
    }
    nodes
}

fn write_define(f: &mut fmt::Formatter<'_>, name: &str, value: &dyn fmt::Display, tabstop: usize) -> fmt::Result {
    let define = format!("#define {name}");
    write!(f, "{define}")?;
    for _ in 0..(tabstop + 1).saturating_sub(tab_count(define.len())) {
        write!(f, "\t")?;
    }
    writeln!(f, "{value}")
}

/// Tab stop the values of `node` are aligned to.
fn value_tabstop(node: &NodeDefs) -> usize {
    let longest = node
        .symbols
        .iter()
        .map(|s| s.name.len())
        .chain(node.aliases.iter().map(|a| a.alias.len()))
        .max()
        .unwrap_or(0)
        + "#define ".len();
    let tabstop = tab_count(longest);
    if tabstop * 8 - longest <= 2 {
        tabstop + 1
    } else {
        tabstop
    }
}

/// The C include file, rendered on display.
pub struct IncludeFile<'a> {
    defs: &'a GeneratedDefs,
    fixup: Option<&'a str>,
}

impl fmt::Display for IncludeFile<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let compatible = self.defs.root_compatible.as_deref().unwrap_or("unknown");
        writeln!(f, "/**************************************************")?;
        writeln!(f, " * Generated include file for {compatible}")?;
        writeln!(f, " *               DO NOT MODIFY")?;
        writeln!(f, " */")?;
        writeln!(f)?;
        writeln!(f, "#ifndef {INCLUDE_GUARD}")?;
        writeln!(f, "#define {INCLUDE_GUARD}")?;
        writeln!(f)?;

        for node in sorted_nodes(&self.defs.table) {
            writeln!(f, "/* {} */", node_name(&node.path))?;
            let tabstop = value_tabstop(&node);
            for symbol in &node.symbols {
                write_define(f, &symbol.name, &symbol.value, tabstop)?;
            }
            for alias in &node.aliases {
                write_define(f, &alias.alias, &alias.target, tabstop)?;
            }
            writeln!(f)?;
        }

        if let Some(fixup) = self.fixup {
            writeln!(f)?;
            writeln!(f, "/* Following definitions fixup the generated include */")?;
            write!(f, "{fixup}")?;
            if !fixup.ends_with('\n') {
                writeln!(f)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "#endif")
    }
}

/// The key=value file, with aliases resolved to values.
pub struct KeyValueFile<'a> {
    defs: &'a GeneratedDefs,
}

impl fmt::Display for KeyValueFile<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in sorted_nodes(&self.defs.table) {
            writeln!(f, "# {}", node_name(&node.path))?;
            for symbol in &node.symbols {
                writeln!(f, "{}={}", symbol.name, symbol.value)?;
            }
            for alias in &node.aliases {
                match node.lookup(&alias.target) {
                    Some(value) => writeln!(f, "{}={value}", alias.alias)?,
                    None => writeln!(f, "{}={}", alias.alias, alias.target)?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl GeneratedDefs {
    /// The C include file. `fixup` is appended verbatim before the closing
    /// `#endif`.
    pub fn include_file<'a>(&'a self, fixup: Option<&'a str>) -> IncludeFile<'a> {
        IncludeFile { defs: self, fixup }
    }

    pub fn keyvalue_file(&self) -> KeyValueFile<'_> {
        KeyValueFile { defs: self }
    }

    /// Value of a symbol or alias.
    pub fn lookup(&self, name: &str) -> Option<&SymbolValue> {
        self.table.lookup(name)
    }
}

//=============================================================================
// Pin configuration and records
//=============================================================================

/// The boot-time pin configuration tables, rendered on display.
pub struct PinConfigFile<'a> {
    records: &'a GeneratedRecords,
}

impl fmt::Display for PinConfigFile<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "/**************************************************")?;
        writeln!(f, " * Generated pin configuration")?;
        writeln!(f, " *               DO NOT MODIFY")?;
        writeln!(f, " */")?;
        writeln!(f)?;
        writeln!(f, "#ifndef {PIN_CONFIG_GUARD}")?;
        writeln!(f, "#define {PIN_CONFIG_GUARD}")?;
        for (compatible, pins) in &self.records.pin_config {
            writeln!(f)?;
            writeln!(
                f,
                "static const struct pin_config {}_pinconf [] = {{",
                label(compatible).to_lowercase()
            )?;
            for pin in pins {
                writeln!(f, "\t{{{}, {}}},", pin.pin, pin.function)?;
            }
            writeln!(f, "}};")?;
        }
        writeln!(f)?;
        writeln!(f, "#endif /* {PIN_CONFIG_GUARD} */")
    }
}

//=============================================================================
// Driver instantiation
//=============================================================================

/// One instance as the driver initializers see it.
struct DriverInstance<'a> {
    /// C identifier prefix of the compatible (`acme_uart`).
    prefix: &'a str,
    /// Instance name: the `label` property, else the base label.
    name: String,
    records: &'a NodeRecords,
}

impl<'a> DriverInstance<'a> {
    fn new(prefix: &'a str, records: &'a NodeRecords) -> Self {
        let name = records
            .records
            .iter()
            .find(|r| r.property == "label")
            .and_then(|r| r.fields.first())
            .and_then(|f| match &f.value {
                SymbolValue::Str(s) => Some(s.clone()),
                _ => None,
            })
            .unwrap_or_else(|| records.label.clone());
        Self {
            prefix,
            name,
            records,
        }
    }

    /// Cell `index` of the first occurrence of `property`, or 0 when the
    /// instance does not carry it.
    fn value(&self, property: &str, index: usize) -> String {
        let wanted = label(property);
        self.records
            .records
            .iter()
            .find(|r| r.index == 0 && label(&r.property) == wanted)
            .and_then(|r| r.fields.get(index))
            .map_or_else(|| "0".to_string(), |f| f.value.to_string())
    }

    /// (irq, priority, handler suffix) of every `interrupts` occurrence.
    fn irqs(&self) -> Vec<(String, String, String)> {
        self.records
            .records
            .iter()
            .filter(|r| r.property == "interrupts")
            .map(|r| {
                let cell = |i: usize| {
                    r.fields
                        .get(i)
                        .map_or_else(|| "0".to_string(), |f| f.value.to_string())
                };
                let handler = r.name.clone().unwrap_or_else(|| "isr".to_string());
                (cell(0), cell(1), handler)
            })
            .collect()
    }

    fn irq_func(&self) -> String {
        format!("{}_irq_config_{}", self.prefix, self.name)
    }

    fn device(&self) -> String {
        format!("{}_dev_{}", self.prefix, self.name)
    }
}

/// The driver instantiation file of one compatible, rendered on display.
pub struct DriverInitFile<'a> {
    compatible: &'a str,
    init: &'a DriverInit,
    instances: &'a [NodeRecords],
}

impl DriverInitFile<'_> {
    /// File name the driver code includes (`acme_uart_init.h`).
    pub fn file_name(&self) -> String {
        format!("{}_init.h", self.prefix())
    }

    fn prefix(&self) -> String {
        label(self.compatible).to_lowercase()
    }

    fn members(
        &self,
        f: &mut fmt::Formatter<'_>,
        instance: &DriverInstance,
        members: &[InitMember],
        depth: usize,
    ) -> fmt::Result {
        let indent = "\t".repeat(depth);
        let has_irqs = !instance.irqs().is_empty();
        for member in members {
            match &member.value {
                InitValue::Property {
                    property,
                    index,
                    cast,
                } => writeln!(
                    f,
                    "{indent}.{} = {}{},",
                    member.name,
                    cast.as_deref().unwrap_or(""),
                    instance.value(property, *index)
                )?,
                InitValue::IrqConfigFunc if has_irqs => {
                    if let Some(flag) = &self.init.irq_config_flag {
                        writeln!(f, "#ifdef {flag}")?;
                    }
                    writeln!(f, "{indent}.{} = {},", member.name, instance.irq_func())?;
                    if let Some(flag) = &self.init.irq_config_flag {
                        writeln!(f, "#endif /* {flag} */")?;
                    }
                }
                InitValue::IrqConfigFunc => {}
                InitValue::Nested(nested) => {
                    writeln!(f, "{indent}.{} = {{", member.name)?;
                    self.members(f, instance, nested, depth + 1)?;
                    writeln!(f, "{indent}}},")?;
                }
            }
        }
        Ok(())
    }

    fn instance(&self, f: &mut fmt::Formatter<'_>, instance: &DriverInstance) -> fmt::Result {
        let prefix = instance.prefix;
        let name = &instance.name;
        let irqs = instance.irqs();
        let flag = self.init.irq_config_flag.as_deref();

        if !irqs.is_empty() {
            writeln!(f)?;
            if let Some(flag) = flag {
                writeln!(f, "#ifdef {flag}")?;
            }
            writeln!(f, "static void {}(struct device *dev);", instance.irq_func())?;
            if let Some(flag) = flag {
                writeln!(f, "#endif /* {flag} */")?;
            }
        }

        for init_struct in &self.init.structs {
            writeln!(f)?;
            writeln!(
                f,
                "static struct {prefix}_{0} {prefix}_{0}_{name} = {{",
                init_struct.name
            )?;
            self.members(f, instance, &init_struct.members, 1)?;
            writeln!(f, "}};")?;
        }

        let pointer = |present: bool, target: String| {
            if present {
                format!("&{target}")
            } else {
                "NULL".to_string()
            }
        };
        writeln!(f)?;
        writeln!(f, "DEVICE_AND_API_INIT({},", instance.device())?;
        writeln!(f, "\t\t    \"{name}\",")?;
        writeln!(f, "\t\t    &{prefix}_init,")?;
        for part in ["data", "config"] {
            writeln!(
                f,
                "\t\t    {},",
                pointer(self.init.has_struct(part), format!("{prefix}_{part}_{name}"))
            )?;
        }
        writeln!(f, "\t\t    {},", self.init.init_prio)?;
        writeln!(f, "\t\t    CONFIG_KERNEL_INIT_PRIORITY_DEVICE,")?;
        writeln!(
            f,
            "\t\t    {});",
            pointer(self.init.api.is_some(), format!("{prefix}_api"))
        )?;

        if !irqs.is_empty() {
            writeln!(f)?;
            if let Some(flag) = flag {
                writeln!(f, "#ifdef {flag}")?;
            }
            writeln!(f, "static void {}(struct device *dev)", instance.irq_func())?;
            writeln!(f, "{{")?;
            for (irq, priority, handler) in &irqs {
                writeln!(f, "\tIRQ_CONNECT({irq}, {priority},")?;
                writeln!(f, "\t\t    {prefix}_{handler},")?;
                writeln!(f, "\t\t    DEVICE_GET({}),", instance.device())?;
                writeln!(f, "\t\t    0);")?;
                writeln!(f, "\tirq_enable({irq});")?;
            }
            writeln!(f, "}}")?;
            if let Some(flag) = flag {
                writeln!(f, "#endif /* {flag} */")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for DriverInitFile<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.prefix();
        let guard = format!("_{}_INIT_H", prefix.to_uppercase());
        writeln!(f, "/**************************************************")?;
        writeln!(f, " * Generated include file for {}", self.compatible)?;
        writeln!(f, " *               DO NOT MODIFY")?;
        writeln!(f, " */")?;
        writeln!(f)?;
        writeln!(f, "#ifndef {guard}")?;
        writeln!(f, "#define {guard}")?;
        writeln!(f)?;
        writeln!(f, "static int {prefix}_init(struct device *dev);")?;
        if let Some(api) = &self.init.api {
            writeln!(f, "static const struct {api} {prefix}_api;")?;
        }
        for records in self.instances {
            self.instance(f, &DriverInstance::new(&prefix, records))?;
        }
        writeln!(f)?;
        writeln!(f, "#endif /* {guard} */")
    }
}

impl GeneratedRecords {
    pub fn pin_config_file(&self) -> PinConfigFile<'_> {
        PinConfigFile { records: self }
    }

    /// One instantiation file per compatible that has a template.
    pub fn driver_init_files(&self) -> Vec<DriverInitFile<'_>> {
        self.driver_init
            .iter()
            .map(|(compatible, init)| DriverInitFile {
                compatible,
                init,
                instances: self
                    .instances
                    .get(compatible)
                    .map(Vec::as_slice)
                    .unwrap_or_default(),
            })
            .collect()
    }

    /// Pretty-printed JSON of the whole record view.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RawSchema, Schema};
    use crate::types::{ExtractedSymbol, RecordField, StructuredRecord};

    fn defs() -> GeneratedDefs {
        let mut table = SymbolTable::new();
        for (name, value) in [
            ("UART0_SIZE_0", SymbolValue::Int(256)),
            ("UART0_BASE_ADDRESS_0", SymbolValue::Hex(0x1000)),
        ] {
            table
                .insert_symbol("/soc/uart@1000", "reg", ExtractedSymbol::new(name, value))
                .unwrap();
        }
        table
            .insert_alias("/soc/uart@1000", "reg", "UART0_SIZE", "UART0_SIZE_0")
            .unwrap();
        table
            .insert_symbol(
                "dummy-flash",
                "chosen",
                ExtractedSymbol::new("CONFIG_FLASH_SIZE", SymbolValue::Int(0)),
            )
            .unwrap();
        GeneratedDefs {
            root_compatible: Some("acme,board".to_string()),
            table,
        }
    }

    #[test]
    fn test_include_file() {
        let text = defs().include_file(None).to_string();
        let expected = "\
/**************************************************
 * Generated include file for acme,board
 *               DO NOT MODIFY
 */

#ifndef _DEVICE_TREE_BOARD_H
#define _DEVICE_TREE_BOARD_H

/* uart@1000 */
#define UART0_BASE_ADDRESS_0\t0x1000
#define UART0_SIZE_0\t\t256
#define UART0_SIZE\t\tUART0_SIZE_0

/* dummy-flash */
#define CONFIG_FLASH_SIZE\t0

#endif
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_include_file_fixup() {
        let text = defs()
            .include_file(Some("#define EXTRA 1"))
            .to_string();
        assert!(text.ends_with(
            "\n/* Following definitions fixup the generated include */\n#define EXTRA 1\n\n#endif\n"
        ));
    }

    #[test]
    fn test_keyvalue_file() {
        let text = defs().keyvalue_file().to_string();
        assert!(text.starts_with("# uart@1000\nUART0_BASE_ADDRESS_0=0x1000\nUART0_SIZE_0=256\nUART0_SIZE=256\n\n"));
        assert!(text.contains("# dummy-flash\nCONFIG_FLASH_SIZE=0\n"));
    }

    #[test]
    fn test_pin_config_file() {
        let mut records = GeneratedRecords::default();
        records.pin_config.insert(
            "st,stm32-pinmux".to_string(),
            vec![
                PinConfig { pin: 9, function: 7 },
                PinConfig { pin: 10, function: 7 },
            ],
        );
        let text = records.pin_config_file().to_string();
        assert!(text.contains(
            "static const struct pin_config st_stm32_pinmux_pinconf [] = {\n\t{9, 7},\n\t{10, 7},\n};\n"
        ));
        assert!(text.ends_with("#endif /* _PIN_CONFIG_INIT_H */\n"));
    }

    #[test]
    fn test_records_json() {
        let mut records = GeneratedRecords::default();
        let mut record = StructuredRecord::new("interrupts", 0);
        record.cell_parent = Some("/soc/nvic".to_string());
        records.instances.insert(
            "acme,uart".to_string(),
            vec![NodeRecords {
                path: "/soc/uart@1000".to_string(),
                compatible: Some("acme,uart".to_string()),
                label: "UART0".to_string(),
                records: vec![record],
            }],
        );
        let json: serde_json::Value = serde_json::from_str(&records.to_json().unwrap()).unwrap();
        assert_eq!(
            json["instances"]["acme,uart"][0]["records"][0]["cell_parent"],
            "/soc/nvic"
        );
        assert!(json["instances"]["acme,uart"][0]["records"][0]
            .get("name")
            .is_none());
    }

    const UART_INIT: &str = r##"
properties:
  - compatible:
      constraint: "acme,uart"
"#driver_init":
  - structs:
      - config:
          - base:
              value: reg[0]
              cast: "(u8_t *)"
          - irq_config_func:
              value: interrupts
      - data:
          - baud_rate:
              value: current-speed
  - params:
      - api: uart_driver_api
      - init_prio: PRE_KERNEL_1
      - irq_config_flag: CONFIG_UART_INTERRUPT_DRIVEN
"##;

    fn field(name: &str, value: SymbolValue) -> RecordField {
        RecordField {
            name: name.to_string(),
            value,
            symbol: None,
        }
    }

    fn uart_instance() -> NodeRecords {
        let mut label = StructuredRecord::new("label", 0);
        label.fields = vec![field("label", SymbolValue::Str("UART_0".to_string()))];
        let mut reg = StructuredRecord::new("reg", 0);
        reg.fields = vec![
            field("base", SymbolValue::Hex(0x1000)),
            field("size", SymbolValue::Int(256)),
        ];
        let mut irq = StructuredRecord::new("interrupts", 0);
        irq.fields = vec![
            field("irq", SymbolValue::Int(37)),
            field("priority", SymbolValue::Int(3)),
        ];
        irq.cell_parent = Some("/soc/nvic".to_string());
        NodeRecords {
            path: "/soc/uart@1000".to_string(),
            compatible: Some("acme,uart".to_string()),
            label: "UART0".to_string(),
            records: vec![label, reg, irq],
        }
    }

    fn driver_records(doc: &str, instance: NodeRecords) -> GeneratedRecords {
        let raw = RawSchema::from_yaml(doc).unwrap();
        let schema = Schema::resolve("acme,uart", &raw).unwrap();
        let mut records = GeneratedRecords::default();
        records
            .instances
            .insert("acme,uart".to_string(), vec![instance]);
        records
            .driver_init
            .insert("acme,uart".to_string(), schema.driver_init.unwrap());
        records
    }

    #[test]
    fn test_driver_init_file() {
        let records = driver_records(UART_INIT, uart_instance());
        let files = records.driver_init_files();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name(), "acme_uart_init.h");
        let expected = "\
/**************************************************
 * Generated include file for acme,uart
 *               DO NOT MODIFY
 */

#ifndef _ACME_UART_INIT_H
#define _ACME_UART_INIT_H

static int acme_uart_init(struct device *dev);
static const struct uart_driver_api acme_uart_api;

#ifdef CONFIG_UART_INTERRUPT_DRIVEN
static void acme_uart_irq_config_UART_0(struct device *dev);
#endif /* CONFIG_UART_INTERRUPT_DRIVEN */

static struct acme_uart_config acme_uart_config_UART_0 = {
\t.base = (u8_t *)0x1000,
#ifdef CONFIG_UART_INTERRUPT_DRIVEN
\t.irq_config_func = acme_uart_irq_config_UART_0,
#endif /* CONFIG_UART_INTERRUPT_DRIVEN */
};

static struct acme_uart_data acme_uart_data_UART_0 = {
\t.baud_rate = 0,
};

DEVICE_AND_API_INIT(acme_uart_dev_UART_0,
\t\t    \"UART_0\",
\t\t    &acme_uart_init,
\t\t    &acme_uart_data_UART_0,
\t\t    &acme_uart_config_UART_0,
\t\t    PRE_KERNEL_1,
\t\t    CONFIG_KERNEL_INIT_PRIORITY_DEVICE,
\t\t    &acme_uart_api);

#ifdef CONFIG_UART_INTERRUPT_DRIVEN
static void acme_uart_irq_config_UART_0(struct device *dev)
{
\tIRQ_CONNECT(37, 3,
\t\t    acme_uart_isr,
\t\t    DEVICE_GET(acme_uart_dev_UART_0),
\t\t    0);
\tirq_enable(37);
}
#endif /* CONFIG_UART_INTERRUPT_DRIVEN */

#endif /* _ACME_UART_INIT_H */
";
        assert_eq!(files[0].to_string(), expected);
    }

    #[test]
    fn test_driver_init_without_interrupts() {
        let doc = r##"
"#driver_init":
  structs:
    - config:
        clock:
          - bits:
              value: clocks[1]
        irq_config_func:
          value: interrupts
  params:
    - init_prio: 50
"##;
        let mut instance = uart_instance();
        instance.records.retain(|r| r.property != "label" && r.property != "interrupts");
        let mut clocks = StructuredRecord::new("clocks", 0);
        clocks.fields = vec![
            field("bus", SymbolValue::Int(3)),
            field("bits", SymbolValue::Int(4)),
        ];
        instance.records.push(clocks);

        let text = driver_records(doc, instance).driver_init_files()[0].to_string();
        // No label property: the instance is named after its base label.
        assert!(text.contains(
            "static struct acme_uart_config acme_uart_config_UART0 = {\n\t.clock = {\n\t\t.bits = 4,\n\t},\n};\n"
        ));
        assert!(text.contains("\t\t    NULL,\n\t\t    &acme_uart_config_UART0,\n\t\t    50,\n"));
        assert!(text.contains("\t\t    NULL);\n"));
        assert!(!text.contains("irq_config"));
        assert!(!text.contains("_api;"));
    }
}
