// Licensed under the Apache-2.0 license

//! Binding schemas and the schema resolver.
//!
//! A [`RawSchema`] is one binding document as the loader delivers it, with
//! file inclusion already expanded. [`resolve`] collapses each schema's
//! inheritance chain into a flat rule list and compiles every rule once into
//! a [`PropertyRule`], so extraction is a direct lookup per property instead
//! of repeated pattern matching.
//!
//! ## Inheritance
//!
//! Local rules come first. Inherited rules are appended in declared
//! inheritance order, and only when no rule of the same name is present yet:
//! local definitions override, and among bases the first listed wins.

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::tree::{Node, PropertyValue};
use crate::util::label;

/// Rule list as written in a binding: a sequence of single-key maps.
pub type RawRuleList = Vec<IndexMap<String, Option<RawRule>>>;

//=============================================================================
// Raw binding documents
//=============================================================================

/// A binding document.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawSchema {
    pub title: Option<String>,
    pub id: Option<String>,
    pub description: Option<String>,
    /// Base bindings, in priority order.
    #[serde(deserialize_with = "one_or_many")]
    pub inherits: Vec<RawSchema>,
    pub properties: RawRuleList,
    /// Field names of the cells this node's specifiers carry.
    #[serde(rename = "#cells")]
    pub cells: Vec<String>,
    /// Label component inserted before cell indices (e.g. `CLOCK`).
    pub cell_string: Option<String>,
    /// Fixed base label replacing `<COMPATIBLE>_<UNIT>`.
    pub base_label: Option<String>,
    /// Append the node's `label` property to its base label.
    #[serde(rename = "use-property-label")]
    pub use_property_label: bool,
    /// Device instantiation template, as one section or a list of sections.
    #[serde(rename = "#driver_init", deserialize_with = "one_or_many")]
    pub driver_init: Vec<RawDriverInit>,
}

/// One `#driver_init` section. Both lists hold single-key maps, merged in
/// order.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawDriverInit {
    /// Struct name (`config`, `data`) to its member layout.
    pub structs: Vec<IndexMap<String, serde_yaml::Value>>,
    /// `api`, `init_prio` and `irq_config_flag`.
    pub params: Vec<IndexMap<String, serde_yaml::Value>>,
}

/// One property rule of a binding document.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RawRule {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub constraint: Option<String>,
    pub generation: Option<Generation>,
    /// Replacement for the default region label component.
    pub label: Option<String>,
    pub use_name_prefix: bool,
    /// Rules applied to the node's descendants.
    pub properties: RawRuleList,
}

/// What a matched property is turned into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Generation {
    /// Symbols plus a structured record.
    Define,
    /// A structured record only.
    Structure,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

fn one_or_many<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(v) => vec![v],
        OneOrMany::Many(v) => v,
    })
}

impl RawSchema {
    /// Parse a binding document from YAML.
    pub fn from_yaml(text: &str) -> serde_yaml::Result<Self> {
        serde_yaml::from_str(text)
    }

    /// The compatible identifier this binding describes: the constraint of
    /// its `compatible` rule.
    pub fn compatible(&self) -> Option<&str> {
        self.properties
            .iter()
            .filter_map(|entry| entry.get("compatible"))
            .flatten()
            .find_map(|rule| rule.constraint.as_deref())
    }
}

//=============================================================================
// Resolved schemas
//=============================================================================

/// Which extractor handles a matched property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExtractorKind {
    /// `reg`: base/size pairs.
    Region,
    /// `interrupts`, or `interrupts-extended` when `extended`.
    Interrupts { extended: bool },
    /// `pinctrl-<index>`.
    Pinctrl { index: usize },
    /// Handle plus cells, counted by the referenced node's `count_key`.
    Cells { count_key: String },
    /// Anything else: scalar, array or string.
    Generic,
}

impl ExtractorKind {
    /// Classify a property by name. `phandle_array` marks properties the
    /// binding declares as `type: phandle-array`.
    pub fn classify(property: &str, phandle_array: bool) -> Self {
        match property {
            "reg" => ExtractorKind::Region,
            "interrupts" => ExtractorKind::Interrupts { extended: false },
            "interrupts-extended" => ExtractorKind::Interrupts { extended: true },
            _ => {
                if let Some(index) = property
                    .strip_prefix("pinctrl-")
                    .and_then(|i| i.parse().ok())
                {
                    ExtractorKind::Pinctrl { index }
                } else if phandle_array || property.contains("clocks") {
                    ExtractorKind::Cells {
                        count_key: cell_count_key(property),
                    }
                } else {
                    ExtractorKind::Generic
                }
            }
        }
    }
}

/// The `#<name>-cells` key a specifier property is counted by.
///
/// # Examples
/// ```
/// use mcu_devicetree_generator::schema::cell_count_key;
/// assert_eq!(cell_count_key("clocks"), "#clock-cells");
/// assert_eq!(cell_count_key("cs-gpios"), "#gpio-cells");
/// ```
pub fn cell_count_key(property: &str) -> String {
    let last = property.rsplit('-').next().unwrap_or(property);
    let singular = last.strip_suffix('s').unwrap_or(last);
    format!("#{singular}-cells")
}

#[derive(Clone, Debug)]
enum Matcher {
    Exact(ExtractorKind),
    Pattern(Regex),
}

/// A compiled property rule.
#[derive(Clone, Debug)]
pub struct PropertyRule {
    /// Property name or pattern as written in the binding.
    pub name: String,
    matcher: Matcher,
    phandle_array: bool,
    pub generation: Option<Generation>,
    pub label: Option<String>,
    pub use_name_prefix: bool,
    /// Rules applied to the node's descendants.
    pub children: Vec<PropertyRule>,
}

fn is_pattern(name: &str) -> bool {
    name.chars().any(|c| "\\.+*?()|[]{}^$".contains(c))
}

impl PropertyRule {
    fn compile(compatible: &str, name: &str, raw: &RawRule) -> Result<Self> {
        let phandle_array = raw.kind.as_deref() == Some("phandle-array");
        let matcher = if is_pattern(name) {
            let re = Regex::new(&format!("^(?:{name})$")).map_err(|e| {
                Error::invalid_schema(compatible, format!("bad property pattern {name:?}: {e}"))
            })?;
            Matcher::Pattern(re)
        } else {
            Matcher::Exact(ExtractorKind::classify(name, phandle_array))
        };
        let children = collapse_rules(&raw.properties)
            .iter()
            .map(|(n, r)| PropertyRule::compile(compatible, n, r))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            name: name.to_string(),
            matcher,
            phandle_array,
            generation: raw.generation,
            label: raw.label.clone(),
            use_name_prefix: raw.use_name_prefix,
            children,
        })
    }

    /// Properties of `node` this rule matches, in node property order, with
    /// the extractor each one goes to.
    pub fn matches<'n>(&'n self, node: &'n Node) -> Vec<(&'n str, &'n PropertyValue, ExtractorKind)> {
        match &self.matcher {
            Matcher::Exact(kind) => node
                .props
                .get_key_value(&self.name)
                .map(|(k, v)| (k.as_str(), v, kind.clone()))
                .into_iter()
                .collect(),
            Matcher::Pattern(re) => node
                .props
                .iter()
                .filter(|(k, _)| re.is_match(k))
                .map(|(k, v)| {
                    (
                        k.as_str(),
                        v,
                        ExtractorKind::classify(k, self.phandle_array),
                    )
                })
                .collect(),
        }
    }
}

//=============================================================================
// Driver instantiation templates
//=============================================================================

/// Member value naming the instance's interrupt configuration function.
const IRQ_CONFIG_VALUE: &str = "interrupts";

/// A compiled `#driver_init` section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DriverInit {
    /// Initializer layouts in declaration order.
    pub structs: Vec<InitStruct>,
    /// Name of the driver's API struct type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<String>,
    pub init_prio: String,
    /// Configuration macro guarding the interrupt setup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub irq_config_flag: Option<String>,
}

/// A named initializer layout (`config`, `data`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InitStruct {
    pub name: String,
    pub members: Vec<InitMember>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InitMember {
    pub name: String,
    pub value: InitValue,
}

/// What a struct member is initialized with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InitValue {
    /// Cell `index` of the first occurrence of `property`, optionally cast.
    Property {
        property: String,
        index: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        cast: Option<String>,
    },
    /// The instance's interrupt configuration function.
    IrqConfigFunc,
    /// A nested struct.
    Nested(Vec<InitMember>),
}

/// Merge a mapping, or a sequence of mappings, into one mapping.
fn merged(compatible: &str, what: &str, value: &serde_yaml::Value) -> Result<serde_yaml::Mapping> {
    match value {
        serde_yaml::Value::Mapping(map) => Ok(map.clone()),
        serde_yaml::Value::Sequence(items) => {
            let mut map = serde_yaml::Mapping::new();
            for item in items {
                map.extend(merged(compatible, what, item)?);
            }
            Ok(map)
        }
        other => Err(Error::invalid_schema(
            compatible,
            format!("#driver_init {what}: expected a mapping, found {other:?}"),
        )),
    }
}

fn scalar(compatible: &str, key: &str, value: &serde_yaml::Value) -> Result<String> {
    match value {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        other => Err(Error::invalid_schema(
            compatible,
            format!("#driver_init {key}: expected a scalar, found {other:?}"),
        )),
    }
}

/// Parse a member source: `interrupts`, `label` or `reg[1]`.
fn member_source(compatible: &str, source: &str, cast: Option<String>) -> Result<InitValue> {
    if source == IRQ_CONFIG_VALUE {
        return Ok(InitValue::IrqConfigFunc);
    }
    let (property, index) = match source.split_once('[') {
        Some((property, rest)) => {
            let index = rest
                .strip_suffix(']')
                .and_then(|i| i.trim().parse().ok())
                .ok_or_else(|| {
                    Error::invalid_schema(compatible, format!("#driver_init: bad member value {source:?}"))
                })?;
            (property, index)
        }
        None => (source, 0),
    };
    Ok(InitValue::Property {
        property: property.to_string(),
        index,
        cast,
    })
}

fn compile_members(compatible: &str, what: &str, value: &serde_yaml::Value) -> Result<Vec<InitMember>> {
    let mut members = Vec::new();
    for (key, body) in merged(compatible, what, value)? {
        let name = scalar(compatible, what, &key)?;
        let fields = merged(compatible, &name, &body)?;
        let value = match fields.get("value") {
            Some(source) => {
                let cast = fields
                    .get("cast")
                    .map(|c| scalar(compatible, "cast", c))
                    .transpose()?;
                member_source(compatible, &scalar(compatible, &name, source)?, cast)?
            }
            None => InitValue::Nested(compile_members(compatible, &name, &body)?),
        };
        members.push(InitMember { name, value });
    }
    Ok(members)
}

impl DriverInit {
    /// Compile the merged `#driver_init` sections of one binding.
    pub fn compile(compatible: &str, sections: &[RawDriverInit]) -> Result<Self> {
        let mut structs: Vec<InitStruct> = Vec::new();
        let mut params = IndexMap::new();
        for section in sections {
            for (name, body) in section.structs.iter().flatten() {
                let members = compile_members(compatible, name, body)?;
                match structs.iter_mut().find(|s| &s.name == name) {
                    Some(existing) => existing.members = members,
                    None => structs.push(InitStruct {
                        name: name.clone(),
                        members,
                    }),
                }
            }
            for (key, value) in section.params.iter().flatten() {
                params.insert(key.as_str(), scalar(compatible, key, value)?);
            }
        }
        let init_prio = params.shift_remove("init_prio").ok_or_else(|| {
            Error::invalid_schema(compatible, "#driver_init needs an init_prio parameter")
        })?;
        Ok(Self {
            structs,
            api: params.shift_remove("api"),
            init_prio,
            irq_config_flag: params.shift_remove("irq_config_flag"),
        })
    }

    pub fn has_struct(&self, name: &str) -> bool {
        self.structs.iter().any(|s| s.name == name)
    }
}

/// The `#driver_init` sections that apply to a binding: its own, or else
/// those of the first base that has any.
fn driver_init_sections(raw: &RawSchema) -> &[RawDriverInit] {
    if !raw.driver_init.is_empty() {
        return &raw.driver_init;
    }
    raw.inherits
        .iter()
        .map(driver_init_sections)
        .find(|sections| !sections.is_empty())
        .unwrap_or_default()
}

/// A binding with its inheritance collapsed and its rules compiled.
#[derive(Clone, Debug)]
pub struct Schema {
    pub compatible: String,
    pub title: Option<String>,
    /// Local rules first, then inherited rules not shadowed.
    pub rules: Vec<PropertyRule>,
    pub cells: Vec<String>,
    pub cell_string: Option<String>,
    pub base_label: Option<String>,
    pub use_property_label: bool,
    pub driver_init: Option<DriverInit>,
}

impl Schema {
    /// Collapse and compile one binding.
    pub fn resolve(compatible: &str, raw: &RawSchema) -> Result<Self> {
        let rules = collapse(raw)
            .iter()
            .map(|(name, rule)| PropertyRule::compile(compatible, name, rule))
            .collect::<Result<Vec<_>>>()?;
        let sections = driver_init_sections(raw);
        let driver_init = if sections.is_empty() {
            None
        } else {
            Some(DriverInit::compile(compatible, sections)?)
        };
        Ok(Self {
            compatible: compatible.to_string(),
            title: raw.title.clone(),
            rules,
            cells: raw.cells.clone(),
            cell_string: raw.cell_string.clone(),
            base_label: raw.base_label.clone(),
            use_property_label: raw.use_property_label,
            driver_init,
        })
    }

    pub fn rule(&self, name: &str) -> Option<&PropertyRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// The cell-string label component, empty when the binding has none.
    pub fn cell_prefix(&self) -> String {
        self.cell_string.as_deref().map(label).unwrap_or_default()
    }
}

fn add_rule(rules: &mut Vec<(String, RawRule)>, name: &str, rule: RawRule) {
    if !rules.iter().any(|(n, _)| n == name) {
        rules.push((name.to_string(), rule));
    }
}

fn collapse_rules(list: &RawRuleList) -> Vec<(String, RawRule)> {
    let mut rules = Vec::new();
    for entry in list {
        for (name, rule) in entry {
            add_rule(&mut rules, name, rule.clone().unwrap_or_default());
        }
    }
    rules
}

fn collapse(raw: &RawSchema) -> Vec<(String, RawRule)> {
    let mut rules = collapse_rules(&raw.properties);
    for base in &raw.inherits {
        for (name, rule) in collapse(base) {
            add_rule(&mut rules, &name, rule);
        }
    }
    rules
}

/// Resolve every binding, keyed by compatible identifier.
pub fn resolve(raw: &BTreeMap<String, RawSchema>) -> Result<BTreeMap<String, Schema>> {
    raw.iter()
        .map(|(compatible, schema)| Ok((compatible.clone(), Schema::resolve(compatible, schema)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{ReducedTree, SourceNode, SourceTree};

    const UART_BASE: &str = r#"
title: UART base
properties:
  - label:
      type: string
      generation: define
  - current-speed:
      type: int
      description: from the base
"#;

    const DEVICE_BASE: &str = r#"
title: Device base
properties:
  - current-speed:
      type: int
      description: from the second base
  - reg:
      type: array
      generation: define
"#;

    fn usart() -> RawSchema {
        let mut raw = RawSchema::from_yaml(
            r#"
title: STM32 USART
properties:
  - compatible:
      type: string
      constraint: "st,stm32-usart"
  - current-speed:
      type: int
      generation: define
  - "pinctrl-\\d+":
      type: array
      generation: define
"#,
        )
        .unwrap();
        raw.inherits = vec![
            RawSchema::from_yaml(UART_BASE).unwrap(),
            RawSchema::from_yaml(DEVICE_BASE).unwrap(),
        ];
        raw
    }

    #[test]
    fn test_local_rules_override_inherited() {
        let schema = Schema::resolve("st,stm32-usart", &usart()).unwrap();
        let names: Vec<_> = schema.rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            ["compatible", "current-speed", "pinctrl-\\d+", "label", "reg"]
        );
        assert_eq!(
            schema.rule("current-speed").unwrap().generation,
            Some(Generation::Define)
        );
    }

    #[test]
    fn test_first_listed_base_wins() {
        let mut raw = RawSchema::default();
        raw.inherits = vec![
            RawSchema::from_yaml(UART_BASE).unwrap(),
            RawSchema::from_yaml(DEVICE_BASE).unwrap(),
        ];
        let schema = Schema::resolve("x", &raw).unwrap();
        // The first base declares current-speed without generation.
        assert_eq!(schema.rule("current-speed").unwrap().generation, None);

        raw.inherits.reverse();
        let schema = Schema::resolve("x", &raw).unwrap();
        let names: Vec<_> = schema.rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["current-speed", "reg", "label"]);
    }

    #[test]
    fn test_nested_inheritance() {
        let mut middle = RawSchema::from_yaml(UART_BASE).unwrap();
        middle.inherits = vec![RawSchema::from_yaml(DEVICE_BASE).unwrap()];
        let mut top = RawSchema::default();
        top.inherits = vec![middle];
        let schema = Schema::resolve("x", &top).unwrap();
        let names: Vec<_> = schema.rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["label", "current-speed", "reg"]);
    }

    #[test]
    fn test_single_inherits_mapping() {
        let raw = RawSchema::from_yaml(
            r#"
inherits:
  title: base
  properties:
    - reg:
        generation: define
"#,
        )
        .unwrap();
        assert_eq!(raw.inherits.len(), 1);
    }

    #[test]
    fn test_compatible_constraint() {
        assert_eq!(usart().compatible(), Some("st,stm32-usart"));
        assert_eq!(RawSchema::default().compatible(), None);
    }

    #[test]
    fn test_rule_matching() {
        let schema = Schema::resolve("st,stm32-usart", &usart()).unwrap();
        let source = SourceTree::with_root(
            SourceNode::new()
                .cells_prop("pinctrl-0", &[1])
                .cells_prop("pinctrl-1", &[2])
                .str_prop("pinctrl-names", "default")
                .cells_prop("reg", &[0x4000, 0x400]),
        );
        let tree = ReducedTree::reduce(&source).unwrap();
        let root = tree.root().unwrap();

        let matched = schema.rule("pinctrl-\\d+").unwrap().matches(root);
        let kinds: Vec<_> = matched.iter().map(|(n, _, k)| (*n, k.clone())).collect();
        assert_eq!(
            kinds,
            [
                ("pinctrl-0", ExtractorKind::Pinctrl { index: 0 }),
                ("pinctrl-1", ExtractorKind::Pinctrl { index: 1 }),
            ]
        );
        let matched = schema.rule("reg").unwrap().matches(root);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].2, ExtractorKind::Region);
        assert!(schema.rule("label").unwrap().matches(root).is_empty());
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            ExtractorKind::classify("clocks", false),
            ExtractorKind::Cells {
                count_key: "#clock-cells".to_string()
            }
        );
        assert_eq!(
            ExtractorKind::classify("cs-gpios", true),
            ExtractorKind::Cells {
                count_key: "#gpio-cells".to_string()
            }
        );
        assert_eq!(
            ExtractorKind::classify("cs-gpios", false),
            ExtractorKind::Generic
        );
        assert_eq!(
            ExtractorKind::classify("pinctrl-names", false),
            ExtractorKind::Generic
        );
        assert_eq!(
            ExtractorKind::classify("interrupts-extended", false),
            ExtractorKind::Interrupts { extended: true }
        );
    }

    #[test]
    fn test_bad_pattern_is_invalid_schema() {
        let raw = RawSchema::from_yaml(
            r#"
properties:
  - "pinctrl-(\\d+":
      generation: define
"#,
        )
        .unwrap();
        assert!(matches!(
            Schema::resolve("bad", &raw),
            Err(Error::InvalidSchema { .. })
        ));
    }

    #[test]
    fn test_child_rules_and_null_bodies() {
        let raw = RawSchema::from_yaml(
            r#"
base_label: FLASH
cell_string: part
properties:
  - interrupt-controller:
  - partitions:
      properties:
        - reg:
            generation: define
            label: offset
"#,
        )
        .unwrap();
        let schema = Schema::resolve("fixed-flash", &raw).unwrap();
        assert!(schema.rule("interrupt-controller").unwrap().generation.is_none());
        let partitions = schema.rule("partitions").unwrap();
        assert_eq!(partitions.children.len(), 1);
        assert_eq!(partitions.children[0].label.as_deref(), Some("offset"));
        assert_eq!(schema.cell_prefix(), "PART");
    }

    #[test]
    fn test_driver_init_template() {
        let raw = RawSchema::from_yaml(
            r##"
"#driver_init":
  - structs:
      - config:
          - base:
              - value: reg[0]
              - cast: "(u32_t)"
          - irq_config_func:
              value: interrupts
  - params:
      - api: uart_driver_api
      - init_prio: 40
"##,
        )
        .unwrap();
        let init = Schema::resolve("acme,uart", &raw).unwrap().driver_init.unwrap();
        assert_eq!(init.api.as_deref(), Some("uart_driver_api"));
        assert_eq!(init.init_prio, "40");
        assert_eq!(init.irq_config_flag, None);
        assert!(init.has_struct("config"));
        assert!(!init.has_struct("data"));
        assert_eq!(
            init.structs[0].members,
            [
                InitMember {
                    name: "base".to_string(),
                    value: InitValue::Property {
                        property: "reg".to_string(),
                        index: 0,
                        cast: Some("(u32_t)".to_string()),
                    },
                },
                InitMember {
                    name: "irq_config_func".to_string(),
                    value: InitValue::IrqConfigFunc,
                },
            ]
        );
    }

    #[test]
    fn test_driver_init_is_inherited() {
        let base = RawSchema::from_yaml(
            r##"
"#driver_init":
  params:
    - init_prio: POST_KERNEL
"##,
        )
        .unwrap();
        let mut raw = usart();
        raw.inherits.push(base);
        let schema = Schema::resolve("st,stm32-usart", &raw).unwrap();
        assert_eq!(schema.driver_init.unwrap().init_prio, "POST_KERNEL");
        assert!(Schema::resolve("st,stm32-usart", &usart())
            .unwrap()
            .driver_init
            .is_none());
    }

    #[test]
    fn test_driver_init_errors() {
        for doc in [
            "\"#driver_init\":\n  params:\n    - api: uart_driver_api\n",
            "\"#driver_init\":\n  structs:\n    - config:\n        base:\n          value: reg[x]\n  params:\n    - init_prio: 1\n",
            "\"#driver_init\":\n  structs:\n    - config: 5\n  params:\n    - init_prio: 1\n",
        ] {
            let raw = RawSchema::from_yaml(doc).unwrap();
            assert!(
                matches!(
                    Schema::resolve("acme,uart", &raw),
                    Err(Error::InvalidSchema { ref compatible, .. }) if compatible == "acme,uart"
                ),
                "{doc}"
            );
        }
    }
}
