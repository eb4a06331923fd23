// Licensed under the Apache-2.0 license

//! Utility functions for label conversion, path handling and formatting.
//!
//! Generated symbols are C preprocessor identifiers, so every label component
//! goes through [`label`] before it is joined with [`join_label`].

/// Converts a name to an upper-case label component.
///
/// `-` and `,` are transliterated to `_`, everything else is upper-cased.
///
/// # Examples
/// ```
/// use mcu_devicetree_generator::util::label;
/// assert_eq!(label("st,stm32-usart"), "ST_STM32_USART");
/// assert_eq!(label("40011000"), "40011000");
/// ```
pub fn label(name: &str) -> String {
    name.replace(['-', ','], "_").to_uppercase()
}

/// Joins label components with `_`, skipping empty components.
///
/// # Examples
/// ```
/// use mcu_devicetree_generator::util::join_label;
/// assert_eq!(join_label(&["UART0", "", "BASE_ADDRESS", "0"]), "UART0_BASE_ADDRESS_0");
/// ```
pub fn join_label<S: AsRef<str>>(parts: &[S]) -> String {
    let mut result = String::new();
    for part in parts.iter().map(AsRef::as_ref).filter(|p| !p.is_empty()) {
        if !result.is_empty() {
            result.push('_');
        }
        result.push_str(part);
    }
    result
}

/// Formats an address the way the generated headers spell them.
///
/// # Examples
/// ```
/// use mcu_devicetree_generator::util::hex_literal;
/// assert_eq!(hex_literal(0), "0x0");
/// assert_eq!(hex_literal(0x4001_1000), "0x40011000");
/// ```
pub fn hex_literal(val: u64) -> String {
    format!("{val:#x}")
}

/// Returns the final segment of a node path (`/` for the root).
pub fn node_name(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some((_, "")) | None => path,
        Some((_, name)) => name,
    }
}

/// Returns the unit-address part of a node name (after `@`), or the whole
/// name when it has none.
pub fn unit_suffix(name: &str) -> &str {
    match name.split_once('@') {
        Some((_, unit)) => unit,
        None => name,
    }
}

/// Returns the parent path of a node path, or `None` for the root.
pub fn parent_path(path: &str) -> Option<&str> {
    if path == "/" {
        return None;
    }
    match path.rsplit_once('/') {
        Some(("", _)) => Some("/"),
        Some((parent, _)) => Some(parent),
        None => None,
    }
}

/// Appends a child name to a node path.
pub fn child_path(parent: &str, name: &str) -> String {
    if parent == "/" {
        format!("/{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// Lists the paths from the root down to `path`, inclusive.
///
/// # Examples
/// ```
/// use mcu_devicetree_generator::util::path_chain;
/// assert_eq!(path_chain("/soc/i2c@0/eeprom@50"), ["/", "/soc", "/soc/i2c@0", "/soc/i2c@0/eeprom@50"]);
/// ```
pub fn path_chain(path: &str) -> Vec<String> {
    let mut chain = vec!["/".to_string()];
    let mut current = String::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        current.push('/');
        current.push_str(segment);
        chain.push(current.clone());
    }
    chain
}

/// Returns true if `path` lies strictly below `ancestor`.
pub fn is_descendant(path: &str, ancestor: &str) -> bool {
    if ancestor == "/" {
        return path != "/";
    }
    path.len() > ancestor.len() + 1
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'/'
}

/// Number of 8-column tab stops a `#define` label occupies.
pub(crate) fn tab_count(len: usize) -> usize {
    if len % 8 != 0 {
        (len + 7) >> 3
    } else {
        (len >> 3) + 1
    }
}
