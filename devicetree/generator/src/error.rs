// Licensed under the Apache-2.0 license

//! Error kinds raised by the generator.
//!
//! Every error is fatal: a run either produces a complete symbol table and
//! record set or nothing at all. Errors concerning a property name the node
//! path and the property so the offending source line can be found.

use thiserror::Error;

/// Errors that can occur while reducing the tree, resolving bindings, or
/// extracting symbols.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The tree is missing its root, or the root itself is disabled.
    #[error("malformed device tree: {0}")]
    MalformedTree(String),

    /// Two enabled nodes declare the same handle.
    #[error("handle {handle} is declared by both {first} and {second}")]
    DuplicateHandle {
        handle: u64,
        first: String,
        second: String,
    },

    /// A chosen entry points at a path that is not an enabled node.
    #[error("chosen entry {selector} points at {target}, which is not an enabled node")]
    UnknownNode { selector: String, target: String },

    /// A property references a handle no enabled node owns.
    #[error("{path}: property {property} references handle {handle}, which no enabled node owns")]
    UnresolvedHandle {
        path: String,
        property: String,
        handle: u64,
    },

    /// A node that must be decoded through its binding has none.
    #[error("{path}: property {property} needs the binding of {target} (compatible {compatible}), which was not loaded")]
    MissingSchema {
        path: String,
        property: String,
        target: String,
        compatible: String,
    },

    /// Two extraction events produced the same fully-qualified name.
    #[error("{path}: property {property} generates {name}, already defined by {first}")]
    SymbolCollision {
        name: String,
        path: String,
        property: String,
        first: String,
    },

    /// A binding is inconsistent with the cells it is asked to describe.
    #[error("binding {compatible}: {reason}")]
    InvalidSchema { compatible: String, reason: String },

    /// A property value does not have the shape its extractor requires.
    #[error("{path}: property {property}: {reason}")]
    InvalidProperty {
        path: String,
        property: String,
        reason: String,
    },

    /// A property required for decoding is absent.
    #[error("{path}: missing required property {property}")]
    MissingProperty { path: String, property: String },

    /// Interrupts are declared but no interrupt-parent can be found.
    #[error("{path}: property {property} needs an interrupt-parent on the node or one of its ancestors")]
    NoInterruptParent { path: String, property: String },

    /// The schema-driven scan produced nothing.
    #[error("no information parsed from the device tree; check that the bindings match its compatibles")]
    EmptyResult,
}

/// Result type for generator operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_property(path: &str, property: &str, reason: impl Into<String>) -> Self {
        Error::InvalidProperty {
            path: path.to_string(),
            property: property.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing_property(path: &str, property: &str) -> Self {
        Error::MissingProperty {
            path: path.to_string(),
            property: property.to_string(),
        }
    }

    pub(crate) fn invalid_schema(compatible: &str, reason: impl Into<String>) -> Self {
        Error::InvalidSchema {
            compatible: compatible.to_string(),
            reason: reason.into(),
        }
    }
}
