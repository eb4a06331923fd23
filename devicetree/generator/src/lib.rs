// Licensed under the Apache-2.0 license

//! Devicetree property extraction and symbol generation.
//!
//! This crate compiles a devicetree (already parsed into a [`SourceTree`])
//! and a set of binding schemas into uniquely named constant symbols for a
//! C build, plus structured per-node records for emitting initialized data.
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::{Path, PathBuf};
//! use mcu_devicetree_generator::{generate_from_files, GeneratorConfig};
//!
//! let generated = generate_from_files(
//!     Path::new("board.json"),
//!     &[PathBuf::from("dts/bindings")],
//!     &GeneratorConfig::with_defaults(),
//! ).unwrap();
//! print!("{}", generated.defs.include_file(None));
//! ```
//!
//! ## Module Organization
//!
//! - [`tree`]: Input model and the tree reducer ([`ReducedTree`])
//! - [`schema`]: Binding schemas and inheritance collapsing
//! - [`config`]: Chosen-node selectors ([`GeneratorConfig`])
//! - [`types`]: Symbols, aliases and structured records
//! - [`output`]: Include, key=value, pin table, driver init and JSON writers
//! - [`loader`]: Tree and binding file loading
//! - [`util`]: Label and path helpers
//! - `codegen`: Extraction and record assembly

pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod schema;
pub mod tree;
pub mod types;
pub mod util;

mod codegen;

// Re-export main public API
pub use codegen::{generate, generate_resolved, Generated};
pub use config::GeneratorConfig;
pub use error::{Error, Result};
pub use loader::{generate_from_files, load_bindings, load_tree};
pub use output::{GeneratedDefs, GeneratedRecords};
pub use schema::{RawSchema, Schema};
pub use tree::{PropertyValue, ReducedTree, SourceNode, SourceTree};
