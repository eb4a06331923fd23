// Licensed under the Apache-2.0 license

//! File loaders for the tree and the binding directories.
//!
//! Bindings may pull other documents in with `!include` (or `!import`),
//! given either a single file name or a list of them. A name is looked up
//! next to the including file first, then in each binding directory in the
//! order given.

use anyhow::{bail, Context};
use serde_yaml::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::codegen::{generate_resolved, Generated};
use crate::config::GeneratorConfig;
use crate::schema::{self, RawSchema};
use crate::tree::{ReducedTree, SourceTree};

const MAX_INCLUDE_DEPTH: usize = 16;

/// Read a tree in its JSON form.
pub fn load_tree(path: &Path) -> anyhow::Result<SourceTree> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    SourceTree::from_json(&text).with_context(|| format!("failed to parse {}", path.display()))
}

/// All `*.yaml` files under `root`, sorted by path.
fn binding_files(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.with_context(|| format!("failed to scan {}", root.display()))?;
        if entry.file_type().is_file() && entry.path().extension().is_some_and(|x| x == "yaml") {
            paths.push(entry.into_path());
        }
    }
    paths.sort();
    Ok(paths)
}

/// The `constraint` of a document's `compatible` rule.
fn declared_compatible(doc: &Value) -> Option<&str> {
    doc.get("properties")?
        .as_sequence()?
        .iter()
        .find_map(|rule| rule.get("compatible")?.get("constraint")?.as_str())
}

struct Includer<'a> {
    search: &'a [PathBuf],
}

impl Includer<'_> {
    fn locate(&self, name: &str, dir: &Path) -> anyhow::Result<PathBuf> {
        std::iter::once(dir)
            .chain(self.search.iter().map(PathBuf::as_path))
            .map(|d| d.join(name))
            .find(|p| p.is_file())
            .with_context(|| format!("included file {name} not found"))
    }

    fn load(&self, path: &Path, depth: usize) -> anyhow::Result<Value> {
        if depth > MAX_INCLUDE_DEPTH {
            bail!("includes nested too deeply at {}", path.display());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let doc: Value = serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        let dir = path.parent().unwrap_or(Path::new("."));
        self.expand(doc, dir, depth)
            .with_context(|| format!("in {}", path.display()))
    }

    /// Replace every include tag below `value` by the included documents.
    fn expand(&self, value: Value, dir: &Path, depth: usize) -> anyhow::Result<Value> {
        Ok(match value {
            Value::Tagged(tagged) => {
                let tag = tagged.tag.to_string();
                match tag.trim_start_matches('!') {
                    "include" | "import" => match tagged.value {
                        Value::String(name) => self.load(&self.locate(&name, dir)?, depth + 1)?,
                        Value::Sequence(names) => Value::Sequence(
                            names
                                .iter()
                                .map(|n| match n.as_str() {
                                    Some(name) => self.load(&self.locate(name, dir)?, depth + 1),
                                    None => bail!("{tag} expects file names"),
                                })
                                .collect::<anyhow::Result<_>>()?,
                        ),
                        _ => bail!("{tag} expects a file name or a list of file names"),
                    },
                    _ => self.expand(tagged.value, dir, depth)?,
                }
            }
            Value::Sequence(items) => Value::Sequence(
                items
                    .into_iter()
                    .map(|v| self.expand(v, dir, depth))
                    .collect::<anyhow::Result<_>>()?,
            ),
            Value::Mapping(map) => {
                let mut expanded = serde_yaml::Mapping::new();
                for (k, v) in map {
                    expanded.insert(k, self.expand(v, dir, depth)?);
                }
                Value::Mapping(expanded)
            }
            other => other,
        })
    }
}

/// Load the bindings for `compatibles` from `dirs`.
///
/// Files are visited in directory order, then path order. When two files
/// describe the same compatible the first one wins.
pub fn load_bindings(
    dirs: &[PathBuf],
    compatibles: &BTreeSet<String>,
) -> anyhow::Result<BTreeMap<String, RawSchema>> {
    let includer = Includer { search: dirs };
    let mut bindings = BTreeMap::new();
    for dir in dirs {
        for path in binding_files(dir)? {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let doc: Value = serde_yaml::from_str(&text)
                .with_context(|| format!("failed to parse {}", path.display()))?;
            let Some(compatible) = declared_compatible(&doc) else {
                continue;
            };
            if !compatibles.contains(compatible) {
                continue;
            }
            if bindings.contains_key(compatible) {
                log::debug!("{}: {compatible} already bound, skipping", path.display());
                continue;
            }
            let compatible = compatible.to_string();
            let doc = includer.load(&path, 0)?;
            let raw: RawSchema = serde_yaml::from_value(doc)
                .with_context(|| format!("invalid binding {}", path.display()))?;
            log::debug!("Loaded binding {compatible} from {}", path.display());
            bindings.insert(compatible, raw);
        }
    }
    if bindings.is_empty() {
        bail!("Missing YAML information. Check YAML sources");
    }
    log::info!("Loaded {} bindings", bindings.len());
    Ok(bindings)
}

/// Load the tree and its bindings, then run extraction.
pub fn generate_from_files(
    tree: &Path,
    binding_dirs: &[PathBuf],
    config: &GeneratorConfig,
) -> anyhow::Result<Generated> {
    let source = load_tree(tree)?;
    let reduced = ReducedTree::reduce(&source)
        .with_context(|| format!("in {}", tree.display()))?;
    let bindings = load_bindings(binding_dirs, &reduced.compatibles())?;
    let schemas = schema::resolve(&bindings)?;
    Ok(generate_resolved(&reduced, &schemas, config)?)
}
