// Licensed under the Apache-2.0 license

//! Board symbol generation from a devicetree.

use anyhow::{Context, Result};
use mcu_devicetree_generator::{generate_from_files, GeneratorConfig};
use std::path::{Path, PathBuf};

pub struct DtsGenArgs<'a> {
    pub tree: &'a Path,
    pub bindings: &'a [PathBuf],
    pub config: Option<&'a Path>,
    pub fixup: Option<&'a Path>,
    pub keyvalue: bool,
    pub output: Option<&'a Path>,
    pub records: Option<&'a Path>,
    pub pinctrl: Option<&'a Path>,
    pub driver_init: Option<&'a Path>,
}

fn write(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("Output written to: {}", path.display());
    Ok(())
}

/// Run the generator and write the requested artifacts. Every artifact is
/// rendered before the first one is written.
pub fn generate(args: &DtsGenArgs) -> Result<()> {
    log::info!("Generating symbols from: {}", args.tree.display());

    let config = match args.config {
        Some(path) => GeneratorConfig::from_file(path)?,
        None => GeneratorConfig::with_defaults(),
    };
    let fixup = args
        .fixup
        .map(|path| {
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))
        })
        .transpose()?;

    let generated = generate_from_files(args.tree, args.bindings, &config)
        .with_context(|| format!("generation failed for {}", args.tree.display()))?;

    let text = if args.keyvalue {
        generated.defs.keyvalue_file().to_string()
    } else {
        generated.defs.include_file(fixup.as_deref()).to_string()
    };
    let records = args
        .records
        .map(|_| generated.records.to_json())
        .transpose()
        .context("failed to serialize records")?;
    let pinctrl = generated.records.pin_config_file().to_string();
    let driver_init: Vec<(String, String)> = generated
        .records
        .driver_init_files()
        .iter()
        .map(|file| (file.file_name(), file.to_string()))
        .collect();

    match args.output {
        Some(path) => write(path, &text)?,
        None => print!("{text}"),
    }
    if let (Some(path), Some(json)) = (args.records, records) {
        write(path, &json)?;
    }
    if let Some(path) = args.pinctrl {
        write(path, &pinctrl)?;
    }
    if let Some(dir) = args.driver_init {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        if driver_init.is_empty() {
            log::warn!("No binding with a #driver_init template has instances");
        }
        for (name, contents) in &driver_init {
            write(&dir.join(name), contents)?;
        }
    }
    Ok(())
}
