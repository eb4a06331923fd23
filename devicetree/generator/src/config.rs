// Licensed under the Apache-2.0 license

//! Configuration for the chosen-node selections and the pin configuration
//! table.
//!
//! [`GeneratorConfig`] names the well-known `/chosen` selectors the generator
//! force-extracts (flash, RAM, console, code partition). A selector set to
//! `None` (or the empty string, which is how a TOML file spells it) is
//! declared absent: the generator behaves as if the tree had no such chosen
//! entry.
//!
//! # Example
//!
//! ```
//! use mcu_devicetree_generator::config::GeneratorConfig;
//!
//! // Zephyr-style selectors, sizes reported in KiB.
//! let config = GeneratorConfig::with_defaults();
//! assert_eq!(config.flash_selector.as_deref(), Some("zephyr,flash"));
//!
//! // Custom configuration
//! let config = GeneratorConfig::none()
//!     .flash_selector("board,flash")
//!     .region_divisor(1);
//! assert!(config.sram_selector.is_none());
//! ```

use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

/// Selector and naming configuration for a generation run.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GeneratorConfig {
    /// Chosen key designating the flash region (`CONFIG_FLASH_*`).
    pub flash_selector: Option<String>,
    /// Chosen key designating the RAM region (`CONFIG_SRAM_*`).
    pub sram_selector: Option<String>,
    /// Chosen key designating the console device.
    pub console_selector: Option<String>,
    /// Chosen key designating the partition the image is linked into.
    pub code_partition_selector: Option<String>,
    /// Divisor applied to the forced flash and RAM sizes.
    pub region_divisor: u64,
    /// `pinctrl-names` entry whose groups make up the boot-time pin table.
    pub default_pinctrl_tag: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl GeneratorConfig {
    /// Create a configuration with the Zephyr selectors and sizes in KiB.
    pub fn with_defaults() -> Self {
        Self {
            flash_selector: Some("zephyr,flash".to_string()),
            sram_selector: Some("zephyr,sram".to_string()),
            console_selector: Some("zephyr,console".to_string()),
            code_partition_selector: Some("zephyr,code-partition".to_string()),
            region_divisor: 1024,
            default_pinctrl_tag: "default".to_string(),
        }
    }

    /// Create a configuration with every selector declared absent.
    pub fn none() -> Self {
        Self {
            flash_selector: None,
            sram_selector: None,
            console_selector: None,
            code_partition_selector: None,
            region_divisor: 1,
            default_pinctrl_tag: "default".to_string(),
        }
    }

    pub fn flash_selector(mut self, key: &str) -> Self {
        self.flash_selector = Some(key.to_string());
        self
    }

    pub fn sram_selector(mut self, key: &str) -> Self {
        self.sram_selector = Some(key.to_string());
        self
    }

    pub fn console_selector(mut self, key: &str) -> Self {
        self.console_selector = Some(key.to_string());
        self
    }

    pub fn code_partition_selector(mut self, key: &str) -> Self {
        self.code_partition_selector = Some(key.to_string());
        self
    }

    /// Set the divisor for forced region sizes. Zero is treated as one.
    pub fn region_divisor(mut self, divisor: u64) -> Self {
        self.region_divisor = divisor;
        self
    }

    pub fn default_pinctrl_tag(mut self, tag: &str) -> Self {
        self.default_pinctrl_tag = tag.to_string();
        self
    }

    /// Look up a selector, treating the empty string as absent.
    pub(crate) fn selector(key: &Option<String>) -> Option<&str> {
        key.as_deref().filter(|k| !k.is_empty())
    }

    /// Parse a TOML configuration. Missing keys keep their defaults.
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid generator configuration")
    }

    /// Read a TOML configuration file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }
}
