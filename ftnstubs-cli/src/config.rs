//! Per-tree overrides read from `$PETSC_DIR/ftnstubs.toml`.
//!
//! A key present in the file replaces the built-in value in
//! [`GenerateSettings`] or [`MergeSettings`]; absent keys leave it alone.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use ftnstubs_core::settings::{GenerateSettings, MergeSettings};
use serde::Deserialize;
use std::num::NonZeroUsize;
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "ftnstubs.toml";

/// Both sections of `ftnstubs.toml`; either may be omitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FtnstubsConfig {
    pub generate: GenerateConfig,
    pub merge: MergeConfig,
}

/// `[generate]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Source files per generator call.
    pub batch_size: Option<usize>,

    /// Prefix passed to the generator's `-ptrprefix` flag.
    pub ptr_prefix: Option<String>,

    /// Directory names skipped in addition to the built-in list.
    pub exclude: Vec<String>,
}

/// `[merge]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Subsystems to merge, in order.
    pub subsystems: Option<Vec<String>>,

    /// Prefix of consolidated file and definitions module names.
    pub product_prefix: Option<String>,
}

/// Path of the `ftnstubs.toml` sitting at the PETSc tree root, if any.
///
/// Only the root is consulted; the source walk never picks up per-directory
/// overrides.
pub fn discover_config(petsc_dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = petsc_dir.join(CONFIG_FILE_NAME);
    if !config_path.is_file() {
        debug!("no {} under {}, using built-in settings", CONFIG_FILE_NAME, petsc_dir);
        return None;
    }
    debug!("using settings overrides from {}", config_path);
    Some(config_path)
}

/// Read `path` and deserialize its `[generate]` and `[merge]` sections.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<FtnstubsConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Syntax only; `batch_size` and the other values are checked when applied.
pub fn parse_config(contents: &str) -> anyhow::Result<FtnstubsConfig> {
    toml::from_str(contents).context("invalid TOML in ftnstubs.toml")
}

/// Overrides for this PETSc tree, or all-`None` sections when it has no `ftnstubs.toml`.
pub fn load_or_default(petsc_dir: &Utf8Path) -> anyhow::Result<FtnstubsConfig> {
    discover_config(petsc_dir)
        .map(|path| load_config(&path))
        .unwrap_or_else(|| Ok(FtnstubsConfig::default()))
}

impl FtnstubsConfig {
    /// Overlay the `[generate]` section onto `settings`.
    pub fn apply_generate(&self, settings: &mut GenerateSettings) -> anyhow::Result<()> {
        let section = &self.generate;
        if let Some(size) = section.batch_size {
            settings.batch_size = NonZeroUsize::new(size)
                .context("generate.batch_size must be at least 1")?;
        }
        if let Some(prefix) = &section.ptr_prefix {
            settings.flags.ptr_prefix = prefix.clone();
        }
        for name in &section.exclude {
            if !settings.extra_excludes.contains(name) {
                settings.extra_excludes.push(name.clone());
            }
        }
        Ok(())
    }

    /// Overlay the `[merge]` section onto `settings`.
    pub fn apply_merge(&self, settings: &mut MergeSettings) {
        if let Some(subsystems) = &self.merge.subsystems {
            settings.subsystems = subsystems.clone();
        }
        if let Some(prefix) = &self.merge.product_prefix {
            settings.product_prefix = prefix.clone();
        }
    }
}
