//! Clap-free settings for the generate and merge pipelines.
//!
//! Everything a run depends on is carried here rather than read from the
//! process environment.

use camino::Utf8PathBuf;
use ftnstubs_domain::{DEFAULT_BATCH_SIZE, GeneratorFlags};
use std::num::NonZeroUsize;

pub const DEFAULT_SUBSYSTEMS: &[&str] = &["sys", "vec", "mat", "dm", "ksp", "snes", "ts", "tao"];

pub const DEFAULT_PRODUCT_PREFIX: &str = "petsc";

/// Settings for the generate pipeline.
#[derive(Debug, Clone)]
pub struct GenerateSettings {
    /// Project root (`PETSC_DIR`); holding areas and generator config live under it.
    pub project_root: Utf8PathBuf,
    /// Where the tree walk starts.
    pub walk_root: Utf8PathBuf,
    pub batch_size: NonZeroUsize,
    pub flags: GeneratorFlags,
    /// Directory names excluded in addition to the built-in list.
    pub extra_excludes: Vec<String>,
    pub verbose: bool,
}

impl Default for GenerateSettings {
    fn default() -> Self {
        Self {
            project_root: Utf8PathBuf::from("."),
            walk_root: Utf8PathBuf::from("."),
            batch_size: DEFAULT_BATCH_SIZE,
            flags: GeneratorFlags::default(),
            extra_excludes: Vec::new(),
            verbose: false,
        }
    }
}

/// Settings for the merge pipeline.
#[derive(Debug, Clone)]
pub struct MergeSettings {
    pub project_root: Utf8PathBuf,
    /// Merged in this order.
    pub subsystems: Vec<String>,
    pub product_prefix: String,
    pub verbose: bool,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            project_root: Utf8PathBuf::from("."),
            subsystems: DEFAULT_SUBSYSTEMS.iter().map(|s| s.to_string()).collect(),
            product_prefix: DEFAULT_PRODUCT_PREFIX.to_string(),
            verbose: false,
        }
    }
}
