//! Which subdirectories the tree walk descends into.

use crate::ports::DirProbe;
use camino::Utf8Path;
use std::collections::BTreeSet;
use tracing::debug;

/// Directory names that never hold stub-generating sources.
pub const EXCLUDED_DIR_NAMES: &[&str] = &[
    "SCCS",
    "output",
    "BitKeeper",
    "examples",
    "externalpackages",
    "bilinear",
    "ftn-auto",
    "ftn-auto-interfaces",
    "fortran",
    "bin",
    "maint",
    "ftn-custom",
    "config",
    "f90-custom",
    "ftn-kernels",
    "petsc",
];

/// Nested paths whose presence marks a configure-generated build tree.
pub const BUILD_OUTPUT_MARKERS: &[&[&str]] = &[&["lib", "petsc"], &["lib", "petsc-conf"], &["conf"]];

#[derive(Debug, Clone)]
pub struct DirFilter {
    excluded: BTreeSet<String>,
}

impl Default for DirFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl DirFilter {
    pub fn new() -> Self {
        Self {
            excluded: EXCLUDED_DIR_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Extend the built-in exclusion list.
    pub fn with_extra<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded.extend(names.into_iter().map(Into::into));
        self
    }

    /// Pure name check: excluded names and hidden directories.
    pub fn excludes_name(&self, name: &str) -> bool {
        name.starts_with('.') || self.excluded.contains(name)
    }

    pub fn is_build_output(dir: &Utf8Path, probe: &dyn DirProbe) -> bool {
        BUILD_OUTPUT_MARKERS.iter().any(|marker| {
            let nested = marker.iter().fold(dir.to_path_buf(), |p, part| p.join(part));
            probe.is_dir(&nested)
        })
    }

    /// Whether the walk should descend into `dir`.
    pub fn admits(&self, dir: &Utf8Path, probe: &dyn DirProbe) -> bool {
        let Some(name) = dir.file_name() else {
            return true;
        };
        if self.excludes_name(name) {
            debug!(dir = dir.as_str(), "skipping excluded directory");
            return false;
        }
        if Self::is_build_output(dir, probe) {
            debug!(dir = dir.as_str(), "skipping build output directory");
            return false;
        }
        true
    }
}
