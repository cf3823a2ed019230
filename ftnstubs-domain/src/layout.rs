//! Where things live in a PETSc source tree.

use camino::{Utf8Path, Utf8PathBuf};

/// Per-directory output subdirectory for generated stubs.
pub const OUTPUT_DIR_NAME: &str = "ftn-auto";

/// Build descriptor file name, both for parents and for synthesized children.
pub const DESCRIPTOR_FILE_NAME: &str = "makefile";

/// Extensions of files handed to the generator.
pub const ELIGIBLE_EXTENSIONS: &[&str] = &["c", "h", "cxx", "cu"];

pub const HOLDING_DIR_SUFFIX: &str = "-tmpdir";

const FRAGMENT_PREFIX: &str = "f90module";
const FRAGMENT_SUFFIX: &str = ".f90";

/// What a file found in an output subdirectory is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// A C/C++ stub that must be fixed and compiled.
    Source,
    /// A generated Fortran interface header.
    Header,
}

pub fn is_eligible_source(name: &str) -> bool {
    Utf8Path::new(name)
        .extension()
        .is_some_and(|ext| ELIGIBLE_EXTENSIONS.contains(&ext))
}

pub fn artifact_kind(name: &str) -> Option<ArtifactKind> {
    match Utf8Path::new(name).extension()? {
        "c" | "cxx" => Some(ArtifactKind::Source),
        "h90" => Some(ArtifactKind::Header),
        _ => None,
    }
}

/// Name of the interface fragment written for the batch starting at `start`.
pub fn fragment_name(start: usize) -> String {
    format!("{FRAGMENT_PREFIX}{start}{FRAGMENT_SUFFIX}")
}

pub fn is_fragment_name(name: &str) -> bool {
    name.strip_prefix(FRAGMENT_PREFIX)
        .and_then(|rest| rest.strip_suffix(FRAGMENT_SUFFIX))
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// File name, inside a holding area, for fragments from `origin`.
pub fn holding_file_name(origin: &Utf8Path) -> String {
    format!("{}.h90", origin.as_str().replace('/', "_"))
}

/// The submodule a holding directory belongs to, if `name` is one.
pub fn submodule_of_holding_dir(name: &str) -> Option<&str> {
    name.strip_suffix(HOLDING_DIR_SUFFIX)
        .filter(|submodule| !submodule.is_empty())
}

/// Project-root-relative locations of interface and config directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLayout {
    root: Utf8PathBuf,
}

impl TreeLayout {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Search path for the generator's own configuration files.
    pub fn generator_config_dir(&self) -> Utf8PathBuf {
        self.root.join("lib").join("petsc").join("conf")
    }

    pub fn interfaces_dir(&self, subsystem: &str) -> Utf8PathBuf {
        self.root
            .join("src")
            .join(subsystem)
            .join("f90-mod")
            .join("ftn-auto-interfaces")
    }

    pub fn holding_dir(&self, subsystem: &str, submodule: &str) -> Utf8PathBuf {
        self.interfaces_dir(subsystem)
            .join(format!("{submodule}{HOLDING_DIR_SUFFIX}"))
    }

    pub fn consolidated_path(&self, subsystem: &str, submodule: &str, prefix: &str) -> Utf8PathBuf {
        self.interfaces_dir(subsystem)
            .join(format!("{prefix}{submodule}.h90"))
    }
}
