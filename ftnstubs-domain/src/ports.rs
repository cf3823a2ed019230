use camino::Utf8Path;

/// Read-only filesystem probe used by the directory filter.
///
/// Kept behind a trait so exclusion decisions can be tested without a real tree.
pub trait DirProbe {
    fn is_dir(&self, path: &Utf8Path) -> bool;
}

/// File-system backed `DirProbe`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsDirProbe;

impl DirProbe for FsDirProbe {
    fn is_dir(&self, path: &Utf8Path) -> bool {
        path.is_dir()
    }
}
