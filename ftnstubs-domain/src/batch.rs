//! Splitting a directory's sources into generator invocations.

use crate::layout::fragment_name;
use camino::Utf8Path;
use std::num::NonZeroUsize;

/// Files per generator call; bounds the command line length.
pub const DEFAULT_BATCH_SIZE: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(size) => size,
    None => panic!("batch size must be non-zero"),
};

pub const DEFAULT_PTR_PREFIX: &str = "Petsc";

/// A run of consecutive files starting at index `start` of the directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch<'a> {
    pub start: usize,
    pub files: &'a [String],
}

impl Batch<'_> {
    /// Interface fragment the generator is asked to write for this batch.
    pub fn fragment_name(&self) -> String {
        fragment_name(self.start)
    }
}

pub fn batches(files: &[String], size: NonZeroUsize) -> impl Iterator<Item = Batch<'_>> {
    files
        .chunks(size.get())
        .enumerate()
        .map(move |(i, chunk)| Batch {
            start: i * size.get(),
            files: chunk,
        })
}

/// The fixed flag set passed to every generator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorFlags {
    pub ptr_prefix: String,
}

impl Default for GeneratorFlags {
    fn default() -> Self {
        Self {
            ptr_prefix: DEFAULT_PTR_PREFIX.to_string(),
        }
    }
}

impl GeneratorFlags {
    /// Full argument list for one batch, excluding the executable.
    pub fn command_args(&self, out_dir: &Utf8Path, batch: &Batch<'_>) -> Vec<String> {
        let mut args: Vec<String> = vec!["-dir".into(), out_dir.to_string()];
        args.extend(
            [
                "-mnative",
                "-ansi",
                "-nomsgs",
                "-noprofile",
                "-anyname",
                "-mapptr",
                "-mpi",
                "-shortargname",
                "-ferr",
            ]
            .map(String::from),
        );
        args.push("-ptrprefix".into());
        args.push(self.ptr_prefix.clone());
        args.extend(
            [
                "-ptr64",
                "PETSC_USE_POINTER_CONVERSION",
                "-fcaps",
                "PETSC_HAVE_FORTRAN_CAPS",
                "-fuscore",
                "PETSC_HAVE_FORTRAN_UNDERSCORE",
                "-f90mod_skip_header",
            ]
            .map(String::from),
        );
        args.extend(batch.files.iter().cloned());
        args.push("-f90modfile".into());
        args.push(batch.fragment_name());
        args
    }
}
