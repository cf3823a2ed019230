//! Domain logic: what to generate, where it goes, and how fragments merge.
//!
//! This crate owns the text-level rules for build descriptors and interface
//! merging. It does not walk trees or run the generator; that's `ftnstubs-core`.

mod batch;
mod descriptor;
mod filter;
pub mod layout;
mod merge;
mod ports;

pub use batch::{Batch, DEFAULT_BATCH_SIZE, DEFAULT_PTR_PREFIX, GeneratorFlags, batches};
pub use descriptor::{BuildDescriptor, GeneratedArtifacts};
pub use filter::{BUILD_OUTPUT_MARKERS, DirFilter, EXCLUDED_DIR_NAMES};
pub use layout::TreeLayout;
pub use merge::{InterfaceMerger, SignatureState, substitute_line};
pub use ports::{DirProbe, FsDirProbe};
