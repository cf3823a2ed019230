//! Port traits abstracting the external generator away from the pipeline.

use ftnstubs_domain::{Batch, GeneratorFlags};
use camino::Utf8Path;

/// One generator call: a batch of sources in `work_dir`, stubs written to `out_dir`.
///
/// The interface fragment lands in `work_dir` under `batch.fragment_name()`.
#[derive(Debug, Clone, Copy)]
pub struct BatchRequest<'a> {
    pub work_dir: &'a Utf8Path,
    pub out_dir: &'a Utf8Path,
    pub batch: Batch<'a>,
    pub flags: &'a GeneratorFlags,
}

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("could not run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` failed ({status}):\n{output}")]
    Failed {
        command: String,
        status: String,
        output: String,
    },
}

/// Stub generator capability. Returns the call's combined stdout/stderr text.
pub trait StubGenerator {
    fn run_batch(&self, request: &BatchRequest<'_>) -> Result<String, GeneratorError>;
}
