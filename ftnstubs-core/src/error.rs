//! Error types for the generate pipeline.
//!
//! Every variant is fatal for the run; there is no partial-success policy.

use crate::ports::GeneratorError;
use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    /// The generator exited non-zero or could not be started.
    #[error(transparent)]
    Generator(#[from] GeneratorError),

    /// The output subdirectory path is taken by something that is not a directory.
    #[error("specified path is not a dir: {path}")]
    NotADirectory { path: Utf8PathBuf },

    /// Stubs were generated but the parent directory has no build descriptor.
    #[error("missing build descriptor: {path}")]
    MissingDescriptor { path: Utf8PathBuf },

    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

pub type GenerateResult<T> = Result<T, GenerateError>;
