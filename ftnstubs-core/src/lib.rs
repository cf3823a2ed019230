//! Embeddable core library for ftnstubs.
//!
//! Provides a clap-free entry point for the two passes over a PETSc tree.
//!
//! # Port traits
//!
//! The external generator is abstracted behind
//! [`StubGenerator`](ports::StubGenerator). The [`adapters`] module provides
//! the subprocess-backed [`BfortGenerator`](adapters::BfortGenerator) and the
//! in-memory [`CannedGenerator`](adapters::CannedGenerator).
//!
//! # Entry points
//!
//! - [`run_generate`](pipeline::run_generate) - walk a tree, generate and fix stubs
//! - [`run_merge`](pipeline::run_merge) - consolidate interface fragments

pub mod adapters;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod settings;

pub use error::{GenerateError, GenerateResult};

// Re-export the probe so callers don't need ftnstubs-domain directly.
pub use ftnstubs_domain::{DirProbe, FsDirProbe};
