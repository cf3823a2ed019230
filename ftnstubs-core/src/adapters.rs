//! Default generator implementations.

use crate::ports::{BatchRequest, GeneratorError, StubGenerator};
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use std::cell::RefCell;
use std::process::Command;
use tracing::debug;

/// Environment variable the generator reads its configuration search path from.
pub const CONFIG_PATH_VAR: &str = "BFORT_CONFIG_PATH";

/// Runs the real `bfort` executable as a blocking subprocess.
#[derive(Debug, Clone)]
pub struct BfortGenerator {
    executable: Utf8PathBuf,
    config_dir: Utf8PathBuf,
}

impl BfortGenerator {
    pub fn new(executable: Utf8PathBuf, config_dir: Utf8PathBuf) -> Self {
        Self {
            executable,
            config_dir,
        }
    }
}

impl StubGenerator for BfortGenerator {
    fn run_batch(&self, request: &BatchRequest<'_>) -> Result<String, GeneratorError> {
        let args = request.flags.command_args(request.out_dir, &request.batch);
        let command = format!("{} {}", self.executable, args.join(" "));
        debug!(cwd = request.work_dir.as_str(), "running {}", command);

        let output = Command::new(&self.executable)
            .args(&args)
            .current_dir(request.work_dir)
            .env(CONFIG_PATH_VAR, &self.config_dir)
            .output()
            .map_err(|source| GeneratorError::Spawn {
                command: command.clone(),
                source,
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(GeneratorError::Failed {
                command,
                status: output.status.to_string(),
                output: combined,
            });
        }
        Ok(combined)
    }
}

/// A batch as seen by [`CannedGenerator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedBatch {
    pub work_dir: Utf8PathBuf,
    pub files: Vec<String>,
    pub fragment: String,
}

/// In-memory stand-in for `bfort`, for embedding and testing.
///
/// For every source `name.ext` in a batch it writes `namef.c` containing the
/// canned stub text, and writes the canned fragment text as the batch's
/// interface fragment. Every call is recorded.
#[derive(Debug, Default)]
pub struct CannedGenerator {
    stub: Option<String>,
    fragment: String,
    extra_outputs: Vec<(String, String)>,
    failure: Option<String>,
    calls: RefCell<Vec<RecordedBatch>>,
}

impl CannedGenerator {
    pub fn new(stub: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            stub: Some(stub.into()),
            fragment: fragment.into(),
            ..Self::default()
        }
    }

    /// Writes no stubs, only the (possibly empty) fragment.
    pub fn fragments_only(fragment: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
            ..Self::default()
        }
    }

    /// Every call fails with `output` as the captured text.
    pub fn failing(output: impl Into<String>) -> Self {
        Self {
            failure: Some(output.into()),
            ..Self::default()
        }
    }

    /// Also write `name` with `contents` into the output directory on each call.
    pub fn with_output_file(mut self, name: impl Into<String>, contents: impl Into<String>) -> Self {
        self.extra_outputs.push((name.into(), contents.into()));
        self
    }

    pub fn calls(&self) -> Vec<RecordedBatch> {
        self.calls.borrow().clone()
    }

    fn write(path: &Utf8Path, contents: &str, command: &str) -> Result<(), GeneratorError> {
        fs::write(path, contents).map_err(|source| GeneratorError::Spawn {
            command: command.to_string(),
            source,
        })
    }
}

impl StubGenerator for CannedGenerator {
    fn run_batch(&self, request: &BatchRequest<'_>) -> Result<String, GeneratorError> {
        let fragment = request.batch.fragment_name();
        self.calls.borrow_mut().push(RecordedBatch {
            work_dir: request.work_dir.to_path_buf(),
            files: request.batch.files.to_vec(),
            fragment: fragment.clone(),
        });
        let command = format!("canned {}", request.batch.files.join(" "));

        if let Some(output) = &self.failure {
            return Err(GeneratorError::Failed {
                command,
                status: "exit status: 1".to_string(),
                output: output.clone(),
            });
        }

        if let Some(stub) = &self.stub {
            for file in request.batch.files {
                let stem = Utf8Path::new(file).file_stem().unwrap_or(file.as_str());
                Self::write(&request.out_dir.join(format!("{stem}f.c")), stub, &command)?;
            }
        }
        for (name, contents) in &self.extra_outputs {
            Self::write(&request.out_dir.join(name), contents, &command)?;
        }
        Self::write(&request.work_dir.join(&fragment), &self.fragment, &command)?;
        Ok(String::new())
    }
}
