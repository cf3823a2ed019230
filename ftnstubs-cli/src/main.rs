mod config;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ftnstubs_core::FsDirProbe;
use ftnstubs_core::adapters::BfortGenerator;
use ftnstubs_core::pipeline::{run_generate, run_merge};
use ftnstubs_core::settings::{GenerateSettings, MergeSettings};
use ftnstubs_domain::TreeLayout;
use std::process::ExitCode;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// First positional that selects the merge pass instead of generation.
const MERGE_MODE: &str = "-merge";

#[derive(Debug, Parser)]
#[command(
    name = "ftnstubs",
    version,
    about = "Generate, fix and consolidate PETSc Fortran stubs.",
    after_help = "Run `ftnstubs <bfort-path>` from inside the source tree to generate stubs,\n\
                  then `ftnstubs -merge` to consolidate the interface fragments."
)]
struct Cli {
    /// Path of the `bfort` executable, or `-merge` to run the merge pass only.
    #[arg(value_name = "BFORT|-merge", allow_hyphen_values = true)]
    target: String,

    /// Any value enables verbose progress logging.
    #[arg(value_name = "VERBOSE", allow_hyphen_values = true)]
    verbose: Option<String>,

    /// PETSc project root.
    #[arg(long, env = "PETSC_DIR")]
    petsc_dir: Utf8PathBuf,
}

impl Cli {
    fn is_verbose(&self) -> bool {
        self.verbose.is_some()
    }
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        error!("{:#}", e);
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.is_verbose() {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let file_config = config::load_or_default(&cli.petsc_dir).context("load ftnstubs.toml")?;
    if cli.target == MERGE_MODE {
        cmd_merge(&cli, &file_config)
    } else {
        cmd_generate(&cli, &file_config)
    }
}

fn cmd_generate(cli: &Cli, file_config: &config::FtnstubsConfig) -> anyhow::Result<()> {
    if cli.target.starts_with('-') {
        anyhow::bail!(
            "unknown option '{}'; expected a bfort path or '{}'",
            cli.target,
            MERGE_MODE
        );
    }
    let cwd = std::env::current_dir().context("determine current directory")?;
    let walk_root = Utf8PathBuf::from_path_buf(cwd)
        .map_err(|p| anyhow::anyhow!("current directory is not UTF-8: {}", p.display()))?;

    let mut settings = GenerateSettings {
        project_root: cli.petsc_dir.clone(),
        walk_root: walk_root.clone(),
        verbose: cli.is_verbose(),
        ..GenerateSettings::default()
    };
    file_config.apply_generate(&mut settings)?;
    debug!(
        "generate settings: batch_size={}, ptr_prefix={}, extra_excludes={:?}",
        settings.batch_size, settings.flags.ptr_prefix, settings.extra_excludes
    );

    let layout = TreeLayout::new(cli.petsc_dir.clone());
    let generator = BfortGenerator::new(
        resolve_executable(&walk_root, Utf8Path::new(&cli.target)),
        layout.generator_config_dir(),
    );
    let outcome = run_generate(&settings, &generator, &FsDirProbe)?;

    info!(
        "generated {} batches in {} directories ({} stubs, {} descriptors, {} fragments)",
        outcome.batches,
        outcome.directories,
        outcome.stubs_fixed,
        outcome.descriptors_written,
        outcome.fragments_relocated
    );
    Ok(())
}

fn cmd_merge(cli: &Cli, file_config: &config::FtnstubsConfig) -> anyhow::Result<()> {
    let mut settings = MergeSettings {
        project_root: cli.petsc_dir.clone(),
        verbose: cli.is_verbose(),
        ..MergeSettings::default()
    };
    file_config.apply_merge(&mut settings);
    debug!(
        "merge settings: subsystems={:?}, product_prefix={}",
        settings.subsystems, settings.product_prefix
    );

    let merged = run_merge(&settings)?;
    for interface in &merged {
        info!("wrote {} ({} fragments)", interface.path, interface.fragments);
    }
    Ok(())
}

/// The generator runs with its working directory set to each visited
/// directory, so relative paths with a directory part are anchored at `cwd`.
/// Bare names are left for `PATH` lookup.
fn resolve_executable(cwd: &Utf8Path, target: &Utf8Path) -> Utf8PathBuf {
    if target.is_relative() && target.components().count() > 1 {
        cwd.join(target)
    } else {
        target.to_path_buf()
    }
}
