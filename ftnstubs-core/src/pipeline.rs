//! Generate and merge pipelines, extracted from the CLI.
//!
//! The generator is reached only through [`StubGenerator`]; directory
//! exclusion probes go through [`DirProbe`].

use crate::error::{GenerateError, GenerateResult};
use crate::ports::{BatchRequest, StubGenerator};
use crate::settings::{GenerateSettings, MergeSettings};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use ftnstubs_domain::layout::{
    DESCRIPTOR_FILE_NAME, OUTPUT_DIR_NAME, holding_file_name, is_eligible_source,
    is_fragment_name, submodule_of_holding_dir,
};
use ftnstubs_domain::{
    BuildDescriptor, DirFilter, DirProbe, GeneratedArtifacts, InterfaceMerger, TreeLayout,
    batches,
};
use ftnstubs_fix::StubFixer;
use std::io::Write;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Counters for one generate run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOutcome {
    pub directories: usize,
    pub batches: usize,
    pub stubs_fixed: usize,
    pub descriptors_written: usize,
    pub fragments_relocated: usize,
}

/// Per-run state shared by every directory of a walk.
struct WalkContext<'a> {
    settings: &'a GenerateSettings,
    layout: TreeLayout,
    fixer: StubFixer,
    generator: &'a dyn StubGenerator,
}

/// Walk `settings.walk_root` and generate, fix and describe stubs for every
/// directory with eligible sources.
pub fn run_generate(
    settings: &GenerateSettings,
    generator: &dyn StubGenerator,
    probe: &dyn DirProbe,
) -> GenerateResult<GenerateOutcome> {
    let ctx = WalkContext {
        settings,
        layout: TreeLayout::new(settings.project_root.clone()),
        fixer: StubFixer::new()?,
        generator,
    };
    let filter = DirFilter::new().with_extra(settings.extra_excludes.iter().cloned());

    let mut outcome = GenerateOutcome::default();
    let walker = WalkDir::new(&settings.walk_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            Utf8Path::from_path(entry.path()).is_some_and(|dir| filter.admits(dir, probe))
        });

    for entry in walker {
        let entry = entry.with_context(|| format!("walk {}", settings.walk_root))?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let Some(dir) = Utf8Path::from_path(entry.path()) else {
            debug!(path = %entry.path().display(), "skipping non-UTF-8 directory");
            continue;
        };
        process_dir(&ctx, dir, &mut outcome)?;
    }
    Ok(outcome)
}

fn process_dir(
    ctx: &WalkContext<'_>,
    dir: &Utf8Path,
    outcome: &mut GenerateOutcome,
) -> GenerateResult<()> {
    let sources = eligible_sources(dir)?;
    if sources.is_empty() {
        return Ok(());
    }
    outcome.directories += 1;
    if ctx.settings.verbose {
        info!("Generating Fortran stubs for {} ({} files)", dir, sources.len());
    }

    let out_dir = dir.join(OUTPUT_DIR_NAME);
    prepare_output_dir(&out_dir)?;

    for batch in batches(&sources, ctx.settings.batch_size) {
        let request = BatchRequest {
            work_dir: dir,
            out_dir: &out_dir,
            batch,
            flags: &ctx.settings.flags,
        };
        let output = ctx.generator.run_batch(&request)?;
        if !output.is_empty() {
            debug!(dir = dir.as_str(), "generator output: {}", output.trim_end());
        }
        outcome.batches += 1;
    }

    let descriptor = finish_output_dir(ctx, dir, &out_dir, outcome)?;
    outcome.fragments_relocated += relocate_fragments(ctx, dir, descriptor)?;
    Ok(())
}

/// Sorted names of the regular files in `dir` that the generator accepts.
fn eligible_sources(dir: &Utf8Path) -> anyhow::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in dir.read_dir_utf8().with_context(|| format!("read dir {}", dir))? {
        let entry = entry.with_context(|| format!("read dir entry in {}", dir))?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("stat {}", entry.path()))?;
        if file_type.is_file() && is_eligible_source(entry.file_name()) {
            names.push(entry.file_name().to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Create `out_dir`, or empty it if it already exists.
fn prepare_output_dir(out_dir: &Utf8Path) -> GenerateResult<()> {
    if !out_dir.exists() {
        fs::create_dir(out_dir).with_context(|| format!("create {}", out_dir))?;
        return Ok(());
    }
    if !out_dir.is_dir() {
        return Err(GenerateError::NotADirectory {
            path: out_dir.to_path_buf(),
        });
    }
    for entry in fs::read_dir(out_dir).with_context(|| format!("read dir {}", out_dir))? {
        let path = entry
            .with_context(|| format!("read dir entry in {}", out_dir))?
            .path();
        if path.is_dir() {
            fs::remove_dir_all(&path).with_context(|| format!("clear {}", out_dir))?;
        } else {
            fs::remove_file(&path).with_context(|| format!("clear {}", out_dir))?;
        }
    }
    Ok(())
}

/// Fix every generated stub and write the child descriptor.
///
/// Removes `out_dir` and returns `None` when nothing was generated.
fn finish_output_dir(
    ctx: &WalkContext<'_>,
    dir: &Utf8Path,
    out_dir: &Utf8Path,
    outcome: &mut GenerateOutcome,
) -> GenerateResult<Option<BuildDescriptor>> {
    let names = sorted_names(out_dir, |ft| ft.is_file())?;
    let artifacts = GeneratedArtifacts::classify(names);
    if artifacts.is_empty() {
        debug!(dir = out_dir.as_str(), "no stubs generated, removing");
        fs::remove_dir_all(out_dir).with_context(|| format!("remove {}", out_dir))?;
        return Ok(None);
    }

    for name in &artifacts.sources {
        ctx.fixer.fix_file(&out_dir.join(name))?;
        outcome.stubs_fixed += 1;
    }

    let descriptor = read_parent_descriptor(dir)?;
    let child = out_dir.join(DESCRIPTOR_FILE_NAME);
    fs::write(&child, descriptor.synthesize(&artifacts))
        .with_context(|| format!("write {}", child))?;
    outcome.descriptors_written += 1;
    Ok(Some(descriptor))
}

/// Scrape `dir/makefile`; its absence is fatal.
fn read_parent_descriptor(dir: &Utf8Path) -> GenerateResult<BuildDescriptor> {
    let parent = dir.join(DESCRIPTOR_FILE_NAME);
    if !parent.is_file() {
        return Err(GenerateError::MissingDescriptor { path: parent });
    }
    let text = fs::read_to_string(&parent).with_context(|| format!("read {}", parent))?;
    Ok(BuildDescriptor::parse(&text))
}

/// Move every interface fragment in `dir` into its holding area.
///
/// The parent descriptor is read on the first non-empty fragment if the
/// output step did not need it. Fragments from a directory whose descriptor
/// names no subsystem are dropped with a warning.
fn relocate_fragments(
    ctx: &WalkContext<'_>,
    dir: &Utf8Path,
    mut descriptor: Option<BuildDescriptor>,
) -> GenerateResult<usize> {
    let mut relocated = 0;
    for name in sorted_names(dir, |ft| ft.is_file())? {
        if !is_fragment_name(&name) {
            continue;
        }
        let fragment = dir.join(&name);
        let text = fs::read_to_string(&fragment).with_context(|| format!("read {}", fragment))?;
        if !text.is_empty() {
            let desc = match descriptor.take() {
                Some(desc) => desc,
                None => read_parent_descriptor(dir)?,
            };
            let target = desc
                .subsystem
                .as_deref()
                .map(|subsystem| ctx.layout.holding_dir(subsystem, desc.submodule()));
            descriptor = Some(desc);

            match target {
                Some(holding) => {
                    if ctx.settings.verbose {
                        info!("Generating F90 interface for {}", fragment);
                    }
                    fs::create_dir_all(&holding)
                        .with_context(|| format!("create {}", holding))?;
                    append(&holding.join(holding_file_name(dir)), &text)?;
                    relocated += 1;
                }
                None => warn!(
                    path = fragment.as_str(),
                    "no MANSEC in {}, dropping interface fragment",
                    dir.join(DESCRIPTOR_FILE_NAME)
                ),
            }
        }
        fs::remove_file(&fragment).with_context(|| format!("remove {}", fragment))?;
    }
    Ok(relocated)
}

fn append(path: &Utf8Path, text: &str) -> anyhow::Result<()> {
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path))?;
    file.write_all(text.as_bytes())
        .with_context(|| format!("append to {}", path))
}

fn sorted_names(
    dir: &Utf8Path,
    keep: impl Fn(&std::fs::FileType) -> bool,
) -> anyhow::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in dir.read_dir_utf8().with_context(|| format!("read dir {}", dir))? {
        let entry = entry.with_context(|| format!("read dir entry in {}", dir))?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("stat {}", entry.path()))?;
        if keep(&file_type) {
            names.push(entry.file_name().to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// One consolidated interface file written by [`run_merge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedInterface {
    pub subsystem: String,
    pub submodule: String,
    pub path: Utf8PathBuf,
    pub fragments: usize,
}

/// Merge every holding area under the configured subsystems.
pub fn run_merge(settings: &MergeSettings) -> anyhow::Result<Vec<MergedInterface>> {
    let layout = TreeLayout::new(settings.project_root.clone());
    let mut merged = Vec::new();

    for subsystem in &settings.subsystems {
        let interfaces = layout.interfaces_dir(subsystem);
        if !interfaces.is_dir() {
            debug!(dir = interfaces.as_str(), "no interface directory, skipping");
            continue;
        }
        for name in sorted_names(&interfaces, |ft| ft.is_dir())? {
            if settings.verbose {
                info!("Processing F90 interface for {}", name);
            }
            let Some(submodule) = submodule_of_holding_dir(&name) else {
                continue;
            };
            merged.push(merge_submodule(settings, &layout, subsystem, submodule)?);
        }
    }
    Ok(merged)
}

fn merge_submodule(
    settings: &MergeSettings,
    layout: &TreeLayout,
    subsystem: &str,
    submodule: &str,
) -> anyhow::Result<MergedInterface> {
    let holding = layout.holding_dir(subsystem, submodule);
    let mut merger = InterfaceMerger::new(&settings.product_prefix, subsystem);
    let fragments = sorted_names(&holding, |ft| ft.is_file())?;
    for name in &fragments {
        if settings.verbose {
            info!("  Copying in {}", name);
        }
        let path = holding.join(name);
        let text = fs::read_to_string(&path).with_context(|| format!("read {}", path))?;
        merger.push_fragment(&text);
    }

    let path = layout.consolidated_path(subsystem, submodule, &settings.product_prefix);
    write_whole(&path, &merger.finish())?;

    if let Err(err) = fs::remove_dir_all(&holding) {
        warn!("could not remove {}: {}", holding, err);
    }
    Ok(MergedInterface {
        subsystem: subsystem.to_string(),
        submodule: submodule.to_string(),
        path,
        fragments: fragments.len(),
    })
}

/// Write `contents` to a sibling temporary and rename it over `path`.
fn write_whole(path: &Utf8Path, contents: &str) -> anyhow::Result<()> {
    let tmp = Utf8PathBuf::from(format!("{path}.tmp"));
    fs::write(&tmp, contents).with_context(|| format!("write {}", tmp))?;
    fs::rename(&tmp, path).with_context(|| format!("rename {} to {}", tmp, path))
}
