//! Plan executor - applies a [`FilePlan`] to the distribution tree.
//!
//! Nothing is touched until the operator confirms the deletion list. After
//! that the steps run in a fixed order:
//!
//! 1. run lock on the distribution root
//! 2. backup of the package folder (when requested and none exists)
//! 3. sync removals, then renames
//! 4. deletions, then wildcard deletions
//! 5. archival target only: relocations, worker split, post-relocation
//!    deletions, archives
//!
//! Independent operations within a step run concurrently on the rayon pool.
//! A failing step reports every failed path and stops the run.
//!
//! # Example
//!
//! ```rust,ignore
//! use dist_pruner::executor::{execute, Confirmation, Outcome};
//! use dist_pruner::prompt::TerminalPrompter;
//!
//! let plan = dist_pruner::plan::compute_plan(&flags, &layout);
//! match execute(&plan, &layout, &flags, &mut TerminalPrompter::new(), Confirmation::Ask)? {
//!     Outcome::Declined => println!("Process exited. No action will be taken."),
//!     Outcome::Completed(summary) => println!("{} paths deleted", summary.deleted),
//! }
//! ```

pub mod archive;
pub mod backup;
pub mod files;
pub mod lock;
pub mod split;

use anyhow::{bail, Context, Result};
use glob::Pattern;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::flags::{FeatureFlags, FlagKey, RawAnswers};
use crate::layout::DistributionLayout;
use crate::plan::{FilePlan, Relocation, ZipTarget};
use crate::prompt::Prompter;
use lock::RunLock;

/// How the deletion confirmation is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Ask through the prompter.
    Ask,
    /// Use the `delete_unused` flag as given.
    Preset,
}

impl Confirmation {
    /// `Preset` when `delete_unused` was supplied up front, `Ask` otherwise.
    pub fn for_presets(presets: &RawAnswers) -> Self {
        if presets.contains_key(&FlagKey::DeleteUnused) {
            Confirmation::Preset
        } else {
            Confirmation::Ask
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub backup: Option<PathBuf>,
    pub deleted: usize,
    pub wildcard_deleted: usize,
    pub renamed: usize,
    pub relocated: usize,
    pub chunk_dirs: Vec<PathBuf>,
    pub archives: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The operator declined; nothing was changed.
    Declined,
    Completed(Summary),
}

/// Print the paths a run will delete.
pub fn print_deletions(plan: &FilePlan) {
    println!("\n==== FILES & FOLDERS TO DELETE ====\n");
    for path in &plan.deletions {
        println!("{}", path.display());
    }
    for wildcard in &plan.wildcard_deletions {
        println!("{}/{}", wildcard.directory.display(), wildcard.pattern);
    }
    println!("\n===================================");
}

fn confirmation_prompt(layout: &DistributionLayout, flags: &FeatureFlags) -> String {
    let backup_note = if flags.backup.is_yes() && !layout.backup_exists() {
        format!(
            "(A backup will be created in './{}-backup')",
            layout.package_folder()
        )
    } else {
        "(A backup will NOT be created)".to_string()
    };
    format!("The above files will be permanently deleted. Is this okay? {backup_note}")
}

/// Apply `plan` to the tree described by `layout`.
///
/// Flag combinations the archival target cannot package are refused before
/// anything is shown or touched.
pub fn execute(
    plan: &FilePlan,
    layout: &DistributionLayout,
    flags: &FeatureFlags,
    prompter: &mut dyn Prompter,
    confirmation: Confirmation,
) -> Result<Outcome> {
    flags.check_archival()?;
    print_deletions(plan);

    let confirmed = match confirmation {
        Confirmation::Ask => prompter.ask(
            FlagKey::DeleteUnused,
            &confirmation_prompt(layout, flags),
        )?,
        Confirmation::Preset => flags.delete_unused,
    };
    if confirmed.is_no() {
        info!("deletion declined, leaving the tree untouched");
        return Ok(Outcome::Declined);
    }

    let _lock = RunLock::acquire(layout.root())?;
    let mut summary = Summary::default();

    if flags.backup.is_yes() {
        println!("\nCreating backup...");
        summary.backup = backup::create_backup(layout)?;
    }

    // Rename targets are replaced by the rename itself.
    for path in &plan.sync_removals {
        if plan.renames.iter().any(|rename| &rename.to == path) {
            continue;
        }
        files::remove_path(path)?;
    }
    for rename in &plan.renames {
        if files::rename(rename)? {
            summary.renamed += 1;
        }
    }

    println!("\nDeleting files...");
    let removed = run_batch("delete", &plan.deletions, |path| files::remove_path(path))?;
    summary.deleted = removed.into_iter().filter(|removed| *removed).count();

    for wildcard in &plan.wildcard_deletions {
        let removed = files::delete_matching(wildcard)?;
        for path in &removed {
            println!("Deleted {}", path.display());
        }
        summary.wildcard_deleted += removed.len();
    }

    if flags.salesforce.is_yes() {
        run_archival(plan, layout, flags, &mut summary)?;
    } else if !plan.relocations.is_empty() {
        debug!(
            count = plan.relocations.len(),
            "relocations only apply to the archival target"
        );
    }

    info!(
        deleted = summary.deleted,
        renamed = summary.renamed,
        relocated = summary.relocated,
        archives = summary.archives.len(),
        "run complete"
    );
    Ok(Outcome::Completed(summary))
}

fn run_archival(
    plan: &FilePlan,
    layout: &DistributionLayout,
    flags: &FeatureFlags,
    summary: &mut Summary,
) -> Result<()> {
    println!("\nExtracting files for archival build...");

    let mut relocations = plan.relocations.clone();
    relocations.extend(discover_core_chunks(layout)?);
    let copied = run_batch("relocate", &relocations, files::relocate)?;
    summary.relocated = copied.len();

    let tier = flags.pdf_tier();
    let worker = layout.package_path(&format!("core/pdf/{tier}/optimized/PDFNetCWasm.br.wasm"));
    let chunk_dirs =
        split::split_worker_file(&worker, split::WORKER_CHUNKS, layout.resource_dir(), tier)?;
    println!("\nFile split successfully into {} chunks:", chunk_dirs.len());
    for (i, dir) in chunk_dirs.iter().enumerate() {
        println!("Chunk {}: {}", i + 1, dir.display());
    }

    for wildcard in &plan.post_relocation_deletions {
        summary.wildcard_deleted += files::delete_matching(wildcard)?.len();
    }

    println!("\nCompressing files...");
    let mut targets = plan.zip_targets.clone();
    targets.extend(chunk_dirs.iter().map(ZipTarget::new));
    let archives = run_batch("archive", &targets, archive::archive_target)?;
    for path in &archives {
        if let Some(name) = path.file_name() {
            println!("{}", name.to_string_lossy());
        }
    }

    println!(
        "\nDone! Copy the zipped files above and all \".resource-meta.xml\" files into \
         the static resources folder of your app."
    );
    summary.chunk_dirs = chunk_dirs;
    summary.archives = archives;
    Ok(())
}

/// Lazily loaded `*.chunk.*` bundles directly under `core/`.
///
/// Their names change between releases, so they are found on disk rather
/// than listed in the plan.
pub fn discover_core_chunks(layout: &DistributionLayout) -> Result<Vec<Relocation>> {
    let core = layout.package_path("core");
    let pattern = Pattern::new("*.chunk.*").context("invalid chunk pattern")?;
    let entries = fs::read_dir(&core)
        .with_context(|| format!("Failed to read directory: {}", core.display()))?;

    let mut chunks = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read entry under {}", core.display()))?;
        let name = entry.file_name();
        if name.to_str().is_some_and(|name| pattern.matches(name)) {
            chunks.push(Relocation {
                source: entry.path(),
                destination: layout.resource_package_path("core"),
                recursive: true,
            });
        }
    }
    chunks.sort_by(|a, b| a.source.cmp(&b.source));
    Ok(chunks)
}

/// Run `op` over `items` on the rayon pool.
///
/// Every item is attempted; when any fail, the error lists all failures in
/// input order.
fn run_batch<T, R, F>(what: &str, items: &[T], op: F) -> Result<Vec<R>>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> Result<R> + Sync + Send,
{
    let results: Vec<Result<R>> = items.par_iter().map(&op).collect();

    let mut done = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(value) => done.push(value),
            Err(err) => failures.push(format!("{err:#}")),
        }
    }

    if !failures.is_empty() {
        bail!(
            "{} {} operation(s) failed:\n  {}",
            failures.len(),
            what,
            failures.join("\n  ")
        );
    }
    Ok(done)
}
