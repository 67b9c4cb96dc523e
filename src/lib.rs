//! Prunes a document-viewer SDK distribution tree for production.
//!
//! A run asks the operator which capabilities the deployment needs, turns the
//! answers into a [`FilePlan`] and applies it to the tree. The archival
//! target additionally packages the kept resources as zip archives with
//! metadata descriptors.
//!
//! - **Flags** - answers to the feature questions, immutable once resolved
//! - **Questions** - a dependency graph of questions, resolved interactively
//!   or from presets
//! - **Plan** - a pure decision table from flags to file operations
//! - **Executor** - confirmation, backup, deletion, relocation and archives
//!
//! # Architecture
//!
//! ```text
//! presets (auto args / answers file)
//!     │
//!     ├── questions::resolve ── Prompter (terminal or scripted)
//!     │
//! FeatureFlags
//!     │
//!     ├── plan::compute_plan ── DistributionLayout
//!     │
//! FilePlan
//!     │
//!     └── executor::execute ── lock, backup, delete, relocate, split, zip
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use dist_pruner::executor::{execute, Confirmation, Outcome};
//! use dist_pruner::flags::{FeatureFlags, RawAnswers};
//! use dist_pruner::layout::DistributionLayout;
//! use dist_pruner::prompt::TerminalPrompter;
//! use dist_pruner::questions::{resolve, QuestionGraph, ResolveContext};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let layout = DistributionLayout::detect(Path::new("."))?;
//! let mut prompter = TerminalPrompter::new();
//! let context = ResolveContext {
//!     backup_exists: layout.backup_exists(),
//! };
//!
//! let answers = resolve(&QuestionGraph::standard()?, &RawAnswers::new(), context, &mut prompter)?;
//! let flags = FeatureFlags::from_raw(&answers.to_raw(), layout.installed_package());
//! let plan = dist_pruner::compute_plan(&flags, &layout);
//!
//! if let Outcome::Completed(summary) = execute(&plan, &layout, &flags, &mut prompter, Confirmation::Ask)? {
//!     println!("{} paths deleted", summary.deleted);
//! }
//! # Ok(())
//! # }
//! ```

pub mod executor;
pub mod flags;
pub mod layout;
pub mod plan;
pub mod prompt;
pub mod questions;

pub use executor::{execute, Confirmation, Outcome, Summary};
pub use flags::{Answer, FeatureFlags, FlagKey};
pub use layout::DistributionLayout;
pub use plan::{compute_plan, FilePlan};
