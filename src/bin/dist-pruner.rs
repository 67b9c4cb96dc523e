use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use dist_pruner::executor::{execute, Confirmation, Outcome, Summary};
use dist_pruner::flags::config::load_answers_file;
use dist_pruner::flags::{Answer, FeatureFlags, FlagKey, RawAnswers};
use dist_pruner::layout::DistributionLayout;
use dist_pruner::plan::{compute_plan, FilePlan};
use dist_pruner::prompt::TerminalPrompter;
use dist_pruner::questions::{resolve, QuestionGraph, ResolveContext};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Remove the parts of the SDK distribution your deployment does not use.
#[derive(Parser, Debug)]
#[command(name = "dist-pruner", version)]
struct Cli {
    /// Distribution root holding the package folder
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// TOML file with preset answers; preset questions are not asked
    #[arg(long)]
    answers: Option<PathBuf>,

    /// Log every file operation
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run without questions; every flag comes from the arguments
    Auto(AutoArgs),
    /// Resolve the flags and print the resulting plan as JSON without touching the tree
    Plan,
}

#[derive(Args, Debug)]
struct AutoArgs {
    #[arg(long)]
    backup_files: bool,
    #[arg(long)]
    using_web_viewer_server: bool,
    #[arg(long)]
    will_convert_to_xod: bool,
    #[arg(long)]
    need_client_side_office_support: bool,
    #[arg(long)]
    use_legacy_office: bool,
    #[arg(long)]
    use_full_api: bool,
    #[arg(long)]
    pdfnet_prod: bool,
    #[arg(long)]
    use_content_edit: bool,
    #[arg(long)]
    use_office_editor: bool,
    #[arg(long)]
    use_spreadsheet_editor: bool,
    #[arg(long)]
    salesforce_support: bool,
    #[arg(long)]
    use_source_map: bool,
    #[arg(long)]
    exclude_optimized_workers: bool,
    #[arg(long)]
    use_web_component: bool,
    /// Confirm the deletion without asking
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    delete_unused: bool,
}

impl AutoArgs {
    /// Every flag, preset from the arguments.
    fn presets(&self) -> RawAnswers {
        [
            (FlagKey::Backup, self.backup_files),
            (FlagKey::WebViewerServer, self.using_web_viewer_server),
            (FlagKey::ConvertToXod, self.will_convert_to_xod),
            (FlagKey::Office, self.need_client_side_office_support),
            (FlagKey::LegacyOffice, self.use_legacy_office),
            (FlagKey::FullApi, self.use_full_api),
            (FlagKey::PdfnetProd, self.pdfnet_prod),
            (FlagKey::ContentEdit, self.use_content_edit),
            (FlagKey::OfficeEditor, self.use_office_editor),
            (FlagKey::SpreadsheetEditor, self.use_spreadsheet_editor),
            (FlagKey::Salesforce, self.salesforce_support),
            (FlagKey::SourceMap, self.use_source_map),
            (FlagKey::ExcludeOptimizedWorkers, self.exclude_optimized_workers),
            (FlagKey::WebComponent, self.use_web_component),
            (FlagKey::DeleteUnused, self.delete_unused),
        ]
        .into_iter()
        .map(|(key, value)| (key, Some(Answer::from(value))))
        .collect()
    }
}

#[derive(Serialize)]
struct PlanReport<'a> {
    flags: &'a FeatureFlags,
    plan: &'a FilePlan,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let layout = DistributionLayout::detect(&cli.root)
        .with_context(|| format!("detecting distribution layout in '{}'", cli.root.display()))?;

    match &cli.command {
        None => run_interactive(&layout, cli.answers.as_deref()),
        Some(Command::Auto(args)) => {
            if cli.answers.is_some() {
                bail!("--answers cannot be combined with `auto`; pass the flags as arguments");
            }
            run_auto(&layout, args)
        }
        Some(Command::Plan) => print_plan(&layout, cli.answers.as_deref()),
    }
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` with `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_presets(answers: Option<&Path>) -> Result<RawAnswers> {
    match answers {
        Some(path) => load_answers_file(path),
        None => Ok(RawAnswers::new()),
    }
}

fn resolve_flags(
    layout: &DistributionLayout,
    presets: &RawAnswers,
    prompter: &mut TerminalPrompter,
) -> Result<FeatureFlags> {
    let graph = QuestionGraph::standard()?;
    let context = ResolveContext {
        backup_exists: layout.backup_exists(),
    };
    let resolved = resolve(&graph, presets, context, prompter)?;
    Ok(FeatureFlags::from_raw(
        &resolved.to_raw(),
        layout.installed_package(),
    ))
}

fn run_interactive(layout: &DistributionLayout, answers: Option<&Path>) -> Result<()> {
    let presets = load_presets(answers)?;

    println!(
        "\nThis tool will delete any files you won't be using in your {} folder. Please use with caution!",
        layout.package_folder()
    );
    println!(
        "\nPress CTRL + C at any time to safely cancel this process. If you are unsure of any answer, \
         please clarify before answering them."
    );
    if layout.backup_exists() {
        println!("\nA backup will not be created because a backup already exists!");
    }

    let mut prompter = TerminalPrompter::new();
    let flags = resolve_flags(layout, &presets, &mut prompter)?;
    let plan = compute_plan(&flags, layout);
    let confirmation = Confirmation::for_presets(&presets);
    let outcome = execute(&plan, layout, &flags, &mut prompter, confirmation)?;
    report(layout, outcome);
    Ok(())
}

fn run_auto(layout: &DistributionLayout, args: &AutoArgs) -> Result<()> {
    let mut prompter = TerminalPrompter::new();
    let flags = resolve_flags(layout, &args.presets(), &mut prompter)?;
    let plan = compute_plan(&flags, layout);
    let outcome = execute(&plan, layout, &flags, &mut prompter, Confirmation::Preset)?;
    report(layout, outcome);
    Ok(())
}

fn print_plan(layout: &DistributionLayout, answers: Option<&Path>) -> Result<()> {
    let presets = load_presets(answers)?;
    let flags = resolve_flags(layout, &presets, &mut TerminalPrompter::new())?;
    let plan = compute_plan(&flags, layout);

    let json = serde_json::to_string_pretty(&PlanReport {
        flags: &flags,
        plan: &plan,
    })
    .context("serializing plan")?;
    println!("{json}");
    Ok(())
}

fn report(layout: &DistributionLayout, outcome: Outcome) {
    match outcome {
        Outcome::Declined => println!("\nProcess exited. No action will be taken.\n"),
        Outcome::Completed(summary) => print_summary(layout, &summary),
    }
}

fn print_summary(layout: &DistributionLayout, summary: &Summary) {
    if let Some(backup) = &summary.backup {
        println!("\nBackup created in {}", backup.display());
    }
    println!(
        "\n{} paths deleted, {} matched by pattern, {} renamed",
        summary.deleted, summary.wildcard_deleted, summary.renamed
    );
    if summary.archives.is_empty() {
        println!(
            "\nDone! Your {} folder is now optimized for production use.\n",
            layout.package_folder()
        );
    } else {
        println!(
            "{} files extracted, {} archives written to {}\n",
            summary.relocated,
            summary.archives.len(),
            layout.resource_dir().display()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_presets_every_flag() {
        let cli = Cli::parse_from(["dist-pruner", "auto", "--use-full-api", "--pdfnet-prod"]);
        let Some(Command::Auto(args)) = cli.command else {
            panic!("expected auto");
        };

        let presets = args.presets();
        assert_eq!(presets.len(), FlagKey::ALL.len());
        assert_eq!(presets[&FlagKey::FullApi], Some(Answer::Yes));
        assert_eq!(presets[&FlagKey::PdfnetProd], Some(Answer::Yes));
        assert_eq!(presets[&FlagKey::Office], Some(Answer::No));
        assert_eq!(presets[&FlagKey::DeleteUnused], Some(Answer::Yes));
    }

    #[test]
    fn test_auto_delete_unused_can_be_disabled() {
        let cli = Cli::parse_from(["dist-pruner", "auto", "--delete-unused", "false"]);
        let Some(Command::Auto(args)) = cli.command else {
            panic!("expected auto");
        };
        assert_eq!(args.presets()[&FlagKey::DeleteUnused], Some(Answer::No));
    }

    #[test]
    fn test_global_root_after_subcommand() {
        let cli = Cli::parse_from(["dist-pruner", "plan", "--root", "/sdk", "-v"]);
        assert_eq!(cli.root, PathBuf::from("/sdk"));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Command::Plan)));
    }

    #[test]
    fn test_interactive_is_default() {
        let cli = Cli::parse_from(["dist-pruner", "--answers", "answers.toml"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.answers, Some(PathBuf::from("answers.toml")));
    }
}
