use anyhow::{Context, Result};
use case_history_patcher::config::{builtin, load_from_path, PatchPlan};
use case_history_patcher::{PatchReport, RuleOutcome, RuleStatus, TextPatcher, WriteMode};
use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "case-history-patcher")]
#[command(
    about = "Merge the consanguinity flags of the case history model and renumber its SQL placeholders",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Defaults to `apply` with the built-in plan
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the plan to the target file
    Apply {
        /// File to patch (defaults to the plan's target)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Patch plan TOML (defaults to the built-in plan)
        #[arg(short, long)]
        plan: Option<PathBuf>,

        /// Dry run - show what would be changed without modifying the file
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Report which rules would apply, without modifying the file
    Status {
        /// File to inspect (defaults to the plan's target)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Patch plan TOML (defaults to the built-in plan)
        #[arg(short, long)]
        plan: Option<PathBuf>,
    },

    /// Print the rules and renumber range of a plan
    Show {
        /// Patch plan TOML (defaults to the built-in plan)
        #[arg(short, long)]
        plan: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        None => cmd_apply(None, None, false, false),

        Some(Commands::Apply {
            file,
            plan,
            dry_run,
            diff,
        }) => cmd_apply(file, plan, dry_run, diff),

        Some(Commands::Status { file, plan }) => cmd_status(file, plan),

        Some(Commands::Show { plan }) => cmd_show(plan),
    }
}

/// Helper: Load the plan from `--plan` or fall back to the built-in one.
fn load_plan(path: Option<PathBuf>) -> Result<PatchPlan> {
    let plan = match path {
        Some(path) => load_from_path(&path)?,
        None => builtin()?,
    };
    Ok(plan)
}

/// Helper: `--file` wins over the plan's `meta.target`.
fn resolve_target(file: Option<PathBuf>, plan: &PatchPlan) -> Result<PathBuf> {
    if let Some(file) = file {
        return Ok(file);
    }

    plan.meta
        .target
        .as_ref()
        .map(PathBuf::from)
        .with_context(|| {
            format!(
                "plan '{}' has no meta.target; pass --file to choose the file to patch",
                plan.meta.name
            )
        })
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => continue,
        };
        print!("{}", sign);
    }
}

fn print_rule_status(status: &RuleStatus, dry_run: bool) {
    match status.outcome {
        RuleOutcome::Applied { occurrences } => {
            let verb = if dry_run { "Would replace" } else { "Replaced" };
            println!(
                "{} {}: {} {} block(s)",
                "✓".green(),
                status.id,
                verb,
                occurrences
            );
        }
        RuleOutcome::AlreadyApplied => {
            println!("{} {}: Already applied", "⊙".yellow(), status.id);
        }
        RuleOutcome::Missing { drift: false } => {
            println!("{} {}: Target not found (skipped)", "⊘".cyan(), status.id);
        }
        RuleOutcome::Missing { drift: true } => {
            println!(
                "{} {}: Target not found verbatim (skipped)",
                "⚠".yellow(),
                status.id
            );
            println!(
                "  {}",
                "A whitespace-insensitive match exists; the file was probably reformatted".yellow()
            );
        }
    }
}

fn print_summary(report: &PatchReport) {
    let drifted = report.drifted().count();
    let skipped = report
        .rules
        .iter()
        .filter(|r| matches!(r.outcome, RuleOutcome::Missing { .. }))
        .count();
    let already = report
        .rules
        .iter()
        .filter(|r| r.outcome == RuleOutcome::AlreadyApplied)
        .count();

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} applied", format!("{}", report.applied_count()).green());
    println!("  {} already applied", format!("{}", already).yellow());
    println!("  {} skipped", format!("{}", skipped).cyan());
    if drifted > 0 {
        println!("  {} with formatting drift", format!("{}", drifted).yellow());
    }
    println!(
        "  {} placeholders renumbered",
        format!("{}", report.placeholders_shifted).green()
    );
}

fn cmd_apply(
    file: Option<PathBuf>,
    plan: Option<PathBuf>,
    dry_run: bool,
    show_diff: bool,
) -> Result<()> {
    let plan = load_plan(plan)?;
    let target = resolve_target(file, &plan)?;
    let patcher = TextPatcher::new(&plan);

    let mode = if dry_run {
        println!("{}", "[DRY RUN - showing what would be applied]".cyan());
        WriteMode::DryRun
    } else {
        WriteMode::Write
    };

    let report = patcher.patch_file(&target, mode)?;

    println!("Target: {}", target.display());
    for status in &report.rules {
        print_rule_status(status, dry_run);
    }

    if report.looks_like_rerun() {
        eprintln!(
            "{}",
            "Warning: every matching rule was already applied; placeholders were renumbered again"
                .yellow()
        );
    }

    if show_diff && report.changed() {
        display_diff(&target, &report.original, &report.patched);
    }

    print_summary(&report);

    if !dry_run {
        println!();
        println!("{}", "Model updated successfully!".green().bold());
    }

    Ok(())
}

fn cmd_status(file: Option<PathBuf>, plan: Option<PathBuf>) -> Result<()> {
    let plan = load_plan(plan)?;
    let target = resolve_target(file, &plan)?;
    let patcher = TextPatcher::new(&plan);

    let content = fs::read_to_string(&target)
        .with_context(|| format!("failed to read {}", target.display()))?;

    println!("{}", "Patch Status Report".bold());
    println!("Plan: {}", plan.meta.name);
    println!("Target: {}", target.display());
    println!();

    let report = patcher.patch_text(&content);
    let statuses = &report.rules;
    let pending: Vec<_> = statuses.iter().filter(|s| s.outcome.is_applied()).collect();
    let applied: Vec<_> = statuses
        .iter()
        .filter(|s| s.outcome == RuleOutcome::AlreadyApplied)
        .collect();
    let missing: Vec<_> = statuses
        .iter()
        .filter(|s| matches!(s.outcome, RuleOutcome::Missing { .. }))
        .collect();

    if !pending.is_empty() {
        println!(
            "{} {} ({} rules)",
            "⊙".yellow(),
            "NOT APPLIED".yellow().bold(),
            pending.len()
        );
        for status in &pending {
            println!("  - {}", status.id);
        }
        println!();
    }

    if !applied.is_empty() {
        println!(
            "{} {} ({} rules)",
            "✓".green(),
            "APPLIED".green().bold(),
            applied.len()
        );
        for status in &applied {
            println!("  - {}", status.id);
        }
        println!();
    }

    if !missing.is_empty() {
        println!(
            "{} {} ({} rules)",
            "⊘".cyan(),
            "NOT FOUND".cyan().bold(),
            missing.len()
        );
        for status in &missing {
            let note = match status.outcome {
                RuleOutcome::Missing { drift: true } => "formatting drift",
                _ => "absent",
            };
            println!("  - {} ({})", status.id, note.dimmed());
        }
        println!();
    }

    if let Some(range) = patcher.renumber() {
        println!(
            "Renumber ${}..=${} by {}: {} placeholders would be renumbered",
            range.start, range.end, range.shift, report.placeholders_shifted
        );
        if pending.is_empty() && !applied.is_empty() {
            println!(
                "{}",
                "  Running apply again would shift these placeholders a second time".yellow()
            );
        }
    }

    Ok(())
}

fn cmd_show(plan: Option<PathBuf>) -> Result<()> {
    let plan = load_plan(plan)?;

    println!("{} {}", "Plan:".bold(), plan.meta.name);
    if let Some(description) = &plan.meta.description {
        println!("{}", description.dimmed());
    }
    if let Some(target) = &plan.meta.target {
        println!("Target: {}", target);
    }
    println!();

    for (idx, rule) in plan.rules.iter().enumerate() {
        println!("{}. {}", idx + 1, rule.id.bold());
        for line in rule.search.lines() {
            println!("{}", format!("  -{}", line).red());
        }
        for line in rule.replace.lines() {
            println!("{}", format!("  +{}", line).green());
        }
        println!();
    }

    match plan.renumber {
        Some(range) => println!(
            "Renumber: ${}..=${} shifted by {}",
            range.start, range.end, range.shift
        ),
        None => println!("Renumber: none"),
    }

    Ok(())
}
