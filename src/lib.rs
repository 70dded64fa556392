//! Case History Patcher: one-shot text patcher for the case history model
//!
//! Merges the `family_history_consanguinity_present` and
//! `family_history_consanguinity_absent` columns of the case history data
//! access file into a single `family_history_consanguinity` column, then
//! closes the positional placeholder gap (`$49..=$146` shift down by one) in
//! the generated SQL.
//!
//! # Architecture
//!
//! A [`PatchPlan`] is an ordered list of literal [`Rule`]s plus an optional
//! [`RenumberRange`]. [`TextPatcher`] runs the plan: every rule in order, then
//! the renumbering pass, then a single atomic write.
//!
//! - Rules match byte-exact blocks; an absent block is a no-op
//! - Placeholders match whole tokens, so `$1470` is never read as `$147`
//! - Each in-range token is shifted exactly once per run
//! - The renumbering pass is not idempotent: a second run shifts again
//!
//! # Example
//!
//! ```no_run
//! use case_history_patcher::{TextPatcher, WriteMode};
//! use std::path::Path;
//!
//! let patcher = TextPatcher::builtin()?;
//! let report = patcher.patch_file(Path::new("src/models/CaseHistory.js"), WriteMode::Write)?;
//! println!("{} rules applied", report.applied_count());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod drift;
pub mod edit;
pub mod patcher;
pub mod renumber;

// Re-exports
pub use config::{builtin, load_from_path, load_from_str, ConfigError, PatchPlan, PlanSource};
pub use edit::{atomic_write, EditError, Rule, RuleOutcome};
pub use patcher::{PatchError, PatchReport, RuleStatus, TextPatcher, WriteMode};
pub use renumber::{placeholders, shift_placeholders, Placeholder, RenumberRange};
