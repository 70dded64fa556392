//! Text patcher - applies a patch plan to one file
//!
//! The pipeline is strictly sequential:
//! - read the whole file as UTF-8
//! - apply every rule in plan order
//! - run the placeholder renumbering pass
//! - write the result back in place
//!
//! An absent rule target is a no-op. The only failures are I/O failures.

use crate::config::{ConfigError, PatchPlan};
use crate::edit::{atomic_write, EditError, Rule, RuleOutcome};
use crate::renumber::{shift_placeholders, RenumberRange};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: EditError },
}

/// Whether `patch_file` writes its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Write,
    DryRun,
}

/// Outcome of one rule within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleStatus {
    pub id: String,
    pub outcome: RuleOutcome,
}

/// Everything a run did, plus both versions of the text for diffing.
#[derive(Debug, Clone)]
#[must_use = "PatchReport should be checked for applied rules and drift"]
pub struct PatchReport {
    pub rules: Vec<RuleStatus>,
    /// Number of placeholder tokens rewritten by the renumbering pass
    pub placeholders_shifted: usize,
    pub original: String,
    pub patched: String,
}

impl PatchReport {
    pub fn changed(&self) -> bool {
        self.original != self.patched
    }

    pub fn applied_count(&self) -> usize {
        self.rules.iter().filter(|r| r.outcome.is_applied()).count()
    }

    /// Rules whose target is missing but would match modulo whitespace.
    pub fn drifted(&self) -> impl Iterator<Item = &RuleStatus> {
        self.rules
            .iter()
            .filter(|r| matches!(r.outcome, RuleOutcome::Missing { drift: true }))
    }

    /// No rule fired but at least one found its replacement already in place.
    ///
    /// The renumbering pass still runs in that case and shifts the tokens a
    /// second time.
    pub fn looks_like_rerun(&self) -> bool {
        self.applied_count() == 0
            && self
                .rules
                .iter()
                .any(|r| r.outcome == RuleOutcome::AlreadyApplied)
    }
}

#[derive(Debug, Clone)]
pub struct TextPatcher {
    rules: Vec<Rule>,
    renumber: Option<RenumberRange>,
}

impl TextPatcher {
    pub fn new(plan: &PatchPlan) -> Self {
        Self {
            rules: plan.build_rules(),
            renumber: plan.renumber,
        }
    }

    /// Patcher for the plan shipped with the crate.
    pub fn builtin() -> Result<Self, ConfigError> {
        Ok(Self::new(&crate::config::builtin()?))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn renumber(&self) -> Option<&RenumberRange> {
        self.renumber.as_ref()
    }

    /// Transform `text` in memory.
    pub fn patch_text(&self, text: &str) -> PatchReport {
        let mut current = text.to_string();
        let mut rules = Vec::with_capacity(self.rules.len());

        for rule in &self.rules {
            let (next, outcome) = rule.apply(&current);
            match outcome {
                RuleOutcome::Applied { occurrences } => {
                    tracing::debug!(rule = %rule.id, occurrences, "rule applied");
                }
                RuleOutcome::AlreadyApplied => {
                    tracing::debug!(rule = %rule.id, "rule already applied");
                }
                RuleOutcome::Missing { drift: true } => {
                    tracing::warn!(
                        rule = %rule.id,
                        "rule target not found verbatim but matches with different whitespace"
                    );
                }
                RuleOutcome::Missing { drift: false } => {
                    tracing::debug!(rule = %rule.id, "rule target not found");
                }
            }
            current = next;
            rules.push(RuleStatus {
                id: rule.id.clone(),
                outcome,
            });
        }

        let mut placeholders_shifted = 0;
        if let Some(range) = &self.renumber {
            let (next, shifted) = shift_placeholders(&current, range);
            current = next;
            placeholders_shifted = shifted;
        }

        PatchReport {
            rules,
            placeholders_shifted,
            original: text.to_string(),
            patched: current,
        }
    }

    /// Check each rule against `text` in sequence without keeping the result.
    ///
    /// Later rules are checked against the output of earlier ones, so the
    /// statuses match what `patch_text` would report.
    pub fn status(&self, text: &str) -> Vec<RuleStatus> {
        self.patch_text(text).rules
    }

    /// Read `path`, transform it, and write it back unless `mode` is a dry run.
    pub fn patch_file(&self, path: &Path, mode: WriteMode) -> Result<PatchReport, PatchError> {
        let original = fs::read_to_string(path).map_err(|source| PatchError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let report = self.patch_text(&original);

        if mode == WriteMode::Write {
            atomic_write(path, report.patched.as_bytes()).map_err(|source| PatchError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            tracing::info!(
                file = %path.display(),
                rules_applied = report.applied_count(),
                placeholders_shifted = report.placeholders_shifted,
                "patched file"
            );
        }

        Ok(report)
    }
}
