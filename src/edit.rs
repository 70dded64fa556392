use std::fs;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// The fundamental edit primitive: a whole-document literal replacement.
///
/// Every occurrence of `search` is replaced by `replace`. Whitespace and
/// indentation are part of the match, so a rule only fires on byte-exact
/// blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Stable identifier used in reports
    pub id: String,
    /// Exact text to find
    pub search: String,
    /// Text substituted for every occurrence of `search`
    pub replace: String,
}

/// Outcome of applying one rule to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "RuleOutcome should be checked for applied/missing"]
pub enum RuleOutcome {
    /// Rule matched and replaced `occurrences` blocks
    Applied { occurrences: usize },
    /// Search text is absent but the replacement is already present
    AlreadyApplied,
    /// Neither text is present. `drift` is set when the search text does
    /// occur once whitespace differences are ignored.
    Missing { drift: bool },
}

impl RuleOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, RuleOutcome::Applied { .. })
    }
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("Path has no parent directory: {0}")]
    NoParent(std::path::PathBuf),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Rule {
    pub fn new(
        id: impl Into<String>,
        search: impl Into<String>,
        replace: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            search: search.into(),
            replace: replace.into(),
        }
    }

    /// Classify the rule against `text` without changing it.
    pub fn check(&self, text: &str) -> RuleOutcome {
        let occurrences = text.matches(self.search.as_str()).count();
        if occurrences > 0 {
            return RuleOutcome::Applied { occurrences };
        }

        if !self.replace.is_empty() && text.contains(self.replace.as_str()) {
            return RuleOutcome::AlreadyApplied;
        }

        RuleOutcome::Missing {
            drift: crate::drift::has_whitespace_drift(text, &self.search),
        }
    }

    /// Apply the rule to `text`, returning the new text and what happened.
    ///
    /// An absent search text is a no-op: the input comes back unchanged.
    pub fn apply(&self, text: &str) -> (String, RuleOutcome) {
        let outcome = self.check(text);
        match outcome {
            RuleOutcome::Applied { .. } => {
                (text.replace(self.search.as_str(), &self.replace), outcome)
            }
            _ => (text.to_string(), outcome),
        }
    }
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Either the full write lands or the target keeps its previous content. The
/// permissions of an existing target carry over to the new file.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), EditError> {
    // Same directory keeps the rename on one filesystem
    let parent = match path.parent() {
        Some(p) if p.as_os_str().is_empty() => Path::new("."),
        Some(p) => p,
        None => return Err(EditError::NoParent(path.to_path_buf())),
    };

    let permissions = fs::metadata(path).ok().map(|meta| meta.permissions());

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;

    if let Some(permissions) = permissions {
        temp.as_file().set_permissions(permissions)?;
    }

    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
