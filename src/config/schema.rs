use crate::edit::Rule;
use crate::renumber::RenumberRange;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PatchPlan {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
    #[serde(default)]
    pub renumber: Option<RenumberRange>,
}

impl PatchPlan {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.rules.is_empty() {
            issues.push(ValidationIssue::EmptyRuleList);
        }

        let mut seen = HashSet::new();
        for rule in &self.rules {
            if rule.id.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    rule_id: None,
                    field: "id",
                });
            } else if !seen.insert(rule.id.as_str()) {
                issues.push(ValidationIssue::DuplicateId(rule.id.clone()));
            }

            if rule.search.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    rule_id: Some(rule.id.clone()),
                    field: "search",
                });
            }
        }

        if let Some(range) = &self.renumber {
            if range.start > range.end {
                issues.push(ValidationIssue::InvalidRange {
                    message: format!("start {} is greater than end {}", range.start, range.end),
                });
            }
            if range.shift == 0 {
                issues.push(ValidationIssue::InvalidRange {
                    message: "shift must be non-zero".to_string(),
                });
            }
            if matches!(i64::from(range.start).checked_add(range.shift), Some(v) if v < 0) {
                issues.push(ValidationIssue::InvalidRange {
                    message: format!(
                        "shift {} would move ${} below $0",
                        range.shift, range.start
                    ),
                });
            }
            let top = i64::from(range.end).checked_add(range.shift);
            if !matches!(top, Some(v) if v <= i64::from(u32::MAX)) {
                issues.push(ValidationIssue::InvalidRange {
                    message: format!(
                        "shift {} would move ${} past ${}",
                        range.shift,
                        range.end,
                        u32::MAX
                    ),
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Rules in application order.
    pub fn build_rules(&self) -> Vec<Rule> {
        self.rules
            .iter()
            .map(|def| Rule::new(def.id.clone(), def.search.clone(), def.replace.clone()))
            .collect()
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Default file to patch, relative to the invocation directory
    #[serde(default)]
    pub target: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RuleDefinition {
    pub id: String,
    /// Exact text to find, whitespace included
    pub search: String,
    #[serde(default)]
    pub replace: String,
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyRuleList,
    MissingField {
        rule_id: Option<String>,
        field: &'static str,
    },
    DuplicateId(String),
    InvalidRange {
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyRuleList => write!(f, "patch plan contains no rules"),
            ValidationIssue::MissingField { rule_id, field } => match rule_id {
                Some(id) => write!(f, "rule '{id}' missing required field '{field}'"),
                None => write!(f, "rule missing required field '{field}'"),
            },
            ValidationIssue::DuplicateId(id) => write!(f, "rule id '{id}' is used more than once"),
            ValidationIssue::InvalidRange { message } => {
                write!(f, "invalid renumber range: {message}")
            }
        }
    }
}
