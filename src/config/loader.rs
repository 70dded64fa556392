use crate::config::schema::{PatchPlan, ValidationError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const BUILTIN_PLAN: &str = include_str!("../../plans/case_history_consanguinity.toml");

/// Where a plan's TOML came from, for error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanSource {
    Builtin,
    Inline,
    File(PathBuf),
}

impl fmt::Display for PlanSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanSource::Builtin => f.write_str("built-in plan"),
            PlanSource::Inline => f.write_str("inline plan"),
            PlanSource::File(path) => write!(f, "plan file {}", path.display()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot open plan file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{plan} is not a valid rule/renumber TOML document: {source}")]
    Toml {
        plan: PlanSource,
        source: toml_edit::de::Error,
    },

    #[error("{plan} was rejected: {source}")]
    Validation {
        plan: PlanSource,
        source: ValidationError,
    },
}

impl ConfigError {
    fn attributed_to(self, origin: PlanSource) -> Self {
        match self {
            ConfigError::Toml { source, .. } => ConfigError::Toml {
                plan: origin,
                source,
            },
            ConfigError::Validation { source, .. } => ConfigError::Validation {
                plan: origin,
                source,
            },
            io => io,
        }
    }
}

pub fn load_from_str(input: &str) -> Result<PatchPlan, ConfigError> {
    let plan: PatchPlan = toml_edit::de::from_str(input).map_err(|source| ConfigError::Toml {
        plan: PlanSource::Inline,
        source,
    })?;
    plan.validate().map_err(|source| ConfigError::Validation {
        plan: PlanSource::Inline,
        source,
    })?;
    Ok(plan)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<PatchPlan, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents)
        .map_err(|error| error.attributed_to(PlanSource::File(path.to_path_buf())))
}

/// The plan shipped with the binary: merge the consanguinity flags of the
/// case history model and close the `$49..=$146` placeholder gap.
pub fn builtin() -> Result<PatchPlan, ConfigError> {
    load_from_str(BUILTIN_PLAN).map_err(|error| error.attributed_to(PlanSource::Builtin))
}
