pub mod loader;
pub mod schema;

pub use loader::{builtin, load_from_path, load_from_str, ConfigError, PlanSource};
pub use schema::{Metadata, PatchPlan, RuleDefinition, ValidationError, ValidationIssue};
