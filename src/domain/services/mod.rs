//! Domain Services
//!
//! Pure business logic services that operate on domain entities.
//! These services have no I/O dependencies and are easily testable.

mod parameter_overrides;
mod removal_planner;
mod token_replacer;

pub use parameter_overrides::{
    effective_parameters, project_defaults, EffectiveParameters, TELEMETRY_PARAMETER,
};
pub use removal_planner::plan_removal;
pub use token_replacer::{replace_tokens, TokenReplacement};
