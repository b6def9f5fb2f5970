//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod config_warning;
pub mod deployment_name;
mod diagnostic;
mod scope;
mod token;

pub use config_warning::ConfigWarning;
pub use diagnostic::ProviderDiagnostic;
pub use scope::{ScopeSelector, TargetScope};
pub use token::{
    TokenDelimiters, TokenMap, TokenMapBuilder, TokenSource, DEFAULT_TOKEN_PREFIX,
    DEFAULT_TOKEN_SUFFIX,
};
