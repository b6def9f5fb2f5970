//! Deploy Module
//!
//! Creates one deployment and reports its typed outcome.
//!
//! ## Structure
//!
//! - `options` - Configuration types (`DeployOptions`)
//! - `use_case` - Core use case logic (`DeploymentExecutor`)
//!
//! ## Usage
//!
//! ```ignore
//! use iacdeploy::application::deploy::{DeployOptions, DeploymentExecutor};
//!
//! let executor = DeploymentExecutor::new(provider, DeployOptions::from_settings(&settings));
//! let result = executor.execute(&request)?;
//! if !result.succeeded() { /* failure detail in result */ }
//! ```

mod options;
mod use_case;

pub use options::DeployOptions;
pub use use_case::DeploymentExecutor;
