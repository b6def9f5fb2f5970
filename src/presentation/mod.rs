//! Presentation Layer
//!
//! This layer handles:
//! - Creating use cases with infrastructure dependencies
//! - Picking the deployment provider from settings
//!
//! ## Structure
//!
//! - `factory` - Creates use cases with proper dependencies (dependency injection)
//!
//! ## Usage
//!
//! ```ignore
//! use iacdeploy::presentation::factory;
//!
//! let provider = factory::create_provider(&settings);
//! let orchestrator = factory::create_orchestrator(provider, settings);
//! let report = orchestrator.run(&options)?;
//! ```

pub mod factory;

pub use factory::{create_orchestrator, create_provider};
