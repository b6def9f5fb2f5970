//! Domain Layer
//!
//! The core of iacdeploy - deployment rules without I/O dependencies.
//!
//! ## Structure
//!
//! - `entities/` - Deployment requests/results, removal reports, template info
//! - `value_objects/` - Immutable value types (TargetScope, TokenMap, diagnostics)
//! - `services/` - Token substitution, parameter defaults, removal ordering
//! - `ports/` - Interface definitions for infrastructure
//!
//! ## Design Principles
//!
//! 1. **No I/O** - This layer never touches the file system or the provider directly
//! 2. **Pure Functions** - Services are stateless and testable
//! 3. **Ports & Adapters** - All I/O goes through trait-defined ports

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
