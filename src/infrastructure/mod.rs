//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `fs/` - File system implementation (local disk)
//! - `providers/` - Deployment providers (local simulation, `az` CLI)
//! - `events/` - Event sinks (NDJSON)

pub mod events;
pub mod fs;
pub mod providers;

// Re-export for convenience
pub use events::JsonEventSink;
pub use fs::LocalFs;
pub use providers::{AzCliProvider, LocalProvider};
