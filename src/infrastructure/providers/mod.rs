//! Deployment provider implementations
//!
//! - `LocalProvider` - file-backed simulation for offline runs and tests
//! - `AzCliProvider` - the `az` command-line client

mod az_cli;
pub mod local;

pub use az_cli::AzCliProvider;
pub use local::{LocalProvider, DEFAULT_STATE_DIR, LOCAL_SUBSCRIPTION_ID, LOCAL_TENANT_ID};
