//! Use Case Factory
//!
//! Creates use cases with infrastructure dependencies wired up.
//! This is the dependency injection point for the application.

use std::path::PathBuf;
use std::sync::Arc;

use crate::application::{DeploymentRemover, Orchestrator, TemplateValidator, TokenReplacer};
use crate::config::{ProviderKind, Settings};
use crate::domain::ports::DeploymentProvider;
use crate::infrastructure::providers::DEFAULT_STATE_DIR;
use crate::infrastructure::{AzCliProvider, LocalFs, LocalProvider};

/// Provider chosen at runtime from settings
pub type SharedProvider = Arc<dyn DeploymentProvider>;

pub type ConcreteTokenReplacer = TokenReplacer<LocalFs>;
pub type ConcreteValidator = TemplateValidator<SharedProvider>;
pub type ConcreteRemover = DeploymentRemover<SharedProvider>;
pub type ConcreteOrchestrator = Orchestrator<LocalFs, SharedProvider>;

/// State directory the local provider uses for these settings
pub fn local_state_dir(settings: &Settings) -> PathBuf {
    settings
        .provider
        .state_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
}

/// Create the provider named by `settings.provider.kind`
pub fn create_provider(settings: &Settings) -> SharedProvider {
    match settings.provider.kind {
        ProviderKind::Local => Arc::new(LocalProvider::new(local_state_dir(settings))),
        ProviderKind::Az => Arc::new(AzCliProvider::new(settings.provider.az_path.clone())),
    }
}

pub fn create_token_replacer() -> ConcreteTokenReplacer {
    TokenReplacer::new(LocalFs::new())
}

pub fn create_validator(provider: SharedProvider, settings: &Settings) -> ConcreteValidator {
    TemplateValidator::new(provider, settings.default_parameters())
}

pub fn create_remover(provider: SharedProvider) -> ConcreteRemover {
    DeploymentRemover::new(provider)
}

pub fn create_orchestrator(provider: SharedProvider, settings: Settings) -> ConcreteOrchestrator {
    Orchestrator::new(LocalFs::new(), provider, settings)
}
