//! Persistent state of the local provider
//!
//! Stored as `state.json` in the state directory. Every access takes an
//! exclusive lock on `state.lock` so concurrent runs serialize.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::Utc;
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::domain::entities::DeploymentState;
use crate::domain::ports::{
    DeletionStatus, DeploymentOperation, DeploymentOutputs, OperationKind, ProviderError,
    ProviderResult,
};
use crate::domain::value_objects::{ProviderDiagnostic, TargetScope};
use crate::infrastructure::fs::atomic_write;

use super::arm::{resource_id, Evaluation, DEPLOYMENTS_TYPE};

const STATE_FILE: &str = "state.json";
const LOCK_FILE: &str = "state.lock";

/// Lowercased id of a deployment below a scope
pub fn deployment_key(scope_prefix: &str, name: &str) -> String {
    resource_id(scope_prefix, DEPLOYMENTS_TYPE, name).to_ascii_lowercase()
}

/// Recorded deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub name: String,
    pub scope: TargetScope,
    pub state: DeploymentState,
    #[serde(default)]
    pub template_hash: String,
    pub timestamp: String,
    #[serde(default)]
    pub outputs: DeploymentOutputs,
    #[serde(default)]
    pub operations: Vec<DeploymentOperation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ProviderDiagnostic>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalState {
    /// Keyed by lowercased deployment resource id
    #[serde(default)]
    pub deployments: BTreeMap<String, DeploymentRecord>,
    /// Lowercased resource id -> id as deployed
    #[serde(default)]
    pub resources: BTreeMap<String, String>,
}

impl LocalState {
    /// Record an evaluated deployment and everything it created
    pub(super) fn record(
        &mut self,
        scope_prefix: &str,
        name: &str,
        scope: &TargetScope,
        evaluation: &Evaluation,
        template_hash: &str,
    ) {
        for op in &evaluation.operations {
            if op.state.is_success() && !op.resource_type.eq_ignore_ascii_case(DEPLOYMENTS_TYPE) {
                self.resources
                    .insert(op.resource_id.to_ascii_lowercase(), op.resource_id.clone());
            }
        }

        for nested in &evaluation.nested {
            self.record(scope_prefix, &nested.name, scope, &nested.evaluation, "");
        }

        let operations = evaluation
            .operations
            .iter()
            .map(|op| DeploymentOperation {
                resource_id: Some(op.resource_id.clone()),
                resource_type: Some(op.resource_type.clone()),
                kind: OperationKind::Create,
                state: op.state,
            })
            .collect();

        self.deployments.insert(
            deployment_key(scope_prefix, name),
            DeploymentRecord {
                name: name.to_string(),
                scope: scope.clone(),
                state: evaluation.state,
                template_hash: template_hash.to_string(),
                timestamp: Utc::now().to_rfc3339(),
                outputs: evaluation.outputs.clone(),
                operations,
                error: evaluation.error.clone(),
            },
        );
    }

    /// Delete a resource and everything below it
    pub(super) fn delete(&mut self, resource_id: &str) -> DeletionStatus {
        let key = resource_id.trim_end_matches('/').to_ascii_lowercase();
        if !self.resources.contains_key(&key) {
            return DeletionStatus::AlreadyAbsent;
        }

        let child_prefix = format!("{}/", key);
        self.resources
            .retain(|id, _| id != &key && !id.starts_with(&child_prefix));
        DeletionStatus::Deleted
    }

    pub fn contains(&self, resource_id: &str) -> bool {
        self.resources
            .contains_key(&resource_id.to_ascii_lowercase())
    }
}

/// Locked access to `state.json`
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn read<T>(&self, f: impl FnOnce(&LocalState) -> ProviderResult<T>) -> ProviderResult<T> {
        let _lock = self.lock()?;
        let state = self.load()?;
        f(&state)
    }

    pub fn update<T>(
        &self,
        f: impl FnOnce(&mut LocalState) -> ProviderResult<T>,
    ) -> ProviderResult<T> {
        let _lock = self.lock()?;
        let mut state = self.load()?;
        let out = f(&mut state)?;
        self.save(&state)?;
        Ok(out)
    }

    /// Lock is released when the returned file is dropped
    fn lock(&self) -> ProviderResult<File> {
        std::fs::create_dir_all(&self.dir)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.dir.join(LOCK_FILE))?;
        file.lock_exclusive()?;
        Ok(file)
    }

    fn load(&self) -> ProviderResult<LocalState> {
        let path = self.dir.join(STATE_FILE);
        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                ProviderError::InvalidResponse(format!(
                    "corrupt state file {}: {}",
                    path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(LocalState::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, state: &LocalState) -> ProviderResult<()> {
        let path = self.dir.join(STATE_FILE);
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        atomic_write(&path, json.as_bytes())
            .map_err(|e| ProviderError::Unavailable(format!("cannot write state: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn state_with(ids: &[&str]) -> LocalState {
        let mut state = LocalState::default();
        for id in ids {
            state.resources.insert(id.to_ascii_lowercase(), id.to_string());
        }
        state
    }

    #[test]
    fn delete_cascades_to_children() {
        let mut state = state_with(&[
            "/subscriptions/s/resourceGroups/rg",
            "/subscriptions/s/resourceGroups/rg/providers/Microsoft.KeyVault/vaults/kv",
            "/subscriptions/s/resourceGroups/rg2",
        ]);

        let status = state.delete("/subscriptions/s/resourceGroups/RG");

        assert_eq!(status, DeletionStatus::Deleted);
        assert_eq!(state.resources.len(), 1);
        assert!(state.contains("/subscriptions/s/resourceGroups/rg2"));
    }

    #[test]
    fn delete_missing_is_already_absent() {
        let mut state = state_with(&["/subscriptions/s/resourceGroups/rg"]);
        assert_eq!(
            state.delete("/subscriptions/s/resourceGroups/other"),
            DeletionStatus::AlreadyAbsent
        );
        assert_eq!(state.resources.len(), 1);
    }

    #[test]
    fn store_persists_between_accesses() {
        let dir = tempdir().unwrap();
        let store = StateStore::new(dir.path().join("state"));

        store
            .update(|s| {
                s.resources.insert("a".to_string(), "A".to_string());
                Ok(())
            })
            .unwrap();

        let count = store.read(|s| Ok(s.resources.len())).unwrap();
        assert_eq!(count, 1);
        assert!(dir.path().join("state").join(STATE_FILE).is_file());
    }

    #[test]
    fn corrupt_state_is_reported() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(STATE_FILE), "{ nope").unwrap();

        let err = StateStore::new(dir.path()).read(|_| Ok(())).unwrap_err();

        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }
}
