//! Removal planning
//!
//! Turns a deployment's operation log into an ordered deletion list:
//! locks first (they block everything else), then deepest ids first so
//! children and extension resources go before their parents, resource
//! groups last.

use std::cmp::Reverse;

use crate::domain::entities::DeploymentState;
use crate::domain::ports::{DeploymentOperation, OperationKind};

/// Resource ids to delete, in deletion order
pub fn plan_removal(operations: &[DeploymentOperation]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();

    for op in operations {
        if op.kind != OperationKind::Create
            || op.state != DeploymentState::Succeeded
            || op.is_nested_deployment()
        {
            continue;
        }
        let Some(id) = op.resource_id.as_deref().map(str::trim) else {
            continue;
        };
        if id.is_empty() || ids.iter().any(|existing| existing.eq_ignore_ascii_case(id)) {
            continue;
        }
        ids.push(id.to_string());
    }

    ids.sort_by_key(|id| (priority(id), Reverse(depth(id)), id.to_ascii_lowercase()));
    ids
}

fn priority(id: &str) -> u8 {
    let lower = id.to_ascii_lowercase();
    if lower.contains("/providers/microsoft.authorization/locks/") {
        0
    } else if is_resource_group(&lower) {
        2
    } else {
        1
    }
}

fn depth(id: &str) -> usize {
    id.split('/').filter(|s| !s.is_empty()).count()
}

fn is_resource_group(lower_id: &str) -> bool {
    let segments: Vec<&str> = lower_id.split('/').filter(|s| !s.is_empty()).collect();
    segments.len() == 4 && segments[0] == "subscriptions" && segments[2] == "resourcegroups"
}
