//! Property tests for removal ordering.

use proptest::prelude::*;

use iacdeploy::domain::entities::DeploymentState;
use iacdeploy::domain::ports::{DeploymentOperation, OperationKind};
use iacdeploy::domain::services::plan_removal;

const RG: &str = "/subscriptions/s/resourceGroups/rg";

fn resource_path() -> impl Strategy<Value = String> {
    let segment = proptest::string::string_regex("[a-z]{1,6}").unwrap();
    proptest::collection::vec(segment, 1..=3).prop_map(|names| {
        let mut id = format!("{RG}/providers/Microsoft.Test");
        for name in names {
            id.push_str("/things/");
            id.push_str(&name);
        }
        id
    })
}

fn created(id: &str) -> DeploymentOperation {
    DeploymentOperation {
        resource_id: Some(id.to_string()),
        resource_type: None,
        kind: OperationKind::Create,
        state: DeploymentState::Succeeded,
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: a child is always deleted before its parent, each id once.
    #[test]
    fn property_children_before_parents(
        ids in proptest::collection::vec(resource_path(), 1..12),
    ) {
        let operations: Vec<DeploymentOperation> = ids.iter().map(|id| created(id)).collect();

        let plan = plan_removal(&operations);

        let mut unique: Vec<String> = ids.iter().map(|i| i.to_ascii_lowercase()).collect();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(plan.len(), unique.len());

        for (i, parent) in plan.iter().enumerate() {
            let prefix = format!("{}/", parent.to_ascii_lowercase());
            let late_child = plan[i + 1..]
                .iter()
                .find(|later| later.to_ascii_lowercase().starts_with(&prefix));
            prop_assert!(
                late_child.is_none(),
                "{:?} deleted after its parent {}",
                late_child,
                parent
            );
        }
    }

    /// PROPERTY: locks go first and the resource group goes last.
    #[test]
    fn property_locks_first_resource_group_last(
        ids in proptest::collection::vec(resource_path(), 0..8),
    ) {
        let lock = format!("{RG}/providers/Microsoft.Authorization/locks/keep");
        let mut operations = vec![created(RG)];
        operations.extend(ids.iter().map(|id| created(id)));
        operations.push(created(&lock));

        let plan = plan_removal(&operations);

        prop_assert_eq!(plan.first(), Some(&lock));
        prop_assert_eq!(plan.last().map(String::as_str), Some(RG));
    }
}
