//! Property tests for scope resolution.

use proptest::prelude::*;

use iacdeploy::domain::value_objects::{ScopeSelector, TargetScope};

fn identifier() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        Just(Some("   ".to_string())),
        proptest::string::string_regex("[a-z][a-z0-9-]{0,15}")
            .unwrap()
            .prop_map(Some),
    ]
}

fn set(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: resource group > management group > subscription, always exactly one.
    #[test]
    fn property_scope_precedence(
        resource_group_name in identifier(),
        subscription_id in identifier(),
        management_group_id in identifier(),
    ) {
        let selector = ScopeSelector {
            resource_group_name: resource_group_name.clone(),
            subscription_id: subscription_id.clone(),
            management_group_id: management_group_id.clone(),
        };

        let expected = match (
            set(&resource_group_name),
            set(&management_group_id),
            set(&subscription_id),
        ) {
            (Some(rg), _, sub) => TargetScope::ResourceGroup {
                name: rg.to_string(),
                subscription_id: sub.map(str::to_string),
            },
            (None, Some(mg), _) => TargetScope::ManagementGroup { id: mg.to_string() },
            (None, None, sub) => TargetScope::Subscription {
                id: sub.map(str::to_string),
            },
        };

        prop_assert_eq!(selector.resolve(), expected);
        // Resolution is deterministic
        prop_assert_eq!(selector.resolve(), selector.clone().resolve());
    }

    /// PROPERTY: only a management group next to another identifier is ambiguous.
    #[test]
    fn property_ambiguity(
        resource_group_name in identifier(),
        subscription_id in identifier(),
        management_group_id in identifier(),
    ) {
        let selector = ScopeSelector {
            resource_group_name: resource_group_name.clone(),
            subscription_id: subscription_id.clone(),
            management_group_id: management_group_id.clone(),
        };
        let others = set(&resource_group_name).is_some() || set(&subscription_id).is_some();

        prop_assert_eq!(
            selector.is_ambiguous(),
            set(&management_group_id).is_some() && others
        );
    }
}
