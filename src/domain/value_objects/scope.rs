//! Scope value object - defines where a deployment is applied
//!
//! - `ResourceGroup`: deployment into a resource group (optionally pinned to a subscription)
//! - `ManagementGroup`: deployment at management group level
//! - `Subscription`: deployment at subscription level (the default)

use serde::{Deserialize, Serialize};

/// Resolved target scope of a validation, deployment or removal
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TargetScope {
    /// Resource group level
    #[serde(rename_all = "camelCase")]
    ResourceGroup {
        name: String,
        subscription_id: Option<String>,
    },
    /// Management group level
    ManagementGroup { id: String },
    /// Subscription level; `None` means the provider's current subscription
    Subscription { id: Option<String> },
}

impl TargetScope {
    pub fn is_resource_group(&self) -> bool {
        matches!(self, TargetScope::ResourceGroup { .. })
    }

    /// Short scope label as used in logs and events
    pub fn kind(&self) -> &'static str {
        match self {
            TargetScope::ResourceGroup { .. } => "resourceGroup",
            TargetScope::ManagementGroup { .. } => "managementGroup",
            TargetScope::Subscription { .. } => "subscription",
        }
    }

    /// Whether the provider needs a deployment location for this scope
    ///
    /// Resource group deployments inherit the group's location.
    pub fn requires_location(&self) -> bool {
        !self.is_resource_group()
    }
}

impl Default for TargetScope {
    fn default() -> Self {
        TargetScope::Subscription { id: None }
    }
}

impl std::fmt::Display for TargetScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetScope::ResourceGroup {
                name,
                subscription_id: Some(sub),
            } => write!(f, "resource group '{}' (subscription {})", name, sub),
            TargetScope::ResourceGroup { name, .. } => write!(f, "resource group '{}'", name),
            TargetScope::ManagementGroup { id } => write!(f, "management group '{}'", id),
            TargetScope::Subscription { id: Some(id) } => write!(f, "subscription '{}'", id),
            TargetScope::Subscription { id: None } => write!(f, "current subscription"),
        }
    }
}

/// The raw scope identifiers a caller supplied
///
/// Empty strings are treated the same as unset values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeSelector {
    pub resource_group_name: Option<String>,
    pub subscription_id: Option<String>,
    pub management_group_id: Option<String>,
}

impl ScopeSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource_group(mut self, name: impl Into<String>) -> Self {
        self.resource_group_name = Some(name.into());
        self
    }

    pub fn with_subscription(mut self, id: impl Into<String>) -> Self {
        self.subscription_id = Some(id.into());
        self
    }

    pub fn with_management_group(mut self, id: impl Into<String>) -> Self {
        self.management_group_id = Some(id.into());
        self
    }

    /// Resolve to exactly one scope.
    ///
    /// Precedence: resource group > management group > subscription.
    pub fn resolve(&self) -> TargetScope {
        let rg = non_empty(&self.resource_group_name);
        let mg = non_empty(&self.management_group_id);
        let sub = non_empty(&self.subscription_id);

        if let Some(name) = rg {
            TargetScope::ResourceGroup {
                name: name.to_string(),
                subscription_id: sub.map(str::to_string),
            }
        } else if let Some(id) = mg {
            TargetScope::ManagementGroup { id: id.to_string() }
        } else {
            TargetScope::Subscription {
                id: sub.map(str::to_string),
            }
        }
    }

    /// Number of identifiers that are set (non-empty)
    pub fn identifiers_set(&self) -> usize {
        [
            &self.resource_group_name,
            &self.subscription_id,
            &self.management_group_id,
        ]
        .into_iter()
        .filter(|v| non_empty(v).is_some())
        .count()
    }

    /// A management group together with a resource group or subscription
    ///
    /// A resource group with a subscription is not ambiguous: the
    /// subscription pins the group.
    pub fn is_ambiguous(&self) -> bool {
        non_empty(&self.management_group_id).is_some() && self.identifiers_set() > 1
    }

    /// Value of the built-in `subscriptionId` token
    pub fn subscription_token(&self) -> String {
        non_empty(&self.subscription_id).unwrap_or_default().to_string()
    }

    /// Value of the built-in `managementGroupId` token
    pub fn management_group_token(&self) -> String {
        non_empty(&self.management_group_id)
            .unwrap_or_default()
            .to_string()
    }

    /// Value of the built-in `resourceGroupName` token
    pub fn resource_group_token(&self) -> String {
        non_empty(&self.resource_group_name)
            .unwrap_or_default()
            .to_string()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
