//! Plain data exchanged by [`ProviderService`](crate::provider::ProviderService)
//! operations: plans, imports and provider metadata.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A change to one top-level attribute or block during a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// Name of the attribute or block.
    pub path: String,
    /// Value in the prior state, `None` when absent.
    pub before: Option<Value>,
    /// Value in the planned state, `None` when removed.
    pub after: Option<Value>,
    /// The change cannot be applied in place.
    #[serde(default)]
    pub requires_replace: bool,
}

impl AttributeChange {
    /// Create a change from the prior and planned values.
    pub fn new(path: impl Into<String>, before: Option<Value>, after: Option<Value>) -> Self {
        Self {
            path: path.into(),
            before,
            after,
            requires_replace: false,
        }
    }

    /// Mark the change as forcing replacement.
    pub fn forcing_replacement(mut self) -> Self {
        self.requires_replace = true;
        self
    }
}

/// The result of planning a resource change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    /// The state expected after apply. Computed values not yet known are absent.
    pub planned_state: Value,
    /// Top-level differences between prior and planned state.
    pub changes: Vec<AttributeChange>,
    /// Whether any change forces the remote object to be recreated.
    pub requires_replace: bool,
}

impl PlanResult {
    /// A plan that leaves the resource untouched.
    pub fn no_change(state: Value) -> Self {
        Self {
            planned_state: state,
            changes: Vec::new(),
            requires_replace: false,
        }
    }

    /// A plan built from per-attribute changes; replacement is derived from them.
    pub fn from_changes(planned_state: Value, changes: Vec<AttributeChange>) -> Self {
        let requires_replace = changes.iter().any(|c| c.requires_replace);
        Self {
            planned_state,
            changes,
            requires_replace,
        }
    }

    /// Whether applying the plan would call the API.
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Paths of the changes that force replacement.
    pub fn replace_paths(&self) -> Vec<&str> {
        self.changes
            .iter()
            .filter(|c| c.requires_replace)
            .map(|c| c.path.as_str())
            .collect()
    }
}

/// A resource brought under management by its ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedResource {
    /// The resource type.
    pub resource_type: String,
    /// State read back from the API for the imported ID.
    pub state: Value,
}

impl ImportedResource {
    /// Create a new imported resource.
    pub fn new(resource_type: impl Into<String>, state: Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            state,
        }
    }
}

/// Names of everything the provider serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    /// Resource type names.
    pub resources: Vec<String>,
    /// Data source type names.
    pub data_sources: Vec<String>,
    /// Resource types that accept `import`.
    pub importable: Vec<String>,
}
