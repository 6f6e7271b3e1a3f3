//! Usage policies and their stored definitions

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::asset::AssetId;

/// A constraint attached to a rule, e.g. `region eq eu`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub left: String,
    pub operator: String,
    pub right: Value,
}

impl Constraint {
    pub fn new(left: impl Into<String>, operator: impl Into<String>, right: impl Into<Value>) -> Self {
        Self {
            left: left.into(),
            operator: operator.into(),
            right: right.into(),
        }
    }
}

/// A permission, prohibition or duty over an action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub action: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
}

impl Rule {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            constraints: Vec::new(),
        }
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }
}

/// A usage policy
///
/// A stored policy has no target. Offering it for a concrete asset narrows it
/// with [`Policy::with_target`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<Rule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prohibitions: Vec<Rule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub obligations: Vec<Rule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<AssetId>,
}

impl Policy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_permission(mut self, rule: Rule) -> Self {
        self.permissions.push(rule);
        self
    }

    pub fn with_prohibition(mut self, rule: Rule) -> Self {
        self.prohibitions.push(rule);
        self
    }

    pub fn with_obligation(mut self, rule: Rule) -> Self {
        self.obligations.push(rule);
        self
    }

    pub fn with_assigner(mut self, assigner: impl Into<String>) -> Self {
        self.assigner = Some(assigner.into());
        self
    }

    /// Copy of this policy narrowed to a single asset
    pub fn with_target(&self, target: AssetId) -> Self {
        Self {
            target: Some(target),
            ..self.clone()
        }
    }
}

/// A policy as persisted in the policy store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDefinition {
    pub id: String,
    pub policy: Policy,
}

impl PolicyDefinition {
    pub fn new(id: impl Into<String>, policy: Policy) -> Self {
        Self {
            id: id.into(),
            policy,
        }
    }
}
