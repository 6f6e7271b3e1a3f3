//! Contract definitions

use serde::{Deserialize, Serialize};

use crate::asset::AssetSelector;

/// A rule binding a selection of assets to an access policy and a contract policy
///
/// The access policy decides who may see the definition (evaluated by the
/// definition source). The contract policy is what gets offered on every
/// dataset the definition produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractDefinition {
    pub id: String,
    pub access_policy_id: String,
    pub contract_policy_id: String,
    pub selector: AssetSelector,
}

impl ContractDefinition {
    pub fn new(
        id: impl Into<String>,
        access_policy_id: impl Into<String>,
        contract_policy_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            access_policy_id: access_policy_id.into(),
            contract_policy_id: contract_policy_id.into(),
            selector: AssetSelector::select_all(),
        }
    }

    /// Builder: set the selection predicate
    pub fn with_selector(mut self, selector: AssetSelector) -> Self {
        self.selector = selector;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_select_all() {
        let def = ContractDefinition::new("def-1", "access", "contract");
        assert_eq!(def.selector, AssetSelector::select_all());
        assert_eq!(def.contract_policy_id, "contract");
    }

    #[test]
    fn test_with_selector() {
        let def = ContractDefinition::new("def-1", "access", "contract")
            .with_selector(AssetSelector::for_ids(["a"]));
        assert_eq!(def.selector.criteria().len(), 1);
    }
}
