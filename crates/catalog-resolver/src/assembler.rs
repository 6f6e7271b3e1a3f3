//! Dataset assembly from catalog entries

use std::sync::Arc;

use catalog_core::{ContractOffer, ContractOfferId, Dataset, Distribution, PolicyStore};
use tracing::trace;

use crate::accumulator::CatalogEntry;
use crate::error::ResolveError;

/// Builds datasets by attaching the definition's contract policy, narrowed to
/// the asset, and the caller's distribution
#[derive(Clone)]
pub struct DatasetAssembler {
    policies: Arc<dyn PolicyStore>,
}

impl DatasetAssembler {
    pub fn new(policies: Arc<dyn PolicyStore>) -> Self {
        Self { policies }
    }

    /// Assemble the dataset for one entry
    ///
    /// Fails with [`ResolveError::MissingPolicy`] if the definition's contract
    /// policy does not exist.
    pub async fn assemble(
        &self,
        entry: CatalogEntry,
        distribution: &Distribution,
    ) -> Result<Dataset, ResolveError> {
        let CatalogEntry { definition, asset } = entry;
        let policy_id = &definition.contract_policy_id;

        let policy_definition = self
            .policies
            .find_by_id(policy_id)
            .await
            .map_err(|source| ResolveError::PolicyLookup {
                definition_id: definition.id.clone(),
                policy_id: policy_id.clone(),
                source,
            })?
            .ok_or_else(|| ResolveError::MissingPolicy {
                definition_id: definition.id.clone(),
                policy_id: policy_id.clone(),
            })?;

        let offer = ContractOffer {
            id: ContractOfferId::derive(&*definition.id, asset.id.clone(), policy_id),
            policy: policy_definition.policy.with_target(asset.id.clone()),
        };

        trace!(asset = %asset.id, definition = %definition.id, "Assembled dataset");
        Ok(Dataset::new(asset, offer, distribution.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::{Asset, ContractDefinition, DataService, Policy, PolicyDefinition, Rule};
    use catalog_storage::InMemoryPolicyStore;

    fn distribution() -> Distribution {
        Distribution::new("HttpData-PULL", DataService::new("svc", "https://provider.example/dsp"))
    }

    fn entry(contract_policy: &str) -> CatalogEntry {
        CatalogEntry {
            definition: Arc::new(ContractDefinition::new("def-1", "access", contract_policy)),
            asset: Asset::new("asset-1").with_name("first"),
        }
    }

    #[tokio::test]
    async fn test_assemble_narrows_policy() {
        let store = InMemoryPolicyStore::new();
        store.insert(PolicyDefinition::new(
            "contract",
            Policy::new().with_permission(Rule::new("use")),
        ));
        let assembler = DatasetAssembler::new(Arc::new(store));

        let dataset = assembler.assemble(entry("contract"), &distribution()).await.unwrap();

        assert_eq!(dataset.id.as_str(), "asset-1");
        assert_eq!(dataset.offer.policy.target.as_ref().map(|t| t.as_str()), Some("asset-1"));
        assert_eq!(dataset.offer.policy.permissions.len(), 1);
        assert_eq!(dataset.offer.id.definition_id(), "def-1");
        assert_eq!(dataset.offer.id.asset_id().as_str(), "asset-1");
        assert_eq!(dataset.distribution, distribution());
    }

    #[tokio::test]
    async fn test_assemble_missing_policy() {
        let assembler = DatasetAssembler::new(Arc::new(InMemoryPolicyStore::new()));

        let err = assembler.assemble(entry("nope"), &distribution()).await.unwrap_err();

        assert!(matches!(
            err,
            ResolveError::MissingPolicy { ref definition_id, ref policy_id }
                if definition_id == "def-1" && policy_id == "nope"
        ));
    }
}
