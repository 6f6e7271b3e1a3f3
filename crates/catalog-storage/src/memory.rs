//! In-memory storage implementations
//!
//! This module provides in-memory implementations of the collaborator
//! traits, suitable for testing, demos and small single-node deployments.

use std::collections::BTreeSet;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, trace};

use catalog_core::{
    Asset, AssetId, AssetIndex, AssetSelector, ContractDefinition, DefinitionSource,
    ParticipantIdentity, PolicyDefinition, PolicyStore, StorageError,
};

use crate::criteria::CompiledSelector;

/// In-memory implementation of AssetIndex
///
/// Uses `DashMap` for concurrent access. Matching assets are returned
/// ordered by asset id, which keeps ranged queries stable as long as the
/// store is not mutated between calls.
#[derive(Debug, Default)]
pub struct InMemoryAssetIndex {
    assets: DashMap<AssetId, Asset>,
}

impl InMemoryAssetIndex {
    /// Create a new, empty asset index
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an asset, replacing any asset with the same id
    pub fn insert(&self, asset: Asset) {
        trace!(asset = %asset.id, "Storing asset");
        self.assets.insert(asset.id.clone(), asset);
    }

    /// Store several assets
    pub fn extend(&self, assets: impl IntoIterator<Item = Asset>) {
        for asset in assets {
            self.insert(asset);
        }
    }

    /// Remove an asset, returning it if present
    pub fn remove(&self, id: &AssetId) -> Option<Asset> {
        self.assets.remove(id).map(|(_, asset)| asset)
    }

    /// Get an asset by id
    pub fn get(&self, id: &AssetId) -> Option<Asset> {
        self.assets.get(id).map(|entry| entry.value().clone())
    }

    /// Total number of stored assets
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Check if the index holds no assets
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    fn matching(&self, selector: &AssetSelector) -> Result<Vec<Asset>, StorageError> {
        let compiled = CompiledSelector::compile(selector)?;
        let mut matched: Vec<Asset> = self
            .assets
            .iter()
            .filter(|entry| compiled.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        matched.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(matched)
    }
}

#[async_trait]
impl AssetIndex for InMemoryAssetIndex {
    async fn count(&self, selector: &AssetSelector) -> Result<usize, StorageError> {
        let compiled = CompiledSelector::compile(selector)?;
        let count = self
            .assets
            .iter()
            .filter(|entry| compiled.matches(entry.value()))
            .count();
        trace!(count, "Counted matching assets");
        Ok(count)
    }

    async fn query(
        &self,
        selector: &AssetSelector,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Asset>, StorageError> {
        if limit == 0 {
            CompiledSelector::compile(selector)?;
            return Ok(Vec::new());
        }

        let page: Vec<Asset> = self
            .matching(selector)?
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect();
        trace!(offset, limit, returned = page.len(), "Queried asset page");
        Ok(page)
    }
}

/// In-memory implementation of PolicyStore
#[derive(Debug, Default)]
pub struct InMemoryPolicyStore {
    policies: DashMap<String, PolicyDefinition>,
}

impl InMemoryPolicyStore {
    /// Create a new, empty policy store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a policy definition, replacing any definition with the same id
    pub fn insert(&self, definition: PolicyDefinition) {
        trace!(policy = %definition.id, "Storing policy definition");
        self.policies.insert(definition.id.clone(), definition);
    }

    /// Remove a policy definition
    pub fn remove(&self, id: &str) -> Option<PolicyDefinition> {
        self.policies.remove(id).map(|(_, def)| def)
    }

    /// Number of stored policy definitions
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Check if the store holds no policies
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

#[async_trait]
impl PolicyStore for InMemoryPolicyStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<PolicyDefinition>, StorageError> {
        Ok(self.policies.get(id).map(|entry| entry.value().clone()))
    }
}

#[derive(Debug, Clone)]
struct StoredDefinition {
    definition: ContractDefinition,
    /// Participant ids allowed to see the definition (`None` = everyone)
    audience: Option<BTreeSet<String>>,
}

impl StoredDefinition {
    fn visible_to(&self, participant_id: &str) -> bool {
        self.audience
            .as_ref()
            .is_none_or(|audience| audience.contains(participant_id))
    }
}

/// In-memory, insertion-ordered implementation of DefinitionSource
///
/// Visibility is a plain audience list per definition. Access policy
/// evaluation belongs to a real definition source and is not modelled here.
#[derive(Debug, Default)]
pub struct InMemoryDefinitionStore {
    definitions: RwLock<Vec<StoredDefinition>>,
}

impl InMemoryDefinitionStore {
    /// Create a new, empty definition store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition visible to every participant
    ///
    /// A definition with an existing id is replaced in place, keeping its
    /// position in the catalog order.
    pub fn insert(&self, definition: ContractDefinition) {
        self.upsert(StoredDefinition {
            definition,
            audience: None,
        });
    }

    /// Add a definition visible only to the given participants
    pub fn insert_restricted<S: Into<String>>(
        &self,
        definition: ContractDefinition,
        audience: impl IntoIterator<Item = S>,
    ) {
        self.upsert(StoredDefinition {
            definition,
            audience: Some(audience.into_iter().map(Into::into).collect()),
        });
    }

    /// Remove a definition by id
    pub fn remove(&self, id: &str) -> Option<ContractDefinition> {
        let mut definitions = self.definitions.write();
        let pos = definitions.iter().position(|d| d.definition.id == id)?;
        Some(definitions.remove(pos).definition)
    }

    /// Number of stored definitions
    pub fn len(&self) -> usize {
        self.definitions.read().len()
    }

    /// Check if the store holds no definitions
    pub fn is_empty(&self) -> bool {
        self.definitions.read().is_empty()
    }

    fn upsert(&self, stored: StoredDefinition) {
        let mut definitions = self.definitions.write();
        match definitions
            .iter_mut()
            .find(|d| d.definition.id == stored.definition.id)
        {
            Some(existing) => *existing = stored,
            None => definitions.push(stored),
        }
    }
}

#[async_trait]
impl<I: ParticipantIdentity> DefinitionSource<I> for InMemoryDefinitionStore {
    async fn definitions_for(&self, participant: &I) -> Result<Vec<ContractDefinition>, StorageError> {
        let participant_id = participant.participant_id();
        let visible: Vec<ContractDefinition> = self
            .definitions
            .read()
            .iter()
            .filter(|d| d.visible_to(participant_id))
            .map(|d| d.definition.clone())
            .collect();
        debug!(participant = %participant.short_id(), visible = visible.len(), "Resolved visible definitions");
        Ok(visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::{Criterion, ParticipantAgent, Policy};

    fn index_with(ids: impl IntoIterator<Item = String>) -> InMemoryAssetIndex {
        let index = InMemoryAssetIndex::new();
        index.extend(ids.into_iter().map(Asset::new));
        index
    }

    #[tokio::test]
    async fn test_count_and_query_agree() {
        let index = index_with((10..30).map(|i| format!("asset{i}")));
        let selector = AssetSelector::for_ids((10..20).map(|i| format!("asset{i}")));

        assert_eq!(index.count(&selector).await.unwrap(), 10);

        let page = index.query(&selector, 8, 5).await.unwrap();
        let ids: Vec<_> = page.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["asset18", "asset19"]);

        assert!(index.query(&selector, 10, 5).await.unwrap().is_empty());
        assert!(index.query(&selector, 0, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_order_is_stable() {
        let index = index_with(["c", "a", "b"].map(String::from));
        let selector = AssetSelector::select_all();

        let first = index.query(&selector, 0, 3).await.unwrap();
        let second = index.query(&selector, 0, 3).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0].id.as_str(), "a");
    }

    #[tokio::test]
    async fn test_invalid_selector_is_rejected() {
        let index = index_with(std::iter::empty());
        let selector = AssetSelector::new(vec![Criterion::new("id", "between", "x")]);

        assert!(matches!(
            index.count(&selector).await,
            Err(StorageError::InvalidQuery(_))
        ));
        assert!(index.query(&selector, 0, 0).await.is_err());
    }

    #[tokio::test]
    async fn test_policy_store() {
        let store = InMemoryPolicyStore::new();
        store.insert(PolicyDefinition::new("contract", Policy::new()));

        assert!(store.find_by_id("contract").await.unwrap().is_some());
        assert!(store.find_by_id("missing").await.unwrap().is_none());

        store.remove("contract");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_definition_store_order_and_audience() {
        let store = InMemoryDefinitionStore::new();
        store.insert(ContractDefinition::new("def-1", "access", "contract"));
        store.insert_restricted(ContractDefinition::new("def-2", "access", "contract"), ["alice"]);
        store.insert(ContractDefinition::new("def-3", "access", "contract"));

        let alice = ParticipantAgent::new("alice").unwrap();
        let bob = ParticipantAgent::new("bob").unwrap();

        let ids = |defs: Vec<ContractDefinition>| defs.into_iter().map(|d| d.id).collect::<Vec<_>>();
        assert_eq!(ids(store.definitions_for(&alice).await.unwrap()), ["def-1", "def-2", "def-3"]);
        assert_eq!(ids(store.definitions_for(&bob).await.unwrap()), ["def-1", "def-3"]);
    }

    #[tokio::test]
    async fn test_definition_upsert_keeps_position() {
        let store = InMemoryDefinitionStore::new();
        store.insert(ContractDefinition::new("def-1", "access", "contract"));
        store.insert(ContractDefinition::new("def-2", "access", "contract"));
        store.insert(ContractDefinition::new("def-1", "access", "other-contract"));

        let agent = ParticipantAgent::new("alice").unwrap();
        let defs = store.definitions_for(&agent).await.unwrap();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].id, "def-1");
        assert_eq!(defs[0].contract_policy_id, "other-contract");

        assert!(store.remove("def-1").is_some());
        assert!(store.remove("def-1").is_none());
        assert_eq!(store.len(), 1);
    }
}
