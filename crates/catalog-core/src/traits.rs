//! Collaborator traits consumed by the resolver
//!
//! These traits let the same pagination logic run against in-memory stores
//! (for testing) and real persistence backends.
//!
//! ## Key Traits
//!
//! - [`DefinitionSource`]: Contract definitions visible to a participant
//! - [`AssetIndex`]: Counting and ranged querying of assets by selector
//! - [`PolicyStore`]: Policy lookup by id

use std::sync::Arc;

use async_trait::async_trait;

use crate::asset::{Asset, AssetSelector};
use crate::definition::ContractDefinition;
use crate::error::StorageError;
use crate::identity::ParticipantIdentity;
use crate::policy::PolicyDefinition;

/// Supplies the contract definitions a participant is allowed to see
///
/// The order of the returned definitions is significant: it fixes the order
/// in which definitions are concatenated into the global catalog, so it must
/// be stable for a given participant and store state.
#[async_trait]
pub trait DefinitionSource<I: ParticipantIdentity>: Send + Sync {
    /// Get the definitions visible to `participant`, in a stable order
    async fn definitions_for(&self, participant: &I) -> Result<Vec<ContractDefinition>, StorageError>;
}

/// Queryable asset storage
///
/// `count` and `query` must agree: for the same selector and store state,
/// `query(selector, offset, limit)` returns
/// `min(limit, count(selector).saturating_sub(offset))` assets in a stable order.
#[async_trait]
pub trait AssetIndex: Send + Sync {
    /// Number of assets matching `selector`
    async fn count(&self, selector: &AssetSelector) -> Result<usize, StorageError>;

    /// The matching assets at positions `[offset, offset + limit)`
    async fn query(
        &self,
        selector: &AssetSelector,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Asset>, StorageError>;
}

/// Policy lookup
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Find a policy definition by id, `None` if it does not exist
    async fn find_by_id(&self, id: &str) -> Result<Option<PolicyDefinition>, StorageError>;
}

#[async_trait]
impl<T: AssetIndex + ?Sized> AssetIndex for Arc<T> {
    async fn count(&self, selector: &AssetSelector) -> Result<usize, StorageError> {
        (**self).count(selector).await
    }

    async fn query(
        &self,
        selector: &AssetSelector,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Asset>, StorageError> {
        (**self).query(selector, offset, limit).await
    }
}

#[async_trait]
impl<T: PolicyStore + ?Sized> PolicyStore for Arc<T> {
    async fn find_by_id(&self, id: &str) -> Result<Option<PolicyDefinition>, StorageError> {
        (**self).find_by_id(id).await
    }
}

#[async_trait]
impl<I: ParticipantIdentity, T: DefinitionSource<I> + ?Sized> DefinitionSource<I> for Arc<T> {
    async fn definitions_for(&self, participant: &I) -> Result<Vec<ContractDefinition>, StorageError> {
        (**self).definitions_for(participant).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ParticipantAgent;

    /// The collaborator traits must be usable as trait objects
    fn _assert_object_safe(
        _: &dyn DefinitionSource<ParticipantAgent>,
        _: &dyn AssetIndex,
        _: &dyn PolicyStore,
    ) {
    }

    struct Fixed(usize);

    #[async_trait]
    impl AssetIndex for Fixed {
        async fn count(&self, _selector: &AssetSelector) -> Result<usize, StorageError> {
            Ok(self.0)
        }

        async fn query(
            &self,
            _selector: &AssetSelector,
            offset: usize,
            limit: usize,
        ) -> Result<Vec<Asset>, StorageError> {
            Ok((offset..self.0)
                .take(limit)
                .map(|i| Asset::new(format!("asset-{i}")))
                .collect())
        }
    }

    #[tokio::test]
    async fn test_arc_forwards_to_inner() {
        let index: Arc<dyn AssetIndex> = Arc::new(Fixed(5));
        let selector = AssetSelector::select_all();

        assert_eq!(index.count(&selector).await.unwrap(), 5);
        let page = index.query(&selector, 3, 10).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id.as_str(), "asset-3");
    }
}
