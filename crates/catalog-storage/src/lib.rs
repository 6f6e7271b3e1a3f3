//! # Catalog Storage
//!
//! In-memory collaborators for the catalog resolver.
//!
//! ## Features
//!
//! - **InMemoryAssetIndex**: Criterion-based asset index with stable ordering
//! - **InMemoryPolicyStore**: Policy definitions keyed by id
//! - **InMemoryDefinitionStore**: Insertion-ordered contract definitions with
//!   optional per-participant audience
//! - **Testing wrappers**: Call recording and failure injection
//!
//! ## Example
//!
//! ```rust,ignore
//! use catalog_core::{Asset, AssetIndex, AssetSelector};
//! use catalog_storage::InMemoryAssetIndex;
//!
//! #[tokio::main]
//! async fn main() {
//!     let index = InMemoryAssetIndex::new();
//!     index.insert(Asset::new("asset-1").with_name("weather data"));
//!
//!     let selector = AssetSelector::for_ids(["asset-1"]);
//!     assert_eq!(index.count(&selector).await.unwrap(), 1);
//!
//!     let page = index.query(&selector, 0, 10).await.unwrap();
//!     assert_eq!(page[0].id.as_str(), "asset-1");
//! }
//! ```

pub mod criteria;
pub mod memory;
pub mod testing;

// Re-exports
pub use criteria::CompiledSelector;
pub use memory::{InMemoryAssetIndex, InMemoryDefinitionStore, InMemoryPolicyStore};
pub use testing::{FaultyAssetIndex, IndexCall, RecordingAssetIndex, RecordingPolicyStore};
