//! Stress tests for catalog-storage
//!
//! These tests verify the in-memory stores under volume and concurrent
//! access, and that paging through the asset index stays stable.

use std::sync::Arc;
use std::time::Instant;

use catalog_core::{
    Asset, AssetIndex, AssetSelector, ContractDefinition, Criterion, DefinitionSource,
    ParticipantAgent, Policy, PolicyDefinition, PolicyStore,
};
use catalog_storage::{InMemoryAssetIndex, InMemoryDefinitionStore, InMemoryPolicyStore};

// ============================================================================
// Throughput Tests
// ============================================================================

/// Page through 10,000 assets and check every page joins up
#[tokio::test]
async fn test_paging_large_index() {
    let index = InMemoryAssetIndex::new();
    let asset_count: usize = 10_000;

    let start = Instant::now();
    index.extend((0..asset_count).map(|i| {
        Asset::new(format!("asset{i:05}")).with_property("tier", if i % 2 == 0 { "gold" } else { "silver" })
    }));
    println!("Inserted {} assets in {:?}", asset_count, start.elapsed());

    let gold = AssetSelector::select_all().and(Criterion::new("tier", "=", "gold"));
    assert_eq!(index.count(&gold).await.unwrap(), asset_count / 2);

    let start = Instant::now();
    let mut paged = Vec::new();
    let mut offset = 0;
    loop {
        let page = index.query(&gold, offset, 333).await.unwrap();
        if page.is_empty() {
            break;
        }
        offset += page.len();
        paged.extend(page);
    }
    println!("Paged {} assets in {:?}", paged.len(), start.elapsed());

    assert_eq!(paged.len(), asset_count / 2);
    for (i, asset) in paged.iter().enumerate() {
        assert_eq!(asset.id.as_str(), format!("asset{:05}", i * 2));
    }
}

// ============================================================================
// Concurrency Tests
// ============================================================================

/// Readers keep seeing consistent count/query pairs while writers add assets
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_inserts_and_queries() {
    let index = Arc::new(InMemoryAssetIndex::new());
    let mut handles = Vec::new();

    for writer in 0..4 {
        let index = Arc::clone(&index);
        handles.push(tokio::spawn(async move {
            for i in 0..500 {
                index.insert(Asset::new(format!("w{writer}-{i:03}")));
            }
        }));
    }

    for _ in 0..4 {
        let index = Arc::clone(&index);
        handles.push(tokio::spawn(async move {
            let all = AssetSelector::select_all();
            for _ in 0..50 {
                let page = index.query(&all, 0, 100).await.unwrap();
                assert!(page.len() <= 100);
                // Pages are always sorted by id
                assert!(page.windows(2).all(|w| w[0].id < w[1].id));
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(index.len(), 2_000);
    assert_eq!(index.count(&AssetSelector::select_all()).await.unwrap(), 2_000);
}

/// Definition order survives concurrent upserts of existing definitions
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_definition_order_under_concurrent_updates() {
    let store = Arc::new(InMemoryDefinitionStore::new());
    for n in 0..50 {
        store.insert(ContractDefinition::new(format!("def{n:02}"), "access", "contract"));
    }

    let mut handles = Vec::new();
    for round in 0..8 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            for n in (round..50).step_by(8) {
                store.insert(ContractDefinition::new(
                    format!("def{n:02}"),
                    "access",
                    format!("contract-v{round}"),
                ));
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let agent = ParticipantAgent::new("consumer").unwrap();
    let ids: Vec<String> = store
        .definitions_for(&agent)
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.id)
        .collect();
    let expected: Vec<String> = (0..50).map(|n| format!("def{n:02}")).collect();
    assert_eq!(ids, expected);
}

/// Many concurrent lookups against a populated policy store
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_policy_lookups() {
    let store = Arc::new(InMemoryPolicyStore::new());
    for n in 0..100 {
        store.insert(PolicyDefinition::new(
            format!("policy-{n}"),
            Policy::new().with_assigner(format!("provider-{n}")),
        ));
    }

    let mut handles = Vec::new();
    for task in 0..10 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            for n in (0..100).filter(|n| n % 10 == task) {
                let found = store.find_by_id(&format!("policy-{n}")).await.unwrap().unwrap();
                assert_eq!(found.policy.assigner.as_deref(), Some(format!("provider-{n}").as_str()));
            }
            assert!(store.find_by_id("policy-missing").await.unwrap().is_none());
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }
}
