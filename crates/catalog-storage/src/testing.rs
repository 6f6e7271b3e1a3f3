//! Instrumented collaborators for testing
//!
//! Wrappers that record every call made to an inner store, or inject
//! failures after a number of successful calls. Used to verify how much work
//! the resolver performs and how it reacts to collaborator faults.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use catalog_storage::{InMemoryAssetIndex, RecordingAssetIndex};
//!
//! let index = RecordingAssetIndex::new(InMemoryAssetIndex::new());
//! // ... run a resolution against `index` ...
//! assert_eq!(index.count_calls(), 2);
//! assert_eq!(index.requested_limits(), vec![30]);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use catalog_core::{Asset, AssetIndex, AssetSelector, PolicyDefinition, PolicyStore, StorageError};

/// A call observed by [`RecordingAssetIndex`]
#[derive(Debug, Clone, PartialEq)]
pub enum IndexCall {
    Count {
        selector: AssetSelector,
    },
    Query {
        selector: AssetSelector,
        offset: usize,
        limit: usize,
    },
}

/// Asset index wrapper that records every call before forwarding it
#[derive(Debug)]
pub struct RecordingAssetIndex<A> {
    inner: A,
    calls: Mutex<Vec<IndexCall>>,
}

impl<A: AssetIndex> RecordingAssetIndex<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Get the wrapped index
    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// All calls in the order they were made
    pub fn calls(&self) -> Vec<IndexCall> {
        self.calls.lock().clone()
    }

    /// Number of `count` calls
    pub fn count_calls(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, IndexCall::Count { .. }))
            .count()
    }

    /// Number of `query` calls
    pub fn query_calls(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, IndexCall::Query { .. }))
            .count()
    }

    /// The `limit` of every `query` call, in call order
    pub fn requested_limits(&self) -> Vec<usize> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                IndexCall::Query { limit, .. } => Some(*limit),
                IndexCall::Count { .. } => None,
            })
            .collect()
    }

    /// Forget recorded calls
    pub fn reset(&self) {
        self.calls.lock().clear();
    }
}

#[async_trait]
impl<A: AssetIndex> AssetIndex for RecordingAssetIndex<A> {
    async fn count(&self, selector: &AssetSelector) -> Result<usize, StorageError> {
        self.calls.lock().push(IndexCall::Count {
            selector: selector.clone(),
        });
        self.inner.count(selector).await
    }

    async fn query(
        &self,
        selector: &AssetSelector,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Asset>, StorageError> {
        self.calls.lock().push(IndexCall::Query {
            selector: selector.clone(),
            offset,
            limit,
        });
        self.inner.query(selector, offset, limit).await
    }
}

/// Asset index wrapper that starts failing after a number of successful calls
#[derive(Debug)]
pub struct FaultyAssetIndex<A> {
    inner: A,
    counts_before_failure: Option<usize>,
    queries_before_failure: Option<usize>,
    counts: AtomicUsize,
    queries: AtomicUsize,
}

impl<A: AssetIndex> FaultyAssetIndex<A> {
    /// Wrap an index; it behaves normally until a failure point is configured
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            counts_before_failure: None,
            queries_before_failure: None,
            counts: AtomicUsize::new(0),
            queries: AtomicUsize::new(0),
        }
    }

    /// Fail every `count` call after the first `n`
    pub fn fail_counts_after(mut self, n: usize) -> Self {
        self.counts_before_failure = Some(n);
        self
    }

    /// Fail every `query` call after the first `n`
    pub fn fail_queries_after(mut self, n: usize) -> Self {
        self.queries_before_failure = Some(n);
        self
    }
}

fn exhausted(counter: &AtomicUsize, allowed: Option<usize>) -> bool {
    let previous = counter.fetch_add(1, Ordering::SeqCst);
    allowed.is_some_and(|allowed| previous >= allowed)
}

#[async_trait]
impl<A: AssetIndex> AssetIndex for FaultyAssetIndex<A> {
    async fn count(&self, selector: &AssetSelector) -> Result<usize, StorageError> {
        if exhausted(&self.counts, self.counts_before_failure) {
            return Err(StorageError::unavailable("injected count failure"));
        }
        self.inner.count(selector).await
    }

    async fn query(
        &self,
        selector: &AssetSelector,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Asset>, StorageError> {
        if exhausted(&self.queries, self.queries_before_failure) {
            return Err(StorageError::unavailable("injected query failure"));
        }
        self.inner.query(selector, offset, limit).await
    }
}

/// Policy store wrapper that records looked-up ids
#[derive(Debug)]
pub struct RecordingPolicyStore<P> {
    inner: P,
    lookups: Mutex<Vec<String>>,
}

impl<P: PolicyStore> RecordingPolicyStore<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            lookups: Mutex::new(Vec::new()),
        }
    }

    /// Get the wrapped store
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Ids looked up, in call order
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().clone()
    }

    /// Number of lookups performed
    pub fn lookup_count(&self) -> usize {
        self.lookups.lock().len()
    }
}

#[async_trait]
impl<P: PolicyStore> PolicyStore for RecordingPolicyStore<P> {
    async fn find_by_id(&self, id: &str) -> Result<Option<PolicyDefinition>, StorageError> {
        self.lookups.lock().push(id.to_string());
        self.inner.find_by_id(id).await
    }
}
