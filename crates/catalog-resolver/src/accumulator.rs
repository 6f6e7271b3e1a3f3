//! Global window accumulation across contract definitions
//!
//! Walks the definitions in source order, keeping a global cursor over the
//! virtual concatenation of their matches. Each definition is counted, its
//! overlap with the requested window is fetched, and the cursor advances by
//! the full count. Accumulation stops as soon as the window is filled, so
//! definitions past that point are never consulted.

use std::pin::Pin;
use std::sync::Arc;

use async_stream::try_stream;
use futures::stream::{self, Stream, StreamExt};
use tracing::{debug, info};

use catalog_core::{Asset, AssetIndex, ContractDefinition, Range};

use crate::error::ResolveError;
use crate::fetcher::WindowedFetcher;

/// An asset selected for the window, together with the definition that offers it
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub definition: Arc<ContractDefinition>,
    pub asset: Asset,
}

/// Lazy stream of catalog entries in global window order
pub type EntryStream = Pin<Box<dyn Stream<Item = Result<CatalogEntry, ResolveError>> + Send>>;

/// Turns an ordered list of definitions into the entries of one global window
#[derive(Clone)]
pub struct WindowAccumulator {
    fetcher: WindowedFetcher,
    count_prefetch: usize,
}

impl WindowAccumulator {
    /// Create an accumulator counting one definition at a time
    pub fn new(index: Arc<dyn AssetIndex>) -> Self {
        Self {
            fetcher: WindowedFetcher::new(index),
            count_prefetch: 1,
        }
    }

    /// Allow up to `n` definition counts in flight ahead of the cursor
    pub fn with_count_prefetch(mut self, n: usize) -> Self {
        self.count_prefetch = n.max(1);
        self
    }

    /// Stream the entries of `range` over `definitions`
    ///
    /// Nothing happens until the stream is polled. Dropping the stream stops
    /// all further store calls, except for counts already prefetched.
    pub fn entries(&self, definitions: Vec<ContractDefinition>, range: Range) -> EntryStream {
        let fetcher = self.fetcher.clone();
        let prefetch = self.count_prefetch.max(1);

        Box::pin(try_stream! {
            let target = range.len();
            let mut emitted = 0usize;
            let mut cursor = 0usize;
            let mut touched = 0usize;

            let counter = fetcher.clone();
            let mut counted = stream::iter(definitions.into_iter().map(Arc::new))
                .map(move |definition| {
                    let counter = counter.clone();
                    async move {
                        let count = counter.count(&definition).await;
                        (definition, count)
                    }
                })
                .buffered(prefetch)
                .boxed();

            while emitted < target {
                let (definition, count) = match counted.next().await {
                    Some(next) => next,
                    None => break,
                };
                let count = count?;
                touched += 1;

                debug!(
                    definition = %definition.id,
                    count,
                    cursor,
                    "Counted definition"
                );

                let outcome = fetcher
                    .fetch_counted(&definition, count, cursor, range)
                    .await?;
                cursor = cursor.saturating_add(outcome.consumed);

                for asset in outcome.assets {
                    emitted += 1;
                    yield CatalogEntry {
                        definition: Arc::clone(&definition),
                        asset,
                    };
                }
            }

            info!(
                emitted,
                target,
                definitions_touched = touched,
                "Window accumulation finished"
            );
        })
    }
}
