//! Windowed counting and fetching for a single contract definition
//!
//! Each definition occupies the virtual sub-range
//! `[cursor_start, cursor_start + count)` of the global catalog. The fetcher
//! intersects that sub-range with the requested window and asks the store
//! for exactly the overlapping local slice.

use std::sync::Arc;

use catalog_core::{Asset, AssetIndex, ContractDefinition, Range};
use tracing::{instrument, trace, warn};

use crate::error::ResolveError;

/// The slice of one definition's matches that falls inside the global window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalWindow {
    pub offset: usize,
    pub limit: usize,
}

impl LocalWindow {
    /// Compute the local slice for a definition with `count` matches starting
    /// at global position `cursor_start`
    ///
    /// Returns `None` if the definition contributes nothing to `range`.
    pub fn locate(cursor_start: usize, count: usize, range: Range) -> Option<Self> {
        if !range.intersects(cursor_start, count) {
            return None;
        }

        let offset = range.from.saturating_sub(cursor_start);
        let end = range.to.min(cursor_start.saturating_add(count));
        let limit = end.checked_sub(cursor_start.saturating_add(offset))?;
        (limit > 0).then_some(Self { offset, limit })
    }
}

/// Assets fetched for one definition, plus how far the global cursor moves
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    pub assets: Vec<Asset>,
    /// Number of global positions the definition occupies (its full count)
    pub consumed: usize,
}

/// Counts and fetches the slice of a definition that overlaps a global window
#[derive(Clone)]
pub struct WindowedFetcher {
    index: Arc<dyn AssetIndex>,
}

impl WindowedFetcher {
    pub fn new(index: Arc<dyn AssetIndex>) -> Self {
        Self { index }
    }

    /// Count the definition's matches, then fetch its overlap with `range`
    pub async fn fetch(
        &self,
        definition: &ContractDefinition,
        cursor_start: usize,
        range: Range,
    ) -> Result<FetchOutcome, ResolveError> {
        let count = self.count(definition).await?;
        self.fetch_counted(definition, count, cursor_start, range).await
    }

    /// Count the assets matching a definition's selector
    pub async fn count(&self, definition: &ContractDefinition) -> Result<usize, ResolveError> {
        self.index
            .count(&definition.selector)
            .await
            .map_err(|source| ResolveError::Count {
                definition_id: definition.id.clone(),
                source,
            })
    }

    /// Fetch the overlap with `range` for a definition already known to have `count` matches
    #[instrument(skip(self, definition, range), fields(definition = %definition.id, range = %range))]
    pub async fn fetch_counted(
        &self,
        definition: &ContractDefinition,
        count: usize,
        cursor_start: usize,
        range: Range,
    ) -> Result<FetchOutcome, ResolveError> {
        let Some(window) = LocalWindow::locate(cursor_start, count, range) else {
            trace!("Definition outside requested window");
            return Ok(FetchOutcome {
                assets: Vec::new(),
                consumed: count,
            });
        };

        let mut assets = self
            .index
            .query(&definition.selector, window.offset, window.limit)
            .await
            .map_err(|source| ResolveError::Fetch {
                definition_id: definition.id.clone(),
                source,
            })?;

        if assets.len() > window.limit {
            warn!(
                returned = assets.len(),
                limit = window.limit,
                "Asset index returned more assets than requested, truncating"
            );
            assets.truncate(window.limit);
        }

        trace!(
            offset = window.offset,
            limit = window.limit,
            fetched = assets.len(),
            "Fetched definition slice"
        );

        Ok(FetchOutcome {
            assets,
            consumed: count,
        })
    }
}
