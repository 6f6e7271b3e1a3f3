//! Global page ranges over the concatenated catalog

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Half-open window `[from, to)` over the virtual concatenation of every
/// definition's matching assets, in definition-source order.
///
/// A range with `to <= from` is empty, not invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub from: usize,
    pub to: usize,
}

impl Range {
    /// Create a new range
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    /// Number of entries the range asks for
    pub fn len(&self) -> usize {
        self.to.saturating_sub(self.from)
    }

    /// True if the range asks for nothing
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if `[start, start + len)` shares at least one position with this range
    pub fn intersects(&self, start: usize, len: usize) -> bool {
        let end = start.saturating_add(len);
        !self.is_empty() && len > 0 && start < self.to && self.from < end
    }

    /// Shrink the range so it asks for at most `max_len` entries
    pub fn clamp_len(self, max_len: usize) -> Self {
        Self {
            from: self.from,
            to: self.to.min(self.from.saturating_add(max_len)),
        }
    }
}

impl Default for Range {
    /// The first page, matching the connector's default page size
    fn default() -> Self {
        Self { from: 0, to: 50 }
    }
}

impl Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.from, self.to)
    }
}
