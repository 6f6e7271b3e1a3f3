//! Error types for catalog resolution
//!
//! Every variant is terminal for the dataset stream that produced it.
//! Datasets yielded before the error remain valid.

use catalog_core::StorageError;
use thiserror::Error;

/// Errors that end a catalog resolution
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The definition source failed
    #[error("Failed to load contract definitions: {0}")]
    Definitions(#[source] StorageError),

    /// Counting the assets of a definition failed
    #[error("Counting assets for definition '{definition_id}' failed: {source}")]
    Count {
        definition_id: String,
        #[source]
        source: StorageError,
    },

    /// Fetching a page of assets for a definition failed
    #[error("Fetching assets for definition '{definition_id}' failed: {source}")]
    Fetch {
        definition_id: String,
        #[source]
        source: StorageError,
    },

    /// The policy store failed
    #[error("Looking up policy '{policy_id}' for definition '{definition_id}' failed: {source}")]
    PolicyLookup {
        definition_id: String,
        policy_id: String,
        #[source]
        source: StorageError,
    },

    /// A definition producing datasets references a contract policy that does not exist
    #[error("Contract policy '{policy_id}' of definition '{definition_id}' not found")]
    MissingPolicy {
        definition_id: String,
        policy_id: String,
    },
}

impl ResolveError {
    /// The definition being processed when the error occurred, if any
    pub fn definition_id(&self) -> Option<&str> {
        match self {
            ResolveError::Definitions(_) => None,
            ResolveError::Count { definition_id, .. }
            | ResolveError::Fetch { definition_id, .. }
            | ResolveError::PolicyLookup { definition_id, .. }
            | ResolveError::MissingPolicy { definition_id, .. } => Some(definition_id),
        }
    }

    /// True if the error was raised by a collaborator rather than by missing data
    pub fn is_collaborator_failure(&self) -> bool {
        !matches!(self, ResolveError::MissingPolicy { .. })
    }
}
