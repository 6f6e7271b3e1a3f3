//! Participant identity abstractions
//!
//! This module provides the [`ParticipantIdentity`] trait that abstracts over
//! the identity a catalog request is made on behalf of:
//!
//! - `ParticipantAgent`: an identity with verified claims and attributes
//! - Any other type the embedding connector uses to represent requesters

use std::collections::BTreeMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::error::IdentityError;

/// Trait for requesting identity abstraction
///
/// The resolver never interprets an identity; it hands it to the
/// definition source, which decides what the participant may see.
pub trait ParticipantIdentity: Clone + Eq + Hash + Send + Sync + Debug + Display + 'static {
    /// Stable identifier of the participant
    fn participant_id(&self) -> &str;

    /// Get a short display form (for logging)
    fn short_id(&self) -> String {
        let id = self.participant_id();
        match id.char_indices().nth(16) {
            Some((idx, _)) => format!("{}…", &id[..idx]),
            None => id.to_string(),
        }
    }
}

/// A requesting participant together with the claims verified for it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantAgent {
    id: String,
    /// Claims asserted by the participant's verified credentials
    pub claims: BTreeMap<String, String>,
    /// Attributes attached by the connector (not verified)
    pub attributes: BTreeMap<String, String>,
}

impl ParticipantAgent {
    /// Create a participant with no claims or attributes
    pub fn new(id: impl Into<String>) -> Result<Self, IdentityError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(IdentityError::InvalidFormat(
                "participant id must not be blank".to_string(),
            ));
        }
        Ok(Self {
            id,
            claims: BTreeMap::new(),
            attributes: BTreeMap::new(),
        })
    }

    /// Add a claim
    pub fn with_claim(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.claims.insert(key.into(), value.into());
        self
    }

    /// Add an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Look up a claim by key
    pub fn claim(&self, key: &str) -> Option<&str> {
        self.claims.get(key).map(String::as_str)
    }
}

impl Display for ParticipantAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl ParticipantIdentity for ParticipantAgent {
    fn participant_id(&self) -> &str {
        &self.id
    }
}
