//! Participant context carried on spans
//!
//! A catalog request records the participant it is served for, and a call id,
//! as fields of its `catalog_query` span. The context travels with the span, so
//! it stays attached while the request stream is polled on any worker thread.

use std::fmt;

use tracing::field::{Field, Visit};
use uuid::Uuid;

/// Standard span field names for participant context
pub mod fields {
    pub const PARTICIPANT: &str = "participant";
    pub const CALL_ID: &str = "call_id";
}

/// Participant context read from span fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantContextData {
    /// The requesting participant's id
    pub participant_id: String,
    /// Unique id of the request being served, if the span recorded one
    pub call_id: Option<Uuid>,
}

/// Collects participant context fields from span attributes or records
#[derive(Debug, Default)]
pub(crate) struct ContextVisitor {
    participant_id: Option<String>,
    call_id: Option<Uuid>,
}

impl ContextVisitor {
    fn record_value(&mut self, field: &Field, value: String) {
        match field.name() {
            fields::PARTICIPANT => self.participant_id = Some(value),
            fields::CALL_ID => self.call_id = Uuid::parse_str(&value).ok(),
            _ => {}
        }
    }

    /// Whether any context field was seen
    pub(crate) fn is_empty(&self) -> bool {
        self.participant_id.is_none() && self.call_id.is_none()
    }

    /// Overlay the fields seen onto `existing`
    ///
    /// A call id without a participant cannot form a context on its own.
    pub(crate) fn apply(self, existing: Option<ParticipantContextData>) -> Option<ParticipantContextData> {
        match (existing, self.participant_id) {
            (Some(mut data), participant) => {
                if let Some(participant_id) = participant {
                    data.participant_id = participant_id;
                }
                if self.call_id.is_some() {
                    data.call_id = self.call_id;
                }
                Some(data)
            }
            (None, Some(participant_id)) => Some(ParticipantContextData {
                participant_id,
                call_id: self.call_id,
            }),
            (None, None) => None,
        }
    }
}

impl Visit for ContextVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_value(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        // `%value` fields arrive here and format through Display
        self.record_value(field, format!("{value:?}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_builds_context_from_participant() {
        let visitor = ContextVisitor {
            participant_id: Some("did:web:consumer".to_string()),
            call_id: None,
        };

        let data = visitor.apply(None).unwrap();
        assert_eq!(data.participant_id, "did:web:consumer");
        assert!(data.call_id.is_none());
    }

    #[test]
    fn test_apply_overlays_existing_context() {
        let call_id = Uuid::new_v4();
        let existing = ParticipantContextData {
            participant_id: "a".to_string(),
            call_id: None,
        };
        let visitor = ContextVisitor {
            participant_id: None,
            call_id: Some(call_id),
        };

        let data = visitor.apply(Some(existing)).unwrap();
        assert_eq!(data.participant_id, "a");
        assert_eq!(data.call_id, Some(call_id));
    }

    #[test]
    fn test_call_id_alone_is_not_a_context() {
        let visitor = ContextVisitor {
            participant_id: None,
            call_id: Some(Uuid::new_v4()),
        };
        assert!(!visitor.is_empty());
        assert!(visitor.apply(None).is_none());
    }
}
