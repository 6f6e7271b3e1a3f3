//! Custom tracing layers

use tracing::{Subscriber, span};
use tracing_subscriber::{
    layer::{Context, Layer},
    registry::{LookupSpan, SpanRef},
};

use crate::context::{ContextVisitor, ParticipantContextData};

/// Layer that lifts participant context fields into span extensions
///
/// Spans declaring a `participant` field (and optionally `call_id`) carry a
/// [`ParticipantContextExtension`]. Descendant spans find it through
/// [`participant_of`], whichever thread polls them.
pub struct ParticipantContextLayer;

impl ParticipantContextLayer {
    /// Create a new participant context layer
    pub fn new() -> Self {
        Self
    }
}

impl Default for ParticipantContextLayer {
    fn default() -> Self {
        Self::new()
    }
}

/// Extension data stored on spans
#[derive(Debug, Clone)]
pub struct ParticipantContextExtension {
    pub data: ParticipantContextData,
}

impl<S> Layer<S> for ParticipantContextLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        let mut visitor = ContextVisitor::default();
        attrs.record(&mut visitor);

        if let Some(span) = ctx.span(id)
            && let Some(data) = visitor.apply(None)
        {
            span.extensions_mut().insert(ParticipantContextExtension { data });
        }
    }

    fn on_record(&self, id: &span::Id, values: &span::Record<'_>, ctx: Context<'_, S>) {
        let mut visitor = ContextVisitor::default();
        values.record(&mut visitor);
        if visitor.is_empty() {
            return;
        }

        if let Some(span) = ctx.span(id) {
            let mut extensions = span.extensions_mut();
            let existing = extensions
                .remove::<ParticipantContextExtension>()
                .map(|ext| ext.data);
            if let Some(data) = visitor.apply(existing) {
                extensions.insert(ParticipantContextExtension { data });
            }
        }
    }
}

/// Find the participant context recorded on `span` or its closest ancestor
pub fn participant_of<'a, S>(span: &SpanRef<'a, S>) -> Option<ParticipantContextData>
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    span.scope().find_map(|s| {
        s.extensions()
            .get::<ParticipantContextExtension>()
            .map(|ext| ext.data.clone())
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use tracing::field;
    use tracing_subscriber::{Registry, layer::SubscriberExt};
    use uuid::Uuid;

    /// Records the participant context seen by every new span
    struct ContextRecorder(Arc<Mutex<Vec<Option<ParticipantContextData>>>>);

    impl<S> Layer<S> for ContextRecorder
    where
        S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    {
        fn on_new_span(&self, _attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
            let participant = ctx.span(id).and_then(|span| participant_of(&span));
            self.0.lock().unwrap().push(participant);
        }
    }

    fn subscriber(seen: Arc<Mutex<Vec<Option<ParticipantContextData>>>>) -> impl Subscriber + Send + Sync {
        Registry::default()
            .with(ParticipantContextLayer::new())
            .with(ContextRecorder(seen))
    }

    #[test]
    fn test_spans_capture_participant_fields() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let call_id = Uuid::new_v4();

        tracing::subscriber::with_default(subscriber(Arc::clone(&seen)), || {
            let _query = tracing::info_span!(
                "catalog_query",
                participant = %"did:web:consumer",
                call_id = %call_id,
            )
            .entered();
            let _other = tracing::info_span!(parent: None, "unattributed").entered();
        });

        let seen = seen.lock().unwrap();
        assert_eq!(
            seen[0],
            Some(ParticipantContextData {
                participant_id: "did:web:consumer".to_string(),
                call_id: Some(call_id),
            })
        );
        assert_eq!(seen[1], None);
    }

    #[test]
    fn test_child_spans_inherit_participant() {
        let seen = Arc::new(Mutex::new(Vec::new()));

        tracing::subscriber::with_default(subscriber(Arc::clone(&seen)), || {
            let parent = tracing::info_span!("catalog_query", participant = "consumer");
            let _child = tracing::debug_span!(parent: &parent, "fetch_counted").entered();
        });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].as_ref().map(|d| d.participant_id.as_str()), Some("consumer"));
    }

    #[test]
    fn test_participant_recorded_after_creation() {
        let seen = Arc::new(Mutex::new(Vec::new()));

        tracing::subscriber::with_default(subscriber(Arc::clone(&seen)), || {
            let parent = tracing::info_span!("catalog_query", participant = field::Empty);
            parent.record("participant", "late");
            let _child = tracing::debug_span!(parent: &parent, "fetch_counted").entered();
        });

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0], None);
        assert_eq!(seen[1].as_ref().map(|d| d.participant_id.as_str()), Some("late"));
    }
}
