//! Catalog resolution entry point

use std::pin::Pin;
use std::sync::Arc;

use async_stream::try_stream;
use futures::stream::{Stream, StreamExt};
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use catalog_core::{
    AssetIndex, Dataset, DefinitionSource, Distribution, ParticipantIdentity, PolicyStore, Range,
};

use crate::accumulator::WindowAccumulator;
use crate::assembler::DatasetAssembler;
use crate::config::{MissingPolicyBehavior, ResolverConfig};
use crate::error::ResolveError;

/// Lazy, single-pass stream of datasets for one catalog request
pub type DatasetStream = Pin<Box<dyn Stream<Item = Result<Dataset, ResolveError>> + Send>>;

/// Resolves a page of the catalog visible to a participant
///
/// The resolver holds no per-request state. Every call to [`query`](Self::query)
/// runs the whole pipeline again against the current store contents.
pub struct DatasetResolver<I: ParticipantIdentity> {
    definitions: Arc<dyn DefinitionSource<I>>,
    accumulator: WindowAccumulator,
    assembler: DatasetAssembler,
    config: ResolverConfig,
}

impl<I: ParticipantIdentity> Clone for DatasetResolver<I> {
    fn clone(&self) -> Self {
        Self {
            definitions: Arc::clone(&self.definitions),
            accumulator: self.accumulator.clone(),
            assembler: self.assembler.clone(),
            config: self.config.clone(),
        }
    }
}

impl<I: ParticipantIdentity> DatasetResolver<I> {
    /// Create a resolver with the default configuration
    pub fn new(
        definitions: Arc<dyn DefinitionSource<I>>,
        index: Arc<dyn AssetIndex>,
        policies: Arc<dyn PolicyStore>,
    ) -> Self {
        Self {
            definitions,
            accumulator: WindowAccumulator::new(index),
            assembler: DatasetAssembler::new(policies),
            config: ResolverConfig::default(),
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.accumulator = self.accumulator.with_count_prefetch(config.count_prefetch);
        self.config = config;
        self
    }

    /// Get the active configuration
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve the datasets at global positions `range` for `participant`
    ///
    /// Each dataset carries `distribution`. The returned stream is lazy: no
    /// collaborator is called before it is first polled, and dropping it stops
    /// further calls. An error ends the stream; datasets yielded before it
    /// remain valid.
    ///
    /// Every store call runs inside a `catalog_query` span carrying the
    /// participant id, a fresh call id and the range.
    pub fn query(&self, participant: &I, range: Range, distribution: Distribution) -> DatasetStream {
        let range = match self.config.max_page_size {
            Some(max) => range.clamp_len(max),
            None => range,
        };
        let span = info_span!(
            "catalog_query",
            participant = %participant.participant_id(),
            call_id = %Uuid::new_v4(),
            range = %range,
        );

        let participant = participant.clone();
        let definitions = Arc::clone(&self.definitions);
        let accumulator = self.accumulator.clone();
        let assembler = self.assembler.clone();
        let missing_policy = self.config.missing_policy;

        Box::pin(try_stream! {
            if range.is_empty() {
                debug!(parent: &span, "Empty range requested");
            } else {
                let visible = definitions
                    .definitions_for(&participant)
                    .instrument(span.clone())
                    .await
                    .map_err(ResolveError::Definitions)?;
                debug!(parent: &span, definitions = visible.len(), "Loaded contract definitions");

                let mut entries = accumulator.entries(visible, range);
                let mut emitted = 0usize;
                let mut skipped = 0usize;

                while let Some(entry) = entries.next().instrument(span.clone()).await {
                    let entry = entry?;
                    match assembler
                        .assemble(entry, &distribution)
                        .instrument(span.clone())
                        .await
                    {
                        Ok(dataset) => {
                            emitted += 1;
                            yield dataset;
                        }
                        Err(ResolveError::MissingPolicy { definition_id, policy_id })
                            if missing_policy == MissingPolicyBehavior::Skip =>
                        {
                            skipped += 1;
                            warn!(
                                parent: &span,
                                definition = %definition_id,
                                policy = %policy_id,
                                "Contract policy not found, skipping dataset"
                            );
                        }
                        Err(e) => {
                            Err::<(), ResolveError>(e)?;
                        }
                    }
                }

                info!(parent: &span, emitted, skipped, "Catalog query completed");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::{Asset, ContractDefinition, DataService, ParticipantAgent, Policy, PolicyDefinition};
    use catalog_storage::{InMemoryAssetIndex, InMemoryDefinitionStore, InMemoryPolicyStore};
    use futures::TryStreamExt;

    use std::sync::Mutex;

    use catalog_logging::{ParticipantContextLayer, participant_of};
    use tracing::{Event, Subscriber, span};
    use tracing_subscriber::{
        Registry,
        layer::{Context, Layer, SubscriberExt},
        registry::LookupSpan,
    };

    /// A span as seen when it was opened
    #[derive(Debug)]
    struct OpenedSpan {
        name: String,
        parent: Option<String>,
        participant: Option<String>,
    }

    /// Captures every opened span and the root span of every accumulator event
    #[derive(Default, Clone)]
    struct SpanCapture {
        spans: Arc<Mutex<Vec<OpenedSpan>>>,
        accumulator_roots: Arc<Mutex<Vec<Option<String>>>>,
    }

    impl<S> Layer<S> for SpanCapture
    where
        S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    {
        fn on_new_span(&self, _attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
            if let Some(span) = ctx.span(id) {
                self.spans.lock().unwrap().push(OpenedSpan {
                    name: span.name().to_string(),
                    parent: span.parent().map(|p| p.name().to_string()),
                    participant: participant_of(&span).map(|data| data.participant_id),
                });
            }
        }

        fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
            if event.metadata().target().ends_with("accumulator") {
                let root = ctx
                    .event_scope(event)
                    .and_then(|scope| scope.from_root().next().map(|s| s.name().to_string()));
                self.accumulator_roots.lock().unwrap().push(root);
            }
        }
    }

    fn resolver(assets: usize, definitions: usize) -> DatasetResolver<ParticipantAgent> {
        let index = InMemoryAssetIndex::new();
        index.extend((0..assets).map(|i| Asset::new(format!("asset-{i:03}"))));
        let store = InMemoryDefinitionStore::new();
        for n in 0..definitions {
            store.insert(ContractDefinition::new(format!("def-{n}"), "access", "contract"));
        }
        let policies = InMemoryPolicyStore::new();
        policies.insert(PolicyDefinition::new("contract", Policy::new()));
        DatasetResolver::new(Arc::new(store), Arc::new(index), Arc::new(policies))
    }

    fn distribution() -> Distribution {
        Distribution::new("HttpData-PULL", DataService::new("svc", "https://provider.example/dsp"))
    }

    #[tokio::test]
    async fn test_query_single_definition() {
        let resolver = resolver(10, 1);
        let agent = ParticipantAgent::new("consumer").unwrap();

        let datasets: Vec<Dataset> = resolver
            .query(&agent, Range::new(3, 6), distribution())
            .try_collect()
            .await
            .unwrap();

        let ids: Vec<&str> = datasets.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["asset-003", "asset-004", "asset-005"]);
    }

    #[tokio::test]
    async fn test_max_page_size_clamps_range() {
        let resolver = resolver(10, 2).with_config(ResolverConfig::default().with_max_page_size(4));
        let agent = ParticipantAgent::new("consumer").unwrap();

        let datasets: Vec<Dataset> = resolver
            .query(&agent, Range::new(8, 20), distribution())
            .try_collect()
            .await
            .unwrap();

        assert_eq!(datasets.len(), 4);
        assert_eq!(datasets[0].id.as_str(), "asset-008");
        assert_eq!(datasets[2].id.as_str(), "asset-000");
    }

    #[tokio::test]
    async fn test_store_calls_run_inside_query_span() {
        let capture = SpanCapture::default();
        let subscriber = Registry::default()
            .with(ParticipantContextLayer::new())
            .with(capture.clone());
        let _default = tracing::subscriber::set_default(subscriber);

        let resolver = resolver(10, 2);
        let agent = ParticipantAgent::new("did:web:consumer").unwrap();
        let datasets: Vec<Dataset> = resolver
            .query(&agent, Range::new(8, 12), distribution())
            .try_collect()
            .await
            .unwrap();
        assert_eq!(datasets.len(), 4);

        let spans = capture.spans.lock().unwrap();
        let fetches: Vec<&OpenedSpan> = spans.iter().filter(|s| s.name == "fetch_counted").collect();
        assert_eq!(fetches.len(), 2);
        for fetch in fetches {
            assert_eq!(fetch.parent.as_deref(), Some("catalog_query"));
            assert_eq!(fetch.participant.as_deref(), Some("did:web:consumer"));
        }

        let roots = capture.accumulator_roots.lock().unwrap();
        assert!(!roots.is_empty());
        assert!(roots.iter().all(|root| root.as_deref() == Some("catalog_query")));
    }
}
