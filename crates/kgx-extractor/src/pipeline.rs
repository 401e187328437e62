//! Extraction pipeline
//!
//! recognize → refine → instantiate → relations → reify, over a graph
//! passed in by ownership and handed back with a report.

use std::sync::Arc;

use crate::instantiate::EntityInstantiator;
use crate::refine::{EntityTypeRefiner, LlmTypeClassifier};
use crate::reify::Reifier;
use crate::relation::{LlmRelationClassifier, RelationEngine};
use crate::report::ExtractionReport;
use crate::EntityRecognizer;
use kgx_core::{ExtractionConfig, KnowledgeGraph, LlmClient, Ontology, Result};

/// One-sentence-at-a-time extraction pipeline
pub struct Pipeline {
    recognizer: Arc<dyn EntityRecognizer>,
    refiner: EntityTypeRefiner,
    instantiator: EntityInstantiator,
    engine: RelationEngine,
    reifier: Reifier,
}

impl Pipeline {
    /// Pipeline without classifiers and with default settings
    pub fn new(recognizer: Arc<dyn EntityRecognizer>) -> Self {
        let config = ExtractionConfig::default();
        Self::from_config(recognizer, &config, None)
    }

    /// Build from configuration. Without an LLM client both classifiers
    /// are absent and the deterministic fallbacks decide.
    pub fn from_config(
        recognizer: Arc<dyn EntityRecognizer>,
        config: &ExtractionConfig,
        llm: Option<Arc<dyn LlmClient>>,
    ) -> Self {
        let mut refiner = EntityTypeRefiner::new();
        let mut engine =
            RelationEngine::new(Ontology::new()).with_context_window(config.context_window);

        if let Some(client) = llm {
            refiner = refiner.with_classifier(Arc::new(LlmTypeClassifier::new(client.clone())));
            engine = engine.with_classifier(Arc::new(LlmRelationClassifier::new(client)));
        }

        Self {
            recognizer,
            refiner,
            instantiator: EntityInstantiator::new(),
            engine,
            reifier: Reifier::new(config.provenance_source.clone())
                .with_predicates(config.reify_predicates.clone()),
        }
    }

    pub fn with_refiner(mut self, refiner: EntityTypeRefiner) -> Self {
        self.refiner = refiner;
        self
    }

    pub fn with_engine(mut self, engine: RelationEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_reifier(mut self, reifier: Reifier) -> Self {
        self.reifier = reifier;
        self
    }

    pub fn engine(&self) -> &RelationEngine {
        &self.engine
    }

    /// Run the whole pipeline on one text.
    ///
    /// Only a recognizer failure is an error; everything downstream is
    /// fault-isolated and reported as diagnostics.
    pub async fn run(
        &self,
        text: &str,
        mut graph: KnowledgeGraph,
    ) -> Result<(KnowledgeGraph, ExtractionReport)> {
        let mut report = ExtractionReport::new(text);

        let mentions = self.recognizer.recognize(text)?;
        tracing::info!("{} entity mention(s) recognized", mentions.len());
        for mention in &mentions {
            tracing::debug!("  {} ({})", mention.text, mention.label);
        }
        report.mentions = mentions.clone();

        let refined = self.refiner.refine(mentions, text).await;
        report.refined = refined.clone();

        let entities = self
            .instantiator
            .instantiate(&mut graph, &refined, &mut report);
        tracing::info!("{} entit(y/ies) instantiated", entities.len());

        self.engine
            .extract_all(&mut graph, &entities, text, &mut report)
            .await;

        report.statements = self.reifier.reify(&mut graph);

        tracing::info!("Extraction finished: {}", report.summary());
        Ok((graph, report))
    }
}
