//! Relation Extraction (RE) module
//!
//! Decides the relation between every entity pair of a sentence and
//! records it in the knowledge graph after domain/range validation.
//!
//! Decision order for a pair:
//! 1. the keyword cascade over the local context window
//! 2. the external relation classifier, its answer normalized
//! 3. the whole-sentence keyword fallback when the classifier is absent
//!    or fails

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cascade::{apply_cascade, keyword_fallback, local_context, normalize_answer, CascadeRule};
use crate::instantiate::InstantiatedEntity;
use crate::report::{ExtractionReport, RecordedRelation, RejectedRelation};
use crate::validate::{validate_and_repair, Verdict};
use kgx_core::{
    KgError, KnowledgeGraph, LlmClient, Ontology, OntologyClass, Relation, RelationAssertion,
    Result,
};

// ============================================================================
// Relation classifier capability
// ============================================================================

/// External relation classifier
///
/// Returns a raw answer that the engine normalizes. Any error is
/// recovered by the keyword fallback.
#[async_trait]
pub trait RelationClassifier: Send + Sync {
    async fn classify_relation(&self, subject: &str, object: &str, sentence: &str)
        -> Result<String>;
}

/// LLM-backed relation classifier
pub struct LlmRelationClassifier {
    client: Arc<dyn LlmClient>,
    system_prompt: String,
}

impl LlmRelationClassifier {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            system_prompt: include_str!("prompts/re_system.txt").to_string(),
        }
    }

    /// Build the user prompt for one pair
    pub fn build_prompt(&self, subject: &str, object: &str, sentence: &str) -> String {
        format!(
            "Context: \"{sentence}\"\nAnalyze the relationship between the entities: \"{subject}\" and \"{object}\".\n\nRelation:"
        )
    }
}

#[async_trait]
impl RelationClassifier for LlmRelationClassifier {
    async fn classify_relation(
        &self,
        subject: &str,
        object: &str,
        sentence: &str,
    ) -> Result<String> {
        let prompt = self.build_prompt(subject, object, sentence);
        tracing::debug!(model = self.client.model(), "Classifying {subject} / {object}");
        self.client
            .generate_with_system(&self.system_prompt, &prompt)
            .await
    }
}

/// Deterministic classifier for tests and offline evaluation
#[derive(Debug, Clone, Default)]
pub struct FixedRelationClassifier {
    answers: HashMap<(String, String), String>,
    default: Option<String>,
}

impl FixedRelationClassifier {
    /// Classifier that fails every call
    pub fn failing() -> Self {
        Self::default()
    }

    /// Classifier giving the same answer for every pair
    pub fn always(answer: impl Into<String>) -> Self {
        Self {
            answers: HashMap::new(),
            default: Some(answer.into()),
        }
    }

    /// Answer for one (subject, object) pair
    pub fn with_answer(
        mut self,
        subject: impl Into<String>,
        object: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        self.answers
            .insert((subject.into(), object.into()), answer.into());
        self
    }
}

#[async_trait]
impl RelationClassifier for FixedRelationClassifier {
    async fn classify_relation(
        &self,
        subject: &str,
        object: &str,
        _sentence: &str,
    ) -> Result<String> {
        self.answers
            .get(&(subject.to_string(), object.to_string()))
            .or(self.default.as_ref())
            .cloned()
            .ok_or_else(|| KgError::Classifier(format!("no answer for {subject} / {object}")))
    }
}

// ============================================================================
// Decisions
// ============================================================================

/// What decided a relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    Cascade(CascadeRule),
    /// Normalized classifier answer (raw answer kept)
    Classifier(String),
    Fallback,
}

impl std::fmt::Display for DecisionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cascade(rule) => write!(f, "{rule}"),
            Self::Classifier(answer) => write!(f, "classifier ({answer:?})"),
            Self::Fallback => write!(f, "keyword fallback"),
        }
    }
}

/// Relation chosen for one pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub relation: Relation,
    pub source: DecisionSource,
    /// The classifier was consulted and failed
    pub classifier_failed: bool,
}

// ============================================================================
// Engine
// ============================================================================

/// Relation extraction and type reconciliation engine
pub struct RelationEngine {
    ontology: Ontology,
    classifier: Option<Arc<dyn RelationClassifier>>,
    context_window: usize,
}

impl RelationEngine {
    /// Engine without a classifier (keyword fallback for undecided pairs)
    pub fn new(ontology: Ontology) -> Self {
        Self {
            ontology,
            classifier: None,
            context_window: 50,
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn RelationClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Characters kept on each side of the entity span
    pub fn with_context_window(mut self, radius: usize) -> Self {
        self.context_window = radius;
        self
    }

    pub fn ontology(&self) -> &Ontology {
        &self.ontology
    }

    /// Decide the relation between `subject` and `object` (surface texts)
    pub async fn decide(&self, subject: &str, object: &str, sentence: &str) -> Decision {
        let context = local_context(sentence, subject, object, self.context_window);
        tracing::debug!("Local context for {subject} / {object}: ...{context}...");

        if let Some(rule) = apply_cascade(&context, object) {
            return Decision {
                relation: rule.relation(),
                source: DecisionSource::Cascade(rule),
                classifier_failed: false,
            };
        }

        let Some(classifier) = &self.classifier else {
            return Decision {
                relation: keyword_fallback(sentence, object),
                source: DecisionSource::Fallback,
                classifier_failed: false,
            };
        };

        match classifier.classify_relation(subject, object, sentence).await {
            Ok(answer) => Decision {
                relation: normalize_answer(&answer),
                source: DecisionSource::Classifier(answer),
                classifier_failed: false,
            },
            Err(e) => {
                tracing::warn!("Relation classifier failed for {subject} / {object}: {e}");
                Decision {
                    relation: keyword_fallback(sentence, object),
                    source: DecisionSource::Fallback,
                    classifier_failed: true,
                }
            }
        }
    }

    /// Extract relations for every pair `i < j` of `entities`, in order.
    ///
    /// Never fails: rejected relations and classifier failures end up in the
    /// report as diagnostics.
    pub async fn extract_all(
        &self,
        graph: &mut KnowledgeGraph,
        entities: &[InstantiatedEntity],
        sentence: &str,
        report: &mut ExtractionReport,
    ) {
        for (i, subject) in entities.iter().enumerate() {
            for object in &entities[i + 1..] {
                if subject.id == object.id {
                    continue;
                }
                self.extract_pair(graph, subject, object, sentence, report)
                    .await;
            }
        }
    }

    async fn extract_pair(
        &self,
        graph: &mut KnowledgeGraph,
        subject: &InstantiatedEntity,
        object: &InstantiatedEntity,
        sentence: &str,
        report: &mut ExtractionReport,
    ) {
        let decision = self.decide(&subject.text, &object.text, sentence).await;
        if decision.classifier_failed {
            report.classifier_failures += 1;
        }
        let relation = decision.relation;

        let verdict = validate_and_repair(
            graph,
            &self.ontology,
            &subject.id,
            relation,
            &object.id,
            &mut report.widenings,
        );

        match verdict {
            Verdict::Accepted => {
                let assertion = RelationAssertion::new(&subject.id, relation, &object.id);
                if !graph.record_assertion(assertion.clone()) {
                    tracing::debug!("Already recorded: {assertion}");
                    return;
                }
                tracing::info!("Relation: {assertion} [{}]", decision.source);

                if relation == Relation::Author
                    && graph.add_class(&object.id, OntologyClass::ValidatedCourse)
                {
                    tracing::info!("{} is now a ValidatedCourse", object.id);
                }

                report.recorded.push(RecordedRelation {
                    assertion,
                    decided_by: decision.source,
                });
            }
            Verdict::Rejected(reason) => {
                tracing::warn!(
                    "Rejected {} --[{relation}]--> {}: {reason}",
                    subject.id,
                    object.id
                );
                report.rejected.push(RejectedRelation {
                    subject: subject.id.clone(),
                    relation,
                    object: object.id.clone(),
                    decided_by: decision.source,
                    reason,
                });
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
