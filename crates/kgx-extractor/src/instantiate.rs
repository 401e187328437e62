//! Entity Instantiator
//!
//! Maps refined mentions to ontology classes and materializes entity
//! records in the knowledge graph.

use serde::{Deserialize, Serialize};

use crate::normalize::normalize_fragment;
use crate::report::{ExtractionReport, SkippedEntity};
use kgx_core::{EntityLabel, EntityMention, KnowledgeGraph, OntologyClass};

/// Words marking a miscellaneous mention as a work or document
pub const DOCUMENT_KEYWORDS: &[&str] = &[
    "roman", "livre", "cours", "spécifications", "document", "article", "publication",
    "ouvrage", "œuvre", "the", "les", "le",
];

/// An entity materialized in the graph, as seen by relation extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstantiatedEntity {
    /// Surface text from the sentence
    pub text: String,
    /// Graph identifier
    pub id: String,
    /// Class assigned at instantiation
    pub class: OntologyClass,
}

/// Maps (text, label) pairs to entity records
#[derive(Debug, Clone, Default)]
pub struct EntityInstantiator;

impl EntityInstantiator {
    pub fn new() -> Self {
        Self
    }

    /// Ontology class for a refined label, `None` when the label is unmappable
    pub fn class_for(mention: &EntityMention) -> Option<OntologyClass> {
        match &mention.label {
            EntityLabel::Person => Some(OntologyClass::Person),
            EntityLabel::Location => Some(OntologyClass::Place),
            EntityLabel::Organization => Some(OntologyClass::Organization),
            EntityLabel::Topic | EntityLabel::Document => Some(OntologyClass::Document),
            EntityLabel::Misc => {
                let text = mention.text.to_lowercase();
                DOCUMENT_KEYWORDS
                    .iter()
                    .any(|k| text.contains(k))
                    .then_some(OntologyClass::Document)
            }
            EntityLabel::Other(_) => None,
        }
    }

    /// Instantiate every mappable mention; unmappable ones are skipped with
    /// a diagnostic. Returns the instantiated entities, one per distinct
    /// surface text, in mention order.
    pub fn instantiate(
        &self,
        graph: &mut KnowledgeGraph,
        mentions: &[EntityMention],
        report: &mut ExtractionReport,
    ) -> Vec<InstantiatedEntity> {
        let mut entities: Vec<InstantiatedEntity> = Vec::new();

        for mention in mentions {
            let Some(class) = Self::class_for(mention) else {
                let reason = match mention.label {
                    EntityLabel::Misc => "miscellaneous mention is not a document".to_string(),
                    _ => format!("unmapped label {}", mention.label),
                };
                tracing::warn!("Skipping entity '{}': {reason}", mention.text);
                report.skipped_entities.push(SkippedEntity {
                    mention: mention.clone(),
                    reason,
                });
                continue;
            };

            let id = normalize_fragment(&mention.text);
            if graph.upsert_entity(id.as_str(), class, mention.text.as_str()) {
                tracing::info!("Instance created: {id} ({})", class.local_name());
            } else {
                tracing::debug!("'{}' aliases existing instance {id}", mention.text);
            }

            match entities.iter_mut().find(|e| e.text == mention.text) {
                Some(existing) => existing.class = class,
                None => entities.push(InstantiatedEntity {
                    text: mention.text.clone(),
                    id,
                    class,
                }),
            }
        }

        entities
    }
}
