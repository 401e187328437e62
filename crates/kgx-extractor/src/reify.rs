//! Reification Layer
//!
//! Wraps whitelisted assertions in statements carrying provenance.

use sha2::{Digest, Sha256};

use kgx_core::{KnowledgeGraph, ReifiedStatement, Relation, RelationAssertion};

/// Default reification whitelist
pub const DEFAULT_PREDICATES: &[&str] = &["teaches", "author", "about", "relatedTo", "worksAt"];

/// Statement identifier derived from the triple's IRIs.
///
/// The same (subject, predicate, object) always maps to the same id.
pub fn statement_id(assertion: &RelationAssertion) -> String {
    let mut hasher = Sha256::new();
    hasher.update(kgx_core::model::entity_iri(&assertion.subject).as_bytes());
    hasher.update([0u8]);
    hasher.update(assertion.relation.iri().as_bytes());
    hasher.update([0u8]);
    hasher.update(kgx_core::model::entity_iri(&assertion.object).as_bytes());
    let digest = hasher.finalize();

    let hex: String = digest[..4].iter().map(|b| format!("{b:02x}")).collect();
    format!("statement_{hex}")
}

/// Reifies assertions whose predicate is on the whitelist
#[derive(Debug, Clone)]
pub struct Reifier {
    predicates: Vec<String>,
    source: String,
}

impl Reifier {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            predicates: DEFAULT_PREDICATES.iter().map(|p| p.to_string()).collect(),
            source: source.into(),
        }
    }

    pub fn with_predicates(mut self, predicates: Vec<String>) -> Self {
        self.predicates = predicates;
        self
    }

    /// Reify every whitelisted assertion, whitelist order first.
    ///
    /// Returns the identifiers of the statements created. Predicates
    /// outside the relation vocabulary (such as `about`) match nothing.
    pub fn reify(&self, graph: &mut KnowledgeGraph) -> Vec<String> {
        let mut created = Vec::new();

        for name in &self.predicates {
            let Some(relation) = Relation::from_name(name) else {
                tracing::debug!("No assertions can use predicate {name}");
                continue;
            };

            let assertions: Vec<RelationAssertion> =
                graph.assertions_with(relation).cloned().collect();
            for assertion in assertions {
                let id = statement_id(&assertion);
                if let Some(existing) = graph.statement(&id) {
                    if existing.assertion != assertion {
                        tracing::warn!("Statement id collision on {id}, keeping the first");
                    }
                    continue;
                }
                graph.add_statement(ReifiedStatement {
                    id: id.clone(),
                    assertion,
                    source: self.source.clone(),
                });
                tracing::info!("Reified {id}");
                created.push(id);
            }
        }

        created
    }
}
