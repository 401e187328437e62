//! Domain/range validation with adaptive typing
//!
//! Checking a constraint is a pure read of the graph. Widening an
//! entity's class set is a separate, explicit step ([`attempt_widen`])
//! that only the orchestration in [`validate_and_repair`] invokes.

use serde::{Deserialize, Serialize};

use kgx_core::{KnowledgeGraph, Ontology, OntologyClass, PropertyDeclaration, Relation};

/// A class added to an entity to satisfy a constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Widening {
    pub entity: String,
    pub class: OntologyClass,
    pub relation: Relation,
}

/// Outcome of validating one candidate assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(String),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Subject holds the declared domain class (unconstrained when absent)
pub fn domain_satisfied(graph: &KnowledgeGraph, subject: &str, decl: &PropertyDeclaration) -> bool {
    decl.domain.map_or(true, |class| graph.has_class(subject, class))
}

/// Object holds one of the accepted range classes (unconstrained when absent)
pub fn range_satisfied(graph: &KnowledgeGraph, object: &str, decl: &PropertyDeclaration) -> bool {
    let accepted = decl.accepted_range();
    accepted.is_empty() || accepted.iter().any(|class| graph.has_class(object, *class))
}

/// `teachesSubject` is checked against the instantiation classes directly
pub fn teaches_subject_satisfied(graph: &KnowledgeGraph, subject: &str, object: &str) -> bool {
    graph.has_class(subject, OntologyClass::Person) && graph.has_class(object, OntologyClass::Document)
}

/// Widen a place so it also holds `required`.
///
/// Only places are widened, and only towards Organization or Document.
/// Additive: existing classes are kept. Returns `true` if a class was added.
pub fn attempt_widen(graph: &mut KnowledgeGraph, id: &str, required: OntologyClass) -> bool {
    let eligible = matches!(required, OntologyClass::Organization | OntologyClass::Document);
    if !eligible || !graph.has_class(id, OntologyClass::Place) {
        return false;
    }
    graph.add_class(id, required)
}

/// Validate a candidate relation, widening object then subject when needed.
///
/// Widenings performed along the way are kept even if the relation is
/// finally rejected; they are appended to `widened`.
pub fn validate_and_repair(
    graph: &mut KnowledgeGraph,
    ontology: &Ontology,
    subject: &str,
    relation: Relation,
    object: &str,
    widened: &mut Vec<Widening>,
) -> Verdict {
    match relation {
        Relation::RelatedTo => return Verdict::Accepted,
        Relation::TeachesSubject => {
            return if teaches_subject_satisfied(graph, subject, object) {
                Verdict::Accepted
            } else {
                Verdict::Rejected(format!(
                    "{relation} needs a Person subject and a Document object"
                ))
            };
        }
        _ => {}
    }

    let Some(decl) = ontology.declaration(relation) else {
        return Verdict::Rejected(format!("{relation} is not declared in the ontology"));
    };

    let mut domain_ok = domain_satisfied(graph, subject, decl);
    let mut range_ok = range_satisfied(graph, object, decl);

    if !range_ok {
        if let Some(required) = decl.range {
            if attempt_widen(graph, object, required) {
                tracing::info!("Adaptive typing: {object} is now also {}", required.local_name());
                widened.push(Widening {
                    entity: object.to_string(),
                    class: required,
                    relation,
                });
                range_ok = true;
            }
        }
    }

    if !domain_ok {
        if let Some(required) = decl.domain {
            if attempt_widen(graph, subject, required) {
                tracing::info!("Adaptive typing: {subject} is now also {}", required.local_name());
                widened.push(Widening {
                    entity: subject.to_string(),
                    class: required,
                    relation,
                });
                domain_ok = true;
            }
        }
    }

    match (domain_ok, range_ok) {
        (true, true) => Verdict::Accepted,
        (false, _) => Verdict::Rejected(format!(
            "{subject} is not a {} (domain of {relation})",
            decl.domain.map_or("Resource", |c| c.local_name())
        )),
        (true, false) => Verdict::Rejected(format!(
            "{object} is not a {} (range of {relation})",
            decl.range.map_or("Resource", |c| c.local_name())
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> KnowledgeGraph {
        let mut graph = KnowledgeGraph::new();
        graph.upsert_entity("macron", OntologyClass::Person, "Macron");
        graph.upsert_entity("elysee", OntologyClass::Place, "Élysée");
        graph.upsert_entity("hugo", OntologyClass::Person, "Hugo");
        graph.upsert_entity("livre", OntologyClass::Document, "Livre");
        graph
    }

    #[test]
    fn test_widen_only_places() {
        let mut graph = graph();
        assert!(!attempt_widen(&mut graph, "macron", OntologyClass::Organization));
        assert!(!attempt_widen(&mut graph, "elysee", OntologyClass::Person));
        assert!(attempt_widen(&mut graph, "elysee", OntologyClass::Organization));
        assert!(graph.has_class("elysee", OntologyClass::Place));
        assert!(graph.has_class("elysee", OntologyClass::Organization));
    }

    #[test]
    fn test_range_widening_accepts() {
        let mut graph = graph();
        let ontology = Ontology::new();
        let mut widened = Vec::new();

        let verdict = validate_and_repair(
            &mut graph,
            &ontology,
            "macron",
            Relation::WorksAt,
            "elysee",
            &mut widened,
        );

        assert!(verdict.is_accepted());
        assert_eq!(widened.len(), 1);
        assert_eq!(widened[0].class, OntologyClass::Organization);
    }

    #[test]
    fn test_domain_failure_rejects() {
        let mut graph = graph();
        let ontology = Ontology::new();
        let mut widened = Vec::new();

        let verdict = validate_and_repair(
            &mut graph,
            &ontology,
            "livre",
            Relation::Author,
            "livre",
            &mut widened,
        );
        assert!(!verdict.is_accepted());
        assert!(widened.is_empty());
    }

    #[test]
    fn test_widening_survives_rejection() {
        let mut graph = graph();
        let ontology = Ontology::new();
        let mut widened = Vec::new();

        // Range widened to Document, domain (Person) fails on a place
        let verdict = validate_and_repair(
            &mut graph,
            &ontology,
            "elysee",
            Relation::Author,
            "elysee",
            &mut widened,
        );
        assert!(!verdict.is_accepted());
        assert!(graph.has_class("elysee", OntologyClass::Document));
    }

    #[test]
    fn test_teaches_accepts_organization() {
        let mut graph = graph();
        graph.upsert_entity("inria", OntologyClass::Organization, "Inria");
        let ontology = Ontology::new();
        let mut widened = Vec::new();

        let verdict = validate_and_repair(
            &mut graph,
            &ontology,
            "macron",
            Relation::Teaches,
            "inria",
            &mut widened,
        );
        assert!(verdict.is_accepted());
        assert!(widened.is_empty());
    }

    #[test]
    fn test_teaches_subject_is_a_pure_check() {
        let mut graph = graph();
        let ontology = Ontology::new();
        let mut widened = Vec::new();

        assert!(validate_and_repair(
            &mut graph,
            &ontology,
            "hugo",
            Relation::TeachesSubject,
            "livre",
            &mut widened,
        )
        .is_accepted());

        assert!(!validate_and_repair(
            &mut graph,
            &ontology,
            "hugo",
            Relation::TeachesSubject,
            "elysee",
            &mut widened,
        )
        .is_accepted());
        assert!(!graph.has_class("elysee", OntologyClass::Document));
    }

    #[test]
    fn test_related_to_always_accepted() {
        let mut graph = graph();
        let ontology = Ontology::new();
        let mut widened = Vec::new();
        assert!(validate_and_repair(
            &mut graph,
            &ontology,
            "livre",
            Relation::RelatedTo,
            "macron",
            &mut widened,
        )
        .is_accepted());
    }
}
