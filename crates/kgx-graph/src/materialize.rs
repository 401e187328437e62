//! Triple materialization
//!
//! Produces the RDF view of a run: the T-Box declared by the [`Ontology`],
//! the entities and assertions of the [`KnowledgeGraph`], and one
//! `rdf:Statement` node per reified statement.

use kgx_core::ontology::ns;
use kgx_core::{KnowledgeGraph, Ontology};

use crate::rdf::{rdf_type, Literal, RdfGraph, RdfTriple, Term};

fn rdf(local: &str) -> String {
    format!("{}{}", ns::RDF, local)
}

fn rdfs(local: &str) -> String {
    format!("{}{}", ns::RDFS, local)
}

fn owl(local: &str) -> String {
    format!("{}{}", ns::OWL, local)
}

// ============================================================================
// T-Box
// ============================================================================

/// Schema triples only
pub fn materialize_tbox(ontology: &Ontology) -> RdfGraph {
    let mut graph = RdfGraph::new();
    let rdf_type = rdf_type();
    let label = rdfs("label");
    let comment = rdfs("comment");
    let resource = rdfs("Resource");

    for class in ontology.classes() {
        let iri = class.iri();
        graph.add_iri(&iri, &rdf_type, &owl("Class"));
        graph.add_literal(&iri, &label, Literal::fr(class.label()));
        graph.add_literal(&iri, &comment, Literal::fr(class.comment()));
        if let Some(parent) = class.parent() {
            graph.add_iri(&iri, &rdfs("subClassOf"), &parent.iri());
        }
    }

    for (i, restriction) in ontology.restrictions().iter().enumerate() {
        let node = Term::Blank(format!("r{i}"));
        let on_property = format!("{}{}", ns::EX, restriction.on_property);

        graph.insert(RdfTriple::new(node.clone(), &rdf_type, Term::iri(owl("Restriction"))));
        graph.insert(RdfTriple::new(node.clone(), owl("onProperty"), Term::iri(on_property)));
        graph.insert(RdfTriple::new(
            node.clone(),
            owl("someValuesFrom"),
            Term::iri(restriction.some_values_from.iri()),
        ));
        graph.insert(RdfTriple::new(
            Term::iri(restriction.class.iri()),
            rdfs("subClassOf"),
            node,
        ));
    }

    for property in ontology.properties() {
        let iri = property.iri();
        graph.add_iri(&iri, &rdf_type, &owl("ObjectProperty"));
        graph.add_literal(&iri, &label, Literal::fr(property.label));
        graph.add_literal(&iri, &comment, Literal::fr(property.comment));

        let domain = property.domain.map(|c| c.iri()).unwrap_or_else(|| resource.clone());
        let range = property.range.map(|c| c.iri()).unwrap_or_else(|| resource.clone());
        graph.add_iri(&iri, &rdfs("domain"), &domain);
        graph.add_iri(&iri, &rdfs("range"), &range);
    }

    for property in ontology.datatype_properties() {
        graph.add_iri(&property.iri, &rdf_type, &owl("DatatypeProperty"));
        graph.add_literal(&property.iri, &label, Literal::fr(property.label));
        graph.add_literal(&property.iri, &comment, Literal::fr(property.comment));
        graph.add_iri(&property.iri, &rdfs("domain"), &property.domain.iri());
        graph.add_iri(&property.iri, &rdfs("range"), &property.range.iri());
    }

    graph
}

// ============================================================================
// A-Box and reification
// ============================================================================

/// Full graph: T-Box, entities, assertions and reified statements
pub fn materialize(ontology: &Ontology, kg: &KnowledgeGraph) -> RdfGraph {
    let mut graph = materialize_tbox(ontology);
    let rdf_type = rdf_type();
    let label = rdfs("label");
    let name = format!("{}name", ns::FOAF);

    for entity in kg.entities() {
        let iri = entity.iri();
        for class in &entity.classes {
            graph.add_iri(&iri, &rdf_type, &class.iri());
        }
        graph.add_literal(&iri, &label, Literal::fr(&entity.label));
        graph.add_literal(&iri, &name, Literal::fr(&entity.label));
    }

    for assertion in kg.assertions() {
        graph.add_iri(
            &kgx_core::model::entity_iri(&assertion.subject),
            &assertion.relation.iri(),
            &kgx_core::model::entity_iri(&assertion.object),
        );
    }

    let source = format!("{}source", ns::DC);
    for statement in kg.statements() {
        let iri = statement.iri();
        let assertion = &statement.assertion;
        graph.add_iri(&iri, &rdf_type, &rdf("Statement"));
        graph.add_iri(
            &iri,
            &rdf("subject"),
            &kgx_core::model::entity_iri(&assertion.subject),
        );
        graph.add_iri(&iri, &rdf("predicate"), &assertion.relation.iri());
        graph.add_iri(
            &iri,
            &rdf("object"),
            &kgx_core::model::entity_iri(&assertion.object),
        );
        graph.add_literal(&iri, &source, Literal::xsd_string(&statement.source));
    }

    tracing::debug!(
        "Materialized {} triple(s) from {} entit(y/ies)",
        graph.len(),
        kg.entities().len()
    );
    graph
}
