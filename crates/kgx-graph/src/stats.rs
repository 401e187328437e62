//! Graph statistics

use serde::Serialize;

use kgx_core::ontology::ns;
use kgx_core::OntologyClass;

use crate::rdf::{RdfGraph, Term};

/// Counts over a materialized graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub classes: usize,
    pub object_properties: usize,
    pub datatype_properties: usize,
    pub restrictions: usize,
    /// Subjects typed with one of the ontology classes
    pub instances: usize,
    pub statements: usize,
    pub triples: usize,
}

impl GraphStats {
    pub fn compute(graph: &RdfGraph) -> Self {
        let owl = |local: &str| format!("{}{}", ns::OWL, local);
        let count = |class_iri: String| graph.instances_of(&class_iri).count();

        let mut instances: Vec<&Term> = OntologyClass::ALL
            .iter()
            .flat_map(|class| graph.instances_of(&class.iri()))
            .collect();
        instances.sort();
        instances.dedup();

        Self {
            classes: count(owl("Class")),
            object_properties: count(owl("ObjectProperty")),
            datatype_properties: count(owl("DatatypeProperty")),
            restrictions: count(owl("Restriction")),
            instances: instances.len(),
            statements: count(format!("{}Statement", ns::RDF)),
            triples: graph.len(),
        }
    }
}

impl std::fmt::Display for GraphStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Classes:              {}", self.classes)?;
        writeln!(f, "Object properties:    {}", self.object_properties)?;
        writeln!(f, "Datatype properties:  {}", self.datatype_properties)?;
        writeln!(f, "Restrictions:         {}", self.restrictions)?;
        writeln!(f, "Instances:            {}", self.instances)?;
        writeln!(f, "Reified statements:   {}", self.statements)?;
        write!(f, "Total triples:        {}", self.triples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materialize::{materialize, materialize_tbox};
    use kgx_core::{KnowledgeGraph, Ontology, Relation, RelationAssertion};

    #[test]
    fn test_tbox_counts() {
        let stats = GraphStats::compute(&materialize_tbox(&Ontology::new()));
        assert_eq!(stats.classes, 5);
        assert_eq!(stats.object_properties, 10);
        assert_eq!(stats.datatype_properties, 3);
        assert_eq!(stats.restrictions, 1);
        assert_eq!(stats.instances, 0);
        assert_eq!(stats.statements, 0);
    }

    #[test]
    fn test_multi_class_instance_counted_once() {
        let mut kg = KnowledgeGraph::new();
        kg.upsert_entity("victor_hugo", OntologyClass::Person, "Victor Hugo");
        kg.upsert_entity("les_miserables", OntologyClass::Document, "Les Misérables");
        kg.add_class("les_miserables", OntologyClass::ValidatedCourse);
        kg.record_assertion(RelationAssertion::new(
            "victor_hugo",
            Relation::Author,
            "les_miserables",
        ));

        let graph = materialize(&Ontology::new(), &kg);
        let stats = GraphStats::compute(&graph);
        assert_eq!(stats.instances, 2);
        assert_eq!(stats.triples, graph.len());
        assert!(stats.to_string().contains("Instances:            2"));
    }
}
