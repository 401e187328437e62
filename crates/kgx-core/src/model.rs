//! A-Box data model
//!
//! Entity mentions produced by the recognizer, entity records owned by the
//! knowledge graph, relation assertions between records, and reified
//! statements carrying provenance.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ontology::{ns, OntologyClass, Relation};

// ============================================================================
// Entity mentions
// ============================================================================

/// Coarse entity label attached to a mention
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityLabel {
    Person,
    Location,
    Organization,
    Misc,
    Topic,
    Document,
    /// Label outside the known vocabulary, kept verbatim
    Other(String),
}

impl EntityLabel {
    /// Parse a recognizer label code (PER, LOC, ORG, MISC, TOPIC, DOC)
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "PER" | "PERSON" => Self::Person,
            "LOC" | "LOCATION" | "GPE" => Self::Location,
            "ORG" | "ORGANIZATION" => Self::Organization,
            "MISC" => Self::Misc,
            "TOPIC" => Self::Topic,
            "DOC" | "DOCUMENT" => Self::Document,
            _ => Self::Other(code.to_string()),
        }
    }

    /// Short code as emitted by the recognizer
    pub fn code(&self) -> &str {
        match self {
            Self::Person => "PER",
            Self::Location => "LOC",
            Self::Organization => "ORG",
            Self::Misc => "MISC",
            Self::Topic => "TOPIC",
            Self::Document => "DOC",
            Self::Other(code) => code,
        }
    }
}

impl std::fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A (surface text, coarse label) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityMention {
    pub text: String,
    pub label: EntityLabel,
}

impl EntityMention {
    pub fn new(text: impl Into<String>, label: EntityLabel) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }

    /// Return the mention with a replaced label
    pub fn relabel(mut self, label: EntityLabel) -> Self {
        self.label = label;
        self
    }
}

// ============================================================================
// Entity records
// ============================================================================

/// An instance in the knowledge graph
///
/// The class set only grows: adaptive typing appends classes, nothing
/// removes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Identifier fragment derived from the normalized surface text
    pub id: String,

    /// Ontology classes held by this entity
    pub classes: BTreeSet<OntologyClass>,

    /// Human-readable label (the first surface text seen)
    pub label: String,
}

impl EntityRecord {
    pub fn new(id: impl Into<String>, class: OntologyClass, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            classes: BTreeSet::from([class]),
            label: label.into(),
        }
    }

    pub fn has_class(&self, class: OntologyClass) -> bool {
        self.classes.contains(&class)
    }

    /// Full instance IRI
    pub fn iri(&self) -> String {
        entity_iri(&self.id)
    }
}

/// Instance IRI for an identifier fragment
pub fn entity_iri(id: &str) -> String {
    format!("{}{}", ns::DATA, id)
}

// ============================================================================
// Relation assertions
// ============================================================================

/// An ordered (subject, predicate, object) triple between two records
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelationAssertion {
    pub subject: String,
    pub relation: Relation,
    pub object: String,
}

impl RelationAssertion {
    pub fn new(subject: impl Into<String>, relation: Relation, object: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            relation,
            object: object.into(),
        }
    }
}

impl std::fmt::Display for RelationAssertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} --[{}]--> {}", self.subject, self.relation, self.object)
    }
}

// ============================================================================
// Reified statements
// ============================================================================

/// Metadata record wrapping one relation assertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReifiedStatement {
    /// Identifier fragment (hash of the wrapped triple)
    pub id: String,

    /// The wrapped assertion
    pub assertion: RelationAssertion,

    /// Provenance (source identifier)
    pub source: String,
}

impl ReifiedStatement {
    pub fn iri(&self) -> String {
        entity_iri(&self.id)
    }
}
