//! In-memory knowledge graph (A-Box)
//!
//! A fresh graph is created for every run and passed by ownership through
//! the pipeline. Entities keep their insertion order, which fixes the
//! pair iteration order of relation extraction.

use std::collections::HashMap;

use serde::Serialize;

use crate::model::{EntityRecord, RelationAssertion, ReifiedStatement};
use crate::ontology::{OntologyClass, Relation};

/// Owned A-Box state of one extraction run
#[derive(Debug, Clone, Default, Serialize)]
pub struct KnowledgeGraph {
    entities: Vec<EntityRecord>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    assertions: Vec<RelationAssertion>,
    statements: Vec<ReifiedStatement>,
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity, or merge the class into an existing record with
    /// the same identifier (aliasing on identical normalized text).
    ///
    /// Returns `true` when a new record was created.
    pub fn upsert_entity(
        &mut self,
        id: impl Into<String>,
        class: OntologyClass,
        label: impl Into<String>,
    ) -> bool {
        let id = id.into();
        if let Some(&idx) = self.index.get(&id) {
            self.entities[idx].classes.insert(class);
            return false;
        }
        self.index.insert(id.clone(), self.entities.len());
        self.entities.push(EntityRecord::new(id, class, label));
        true
    }

    pub fn entity(&self, id: &str) -> Option<&EntityRecord> {
        self.index.get(id).map(|&idx| &self.entities[idx])
    }

    pub fn contains_entity(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Entities in insertion order
    pub fn entities(&self) -> &[EntityRecord] {
        &self.entities
    }

    pub fn has_class(&self, id: &str, class: OntologyClass) -> bool {
        self.entity(id).is_some_and(|e| e.has_class(class))
    }

    /// Add a class to an existing entity. Additive only.
    ///
    /// Returns `true` if the class was not held before.
    pub fn add_class(&mut self, id: &str, class: OntologyClass) -> bool {
        match self.index.get(id) {
            Some(&idx) => self.entities[idx].classes.insert(class),
            None => false,
        }
    }

    /// Record an assertion; identical triples are stored once.
    ///
    /// Returns `false` if the assertion was already present or references
    /// an unknown entity.
    pub fn record_assertion(&mut self, assertion: RelationAssertion) -> bool {
        if !self.contains_entity(&assertion.subject) || !self.contains_entity(&assertion.object) {
            return false;
        }
        if self.assertions.contains(&assertion) {
            return false;
        }
        self.assertions.push(assertion);
        true
    }

    /// Assertions in recording order
    pub fn assertions(&self) -> &[RelationAssertion] {
        &self.assertions
    }

    /// Assertions using the given relation
    pub fn assertions_with(&self, relation: Relation) -> impl Iterator<Item = &RelationAssertion> {
        self.assertions.iter().filter(move |a| a.relation == relation)
    }

    /// Store a reified statement; statements are keyed by identifier.
    ///
    /// Returns `false` if a statement with the same identifier exists.
    pub fn add_statement(&mut self, statement: ReifiedStatement) -> bool {
        if self.statements.iter().any(|s| s.id == statement.id) {
            return false;
        }
        self.statements.push(statement);
        true
    }

    pub fn statement(&self, id: &str) -> Option<&ReifiedStatement> {
        self.statements.iter().find(|s| s.id == id)
    }

    pub fn statements(&self) -> &[ReifiedStatement] {
        &self.statements
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
