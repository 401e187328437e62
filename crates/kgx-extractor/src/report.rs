//! Extraction report
//!
//! Structured account of one pipeline run: what was recognized, what was
//! skipped and why, which rule decided each relation, and every adaptive
//! typing event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::relation::DecisionSource;
pub use crate::validate::Widening;
use kgx_core::{EntityMention, Relation, RelationAssertion};

/// An entity the instantiator could not map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedEntity {
    pub mention: EntityMention,
    pub reason: String,
}

/// A relation written to the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedRelation {
    pub assertion: RelationAssertion,
    pub decided_by: DecisionSource,
}

/// A relation discarded by constraint validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedRelation {
    pub subject: String,
    pub relation: Relation,
    pub object: String,
    pub decided_by: DecisionSource,
    pub reason: String,
}

/// Report of one extraction run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub text: String,
    /// Mentions as returned by the recognizer
    pub mentions: Vec<EntityMention>,
    /// Mentions after type refinement
    pub refined: Vec<EntityMention>,
    pub skipped_entities: Vec<SkippedEntity>,
    pub recorded: Vec<RecordedRelation>,
    pub rejected: Vec<RejectedRelation>,
    pub widenings: Vec<Widening>,
    /// Identifiers of the reified statements
    pub statements: Vec<String>,
    /// Pairs decided by the keyword fallback after a classifier failure
    pub classifier_failures: usize,
}

impl ExtractionReport {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            created_at: Utc::now(),
            text: text.into(),
            mentions: Vec::new(),
            refined: Vec::new(),
            skipped_entities: Vec::new(),
            recorded: Vec::new(),
            rejected: Vec::new(),
            widenings: Vec::new(),
            statements: Vec::new(),
            classifier_failures: 0,
        }
    }

    /// Recorded assertions using `relation`
    pub fn recorded_with(&self, relation: Relation) -> impl Iterator<Item = &RelationAssertion> {
        self.recorded
            .iter()
            .map(|r| &r.assertion)
            .filter(move |a| a.relation == relation)
    }

    /// One-line summary for logs
    pub fn summary(&self) -> String {
        format!(
            "{} mention(s), {} skipped, {} relation(s) recorded, {} rejected, {} widening(s), {} statement(s)",
            self.refined.len(),
            self.skipped_entities.len(),
            self.recorded.len(),
            self.rejected.len(),
            self.widenings.len(),
            self.statements.len()
        )
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serializes() {
        let mut report = ExtractionReport::new("Victor Hugo a écrit Les Misérables.");
        report.recorded.push(RecordedRelation {
            assertion: RelationAssertion::new("victor_hugo", Relation::Author, "les_miserables"),
            decided_by: DecisionSource::Fallback,
        });

        let json = report.to_json().unwrap();
        assert!(json.contains("\"run_id\""));
        assert!(json.contains("les_miserables"));
        assert_eq!(report.recorded_with(Relation::Author).count(), 1);
        assert!(report.summary().contains("1 relation(s) recorded"));
    }
}
