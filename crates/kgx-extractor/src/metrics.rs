//! Quality Metrics module
//!
//! Precision, recall and F1 of extracted relations against a gold list,
//! plus the scenario file format used for offline evaluation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::normalize::normalize_fragment;
use kgx_core::{KgError, KnowledgeGraph, Result};

// ============================================================================
// Relation Metrics
// ============================================================================

/// Metrics for relation extraction evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationMetrics {
    /// True positives (correctly identified relations)
    pub true_positives: usize,
    /// False positives (incorrectly identified relations)
    pub false_positives: usize,
    /// False negatives (missed relations)
    pub false_negatives: usize,
}

impl RelationMetrics {
    /// Calculate precision
    pub fn precision(&self) -> f32 {
        if self.true_positives + self.false_positives == 0 {
            0.0
        } else {
            self.true_positives as f32 / (self.true_positives + self.false_positives) as f32
        }
    }

    /// Calculate recall
    pub fn recall(&self) -> f32 {
        if self.true_positives + self.false_negatives == 0 {
            0.0
        } else {
            self.true_positives as f32 / (self.true_positives + self.false_negatives) as f32
        }
    }

    /// Calculate F1 score
    pub fn f1_score(&self) -> f32 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    /// Accumulate another evaluation
    pub fn add(&mut self, other: &RelationMetrics) {
        self.true_positives += other.true_positives;
        self.false_positives += other.false_positives;
        self.false_negatives += other.false_negatives;
    }

    /// One-line summary
    pub fn summary(&self) -> String {
        format!(
            "P {:.1}% | R {:.1}% | F1 {:.1}% (TP {} FP {} FN {})",
            self.precision() * 100.0,
            self.recall() * 100.0,
            self.f1_score() * 100.0,
            self.true_positives,
            self.false_positives,
            self.false_negatives
        )
    }
}

// ============================================================================
// Gold Standard
// ============================================================================

/// A gold relation, by surface texts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GoldRelation {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl GoldRelation {
    /// Comparison key: entity identifiers and predicate name
    fn key(&self) -> (String, String, String) {
        (
            normalize_fragment(&self.subject),
            self.predicate.trim().to_string(),
            normalize_fragment(&self.object),
        )
    }
}

/// Compare the graph's assertions with a gold list
pub fn evaluate_relations(graph: &KnowledgeGraph, gold: &[GoldRelation]) -> RelationMetrics {
    let predicted: HashSet<(String, String, String)> = graph
        .assertions()
        .iter()
        .map(|a| {
            (
                a.subject.clone(),
                a.relation.as_str().to_string(),
                a.object.clone(),
            )
        })
        .collect();
    let gold: HashSet<(String, String, String)> = gold.iter().map(GoldRelation::key).collect();

    let true_positives = predicted.intersection(&gold).count();
    RelationMetrics {
        true_positives,
        false_positives: predicted.len() - true_positives,
        false_negatives: gold.len() - true_positives,
    }
}

// ============================================================================
// Scenarios
// ============================================================================

/// A recognized mention in a scenario file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioMention {
    pub text: String,
    pub label: String,
}

/// One offline evaluation case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalScenario {
    pub name: String,
    pub text: String,
    /// Recognizer output to use instead of the gazetteer
    #[serde(default)]
    pub mentions: Vec<ScenarioMention>,
    /// Type classifier answers (entity text, type name)
    #[serde(default)]
    pub types: Vec<(String, String)>,
    #[serde(default)]
    pub expected: Vec<GoldRelation>,
}

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    #[serde(default)]
    scenario: Vec<EvalScenario>,
}

/// Parse a TOML list of `[[scenario]]` tables
pub fn load_scenarios(content: &str) -> Result<Vec<EvalScenario>> {
    let file: ScenarioFile = toml::from_str(content)
        .map_err(|e| KgError::Serialization(format!("invalid scenario file: {e}")))?;
    Ok(file.scenario)
}
