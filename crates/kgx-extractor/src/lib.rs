//! KGX Extractor - Knowledge extraction pipeline
//!
//! Turns one sentence into A-Box content:
//! recognition → type refinement → instantiation → relation extraction
//! → reification. External classifiers are optional capabilities with
//! deterministic fallbacks, so every stage also runs offline.

use kgx_core::{EntityMention, Result};

/// Trait for entity recognizers
///
/// Returns (surface text, coarse label) pairs in text order.
pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Result<Vec<EntityMention>>;
}

pub mod cascade;
pub mod instantiate;
pub mod metrics;
pub mod ner;
pub mod normalize;
pub mod pipeline;
pub mod refine;
pub mod reify;
pub mod relation;
pub mod report;
pub mod validate;

pub use cascade::CascadeRule;
pub use instantiate::{EntityInstantiator, InstantiatedEntity};
pub use metrics::{evaluate_relations, load_scenarios, EvalScenario, GoldRelation, RelationMetrics};
pub use ner::{GazetteerRecognizer, StaticRecognizer};
pub use normalize::normalize_fragment;
pub use pipeline::Pipeline;
pub use refine::{EntityTypeRefiner, FixedTypeClassifier, LlmTypeClassifier, TypeClassifier};
pub use reify::Reifier;
pub use relation::{
    DecisionSource, FixedRelationClassifier, LlmRelationClassifier, RelationClassifier,
    RelationEngine,
};
pub use report::ExtractionReport;
pub use validate::attempt_widen;
