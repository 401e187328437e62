//! KGX Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout the KGX system:
//! - Ontology schema (T-Box: classes, properties, domain/range constraints)
//! - Knowledge graph instances (A-Box: entity records, relation assertions,
//!   reified statements)
//! - Common error types
//! - The LLM capability trait used by the classifiers
//! - Configuration management

pub mod config;
pub mod graph;
pub mod model;
pub mod ontology;

pub use config::{
    AppConfig, ConfigError, ExtractionConfig, LlmConfig, LlmProvider, LoggingConfig,
    OutputConfig,
};
pub use graph::KnowledgeGraph;
pub use model::{EntityLabel, EntityMention, EntityRecord, RelationAssertion, ReifiedStatement};
pub use ontology::{Ontology, OntologyClass, PropertyDeclaration, Relation};

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for KGX operations
#[derive(Error, Debug)]
pub enum KgError {
    #[error("Recognizer model not found: {0}")]
    ModelNotFound(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("Invalid ontology: {0}")]
    InvalidOntology(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, KgError>;

// ============================================================================
// Traits
// ============================================================================

/// Trait for LLM clients
///
/// Implementations perform one blocking round-trip per call. Callers treat
/// every error as recoverable and fall back to deterministic heuristics.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a response for a single user prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate a response with a system instruction
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.generate(&format!("{system}\n\n{prompt}")).await
    }

    /// Model name for logging
    fn model(&self) -> &str;
}

// ============================================================================
// Tests
// ============================================================================
