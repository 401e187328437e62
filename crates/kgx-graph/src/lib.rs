//! KGX Graph - RDF materialization and export
//!
//! Turns the ontology (T-Box) and an extracted knowledge graph (A-Box plus
//! reified statements) into a set of RDF triples, and moves that set in
//! and out of the two persisted formats:
//! - Turtle (human-readable)
//! - RDF/XML
//!
//! Also renders the A-Box as a Graphviz graph.

pub mod export;
pub mod materialize;
pub mod rdf;
pub mod rdfxml;
pub mod render;
pub mod stats;
pub mod turtle;

pub use export::{clean_outputs, export_all, ExportedFiles};
pub use materialize::{materialize, materialize_tbox};
pub use rdf::{Literal, RdfGraph, RdfTriple, Term};
pub use render::{render_dot, render_png};
pub use stats::GraphStats;

use kgx_core::KgError;
use thiserror::Error;

/// Errors raised while reading, writing or rendering RDF
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Turtle error: {0}")]
    Turtle(#[from] rio_turtle::TurtleError),

    #[error("RDF/XML error: {0}")]
    RdfXml(#[from] rio_xml::RdfXmlError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("Unsupported RDF term: {0}")]
    Unsupported(String),

    #[error("Unknown export format: {0}")]
    UnknownFormat(String),

    #[error("Rendering failed: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;

impl From<GraphError> for KgError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::Io(e) => KgError::Io(e),
            other => KgError::Serialization(other.to_string()),
        }
    }
}

/// Persisted serialization formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    Turtle,
    RdfXml,
}

impl RdfFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &std::path::Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "ttl" | "turtle" => Ok(Self::Turtle),
            "xml" | "rdf" | "owl" => Ok(Self::RdfXml),
            _ => Err(GraphError::UnknownFormat(path.display().to_string())),
        }
    }

    pub fn serialize(&self, graph: &RdfGraph) -> Result<String> {
        match self {
            Self::Turtle => turtle::to_turtle(graph),
            Self::RdfXml => rdfxml::to_rdfxml(graph),
        }
    }

    pub fn parse(&self, content: &str) -> Result<RdfGraph> {
        match self {
            Self::Turtle => turtle::parse_turtle(content),
            Self::RdfXml => rdfxml::parse_rdfxml(content),
        }
    }
}
