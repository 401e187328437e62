//! RDF/XML serialization

use std::io::BufReader;

use rio_api::formatter::TriplesFormatter;
use rio_api::parser::TriplesParser;
use rio_xml::{RdfXmlFormatter, RdfXmlParser};

use crate::rdf::{RdfGraph, RdfTriple};
use crate::{GraphError, Result};

/// Serialize the graph as an RDF/XML document
pub fn to_rdfxml(graph: &RdfGraph) -> Result<String> {
    let mut formatter = RdfXmlFormatter::new(Vec::new())?;
    for triple in graph.iter() {
        formatter.format(&triple.as_rio()?)?;
    }
    let bytes = formatter.finish()?;
    String::from_utf8(bytes).map_err(|e| GraphError::Unsupported(e.to_string()))
}

/// Parse an RDF/XML document into a triple set
pub fn parse_rdfxml(content: &str) -> Result<RdfGraph> {
    let mut graph = RdfGraph::new();
    let mut parser = RdfXmlParser::new(BufReader::new(content.as_bytes()), None);
    parser.parse_all(&mut |triple| -> Result<()> {
        graph.insert(RdfTriple::from_rio(triple)?);
        Ok(())
    })?;
    Ok(graph)
}
