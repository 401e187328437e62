//! Turtle serialization
//!
//! The writer declares the ontology namespaces and groups triples by
//! subject; term escaping is delegated to the rio model types.

use std::fmt::Write;
use std::io::BufReader;

use kgx_core::ontology::ns;
use rio_api::model as rio;
use rio_api::parser::TriplesParser;
use rio_turtle::TurtleParser;

use crate::rdf::{rdf_type, RdfGraph, RdfTriple, Term};
use crate::Result;

/// `prefix:local` for IRIs under a known namespace whose local part is a
/// plain name
fn compact_iri(iri: &str) -> Option<String> {
    ns::PREFIXES.iter().find_map(|(prefix, base)| {
        let local = iri.strip_prefix(base)?;
        let plain = !local.is_empty()
            && local
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        plain.then(|| format!("{prefix}:{local}"))
    })
}

fn write_iri(iri: &str) -> String {
    compact_iri(iri).unwrap_or_else(|| rio::NamedNode { iri }.to_string())
}

fn write_subject(subject: rio::Subject<'_>) -> String {
    match subject {
        rio::Subject::NamedNode(node) => write_iri(node.iri),
        other => other.to_string(),
    }
}

fn write_predicate(predicate: &str) -> String {
    if predicate == rdf_type() {
        "a".to_string()
    } else {
        write_iri(predicate)
    }
}

fn write_object(object: rio::Term<'_>) -> String {
    match object {
        rio::Term::NamedNode(node) => write_iri(node.iri),
        rio::Term::Literal(rio::Literal::Typed { value, datatype }) => format!(
            "{}^^{}",
            rio::Literal::Simple { value },
            write_iri(datatype.iri)
        ),
        other => other.to_string(),
    }
}

/// Serialize the graph as a Turtle document
pub fn to_turtle(graph: &RdfGraph) -> Result<String> {
    let mut out = String::new();
    for (prefix, base) in ns::PREFIXES {
        writeln!(out, "@prefix {prefix}: <{base}> .")?;
    }

    let mut previous: Option<(&Term, &str)> = None;
    for triple in graph.iter() {
        let terms = triple.as_rio()?;
        match previous {
            Some((subject, predicate)) if *subject == triple.subject => {
                if predicate == triple.predicate {
                    out.push_str(" , ");
                } else {
                    write!(out, " ;\n    {} ", write_predicate(&triple.predicate))?;
                }
            }
            _ => {
                if previous.is_some() {
                    out.push_str(" .\n");
                }
                write!(
                    out,
                    "\n{} {} ",
                    write_subject(terms.subject),
                    write_predicate(&triple.predicate)
                )?;
            }
        }
        out.push_str(&write_object(terms.object));
        previous = Some((&triple.subject, triple.predicate.as_str()));
    }
    if previous.is_some() {
        out.push_str(" .\n");
    }

    Ok(out)
}

/// Parse a Turtle document into a triple set
pub fn parse_turtle(content: &str) -> Result<RdfGraph> {
    let mut graph = RdfGraph::new();
    let mut parser = TurtleParser::new(BufReader::new(content.as_bytes()), None);
    parser.parse_all(&mut |triple| -> Result<()> {
        graph.insert(RdfTriple::from_rio(triple)?);
        Ok(())
    })?;
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::Literal;
    use crate::GraphError;

    #[test]
    fn test_parse_prefixed_document() {
        let doc = r#"
@prefix ex: <http://example.org/master2/ontology#> .
@prefix data: <http://example.org/master2/data#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

data:paris a <http://schema.org/Place> ;
    rdfs:label "Paris"@fr .
data:elysee ex:locatedIn data:paris .
"#;
        let graph = parse_turtle(doc).unwrap();
        assert_eq!(graph.len(), 3);
        assert!(graph.contains(&RdfTriple::new(
            Term::iri("http://example.org/master2/data#paris"),
            "http://www.w3.org/2000/01/rdf-schema#label",
            Term::Literal(Literal::fr("Paris")),
        )));
    }

    #[test]
    fn test_written_document_uses_prefixes() {
        let mut graph = RdfGraph::new();
        graph.add_literal(
            "http://example.org/master2/data#victor_hugo",
            "http://xmlns.com/foaf/0.1/name",
            Literal::fr("Victor Hugo"),
        );
        graph.add_iri(
            "http://example.org/master2/data#victor_hugo",
            &rdf_type(),
            "http://xmlns.com/foaf/0.1/Person",
        );
        let doc = to_turtle(&graph).unwrap();

        for prefix in ["ex", "data", "foaf", "dc", "rdfs", "owl"] {
            assert!(doc.contains(&format!("@prefix {prefix}: <")), "missing {prefix}");
        }
        assert!(doc.contains("data:victor_hugo a foaf:Person ;"));
        assert!(doc.contains("foaf:name \"Victor Hugo\"@fr ."));
        assert!(!doc.contains("<http://example.org/master2/data#victor_hugo>"));
        assert_eq!(parse_turtle(&doc).unwrap(), graph);
    }

    #[test]
    fn test_non_plain_names_stay_full_iris() {
        let mut graph = RdfGraph::new();
        graph.add_iri(
            "http://example.org/master2/data#jean-luc",
            "http://example.org/master2/ontology#collaboratesWith",
            "http://example.org/master2/data#marie",
        );
        graph.add_iri(
            "http://example.org/master2/data#jean-luc",
            "http://example.org/master2/ontology#collaboratesWith",
            "http://example.org/master2/data#paul",
        );
        graph.add_literal(
            "http://example.org/master2/data#jean-luc",
            "http://purl.org/dc/elements/1.1/source",
            Literal::xsd_string("texte_exemple.txt"),
        );
        let doc = to_turtle(&graph).unwrap();

        assert!(doc.contains("<http://example.org/master2/data#jean-luc>"));
        assert!(doc.contains("ex:collaboratesWith data:marie , data:paul"));
        assert!(doc.contains("\"texte_exemple.txt\"^^xsd:string"));
        assert_eq!(parse_turtle(&doc).unwrap(), graph);
    }

    #[test]
    fn test_syntax_error() {
        let err = parse_turtle("<http://a> <http://b> .").unwrap_err();
        assert!(matches!(err, GraphError::Turtle(_)));
    }
}
