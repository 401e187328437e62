//! Owned RDF triple model
//!
//! A graph is a set of triples; insertion order is irrelevant and
//! duplicates collapse.

use std::collections::{BTreeMap, BTreeSet};

use kgx_core::ontology::ns;
use rio_api::model as rio;

use crate::{GraphError, Result};

/// Literal value
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Literal {
    Simple(String),
    LanguageTagged { value: String, language: String },
    Typed { value: String, datatype: String },
}

impl Literal {
    /// French language-tagged literal
    pub fn fr(value: impl Into<String>) -> Self {
        Self::LanguageTagged {
            value: value.into(),
            language: "fr".to_string(),
        }
    }

    /// `xsd:string` typed literal
    pub fn xsd_string(value: impl Into<String>) -> Self {
        Self::Typed {
            value: value.into(),
            datatype: format!("{}string", ns::XSD),
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::Simple(value)
            | Self::LanguageTagged { value, .. }
            | Self::Typed { value, .. } => value,
        }
    }
}

/// Subject or object of a triple
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    Iri(String),
    Blank(String),
    Literal(Literal),
}

impl Term {
    pub fn iri(iri: impl Into<String>) -> Self {
        Self::Iri(iri.into())
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Self::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Blank(_))
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Iri(iri) => write!(f, "{}", ns::compact(iri)),
            Self::Blank(id) => write!(f, "_:{id}"),
            Self::Literal(Literal::Simple(v)) => write!(f, "{v:?}"),
            Self::Literal(Literal::LanguageTagged { value, language }) => {
                write!(f, "{value:?}@{language}")
            }
            Self::Literal(Literal::Typed { value, datatype }) => {
                write!(f, "{value:?}^^{}", ns::compact(datatype))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RdfTriple {
    pub subject: Term,
    pub predicate: String,
    pub object: Term,
}

impl RdfTriple {
    pub fn new(subject: Term, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object,
        }
    }
}

/// Set of triples
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RdfGraph {
    triples: BTreeSet<RdfTriple>,
}

impl RdfGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the triple was already present
    pub fn insert(&mut self, triple: RdfTriple) -> bool {
        self.triples.insert(triple)
    }

    /// Shorthand for IRI subject and IRI object
    pub fn add_iri(&mut self, subject: &str, predicate: &str, object: &str) {
        self.insert(RdfTriple::new(
            Term::iri(subject),
            predicate,
            Term::iri(object),
        ));
    }

    pub fn add_literal(&mut self, subject: &str, predicate: &str, literal: Literal) {
        self.insert(RdfTriple::new(
            Term::iri(subject),
            predicate,
            Term::Literal(literal),
        ));
    }

    pub fn extend(&mut self, other: RdfGraph) {
        self.triples.extend(other.triples);
    }

    pub fn contains(&self, triple: &RdfTriple) -> bool {
        self.triples.contains(triple)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RdfTriple> {
        self.triples.iter()
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Subjects having `rdf:type <class_iri>`
    pub fn instances_of<'a>(&'a self, class_iri: &str) -> impl Iterator<Item = &'a Term> + 'a {
        let rdf_type = rdf_type();
        let class_iri = class_iri.to_string();
        self.triples.iter().filter_map(move |t| {
            (t.predicate == rdf_type && t.object.as_iri() == Some(class_iri.as_str()))
                .then_some(&t.subject)
        })
    }

    /// Rename blank nodes deterministically so that graphs equal up to
    /// blank-node relabeling compare equal.
    ///
    /// Each blank node is keyed by the triples it occurs in with every
    /// blank node masked, then renamed in key order.
    pub fn canonicalize(&self) -> RdfGraph {
        let mask = |term: &Term| match term {
            Term::Blank(_) => Term::Blank(String::new()),
            other => other.clone(),
        };

        let mut signatures: BTreeMap<&str, Vec<RdfTriple>> = BTreeMap::new();
        for triple in &self.triples {
            let masked = RdfTriple::new(mask(&triple.subject), &triple.predicate, mask(&triple.object));
            for term in [&triple.subject, &triple.object] {
                if let Term::Blank(id) = term {
                    signatures.entry(id.as_str()).or_default().push(masked.clone());
                }
            }
        }

        let mut ordered: Vec<(&str, Vec<RdfTriple>)> = signatures.into_iter().collect();
        for (_, signature) in ordered.iter_mut() {
            signature.sort();
        }
        ordered.sort_by(|a, b| a.1.cmp(&b.1));

        let names: BTreeMap<&str, String> = ordered
            .iter()
            .enumerate()
            .map(|(i, (id, _))| (*id, format!("b{i}")))
            .collect();

        let rename = |term: &Term| match term {
            Term::Blank(id) => Term::Blank(names.get(id.as_str()).cloned().unwrap_or_default()),
            other => other.clone(),
        };

        RdfGraph {
            triples: self
                .triples
                .iter()
                .map(|t| RdfTriple::new(rename(&t.subject), &t.predicate, rename(&t.object)))
                .collect(),
        }
    }
}

// ============================================================================
// rio bridge
// ============================================================================

impl RdfTriple {
    /// Borrowed view for the rio formatters
    pub(crate) fn as_rio(&self) -> Result<rio::Triple<'_>> {
        let subject = match &self.subject {
            Term::Iri(iri) => rio::Subject::NamedNode(rio::NamedNode { iri: iri.as_str() }),
            Term::Blank(id) => rio::Subject::BlankNode(rio::BlankNode { id: id.as_str() }),
            Term::Literal(literal) => {
                return Err(GraphError::Unsupported(format!(
                    "literal in subject position: {}",
                    literal.value()
                )))
            }
        };
        let object = match &self.object {
            Term::Iri(iri) => rio::Term::NamedNode(rio::NamedNode { iri: iri.as_str() }),
            Term::Blank(id) => rio::Term::BlankNode(rio::BlankNode { id: id.as_str() }),
            Term::Literal(Literal::Simple(value)) => {
                rio::Term::Literal(rio::Literal::Simple {
                    value: value.as_str(),
                })
            }
            Term::Literal(Literal::LanguageTagged { value, language }) => {
                rio::Term::Literal(rio::Literal::LanguageTaggedString {
                    value: value.as_str(),
                    language: language.as_str(),
                })
            }
            Term::Literal(Literal::Typed { value, datatype }) => {
                rio::Term::Literal(rio::Literal::Typed {
                    value: value.as_str(),
                    datatype: rio::NamedNode {
                        iri: datatype.as_str(),
                    },
                })
            }
        };
        Ok(rio::Triple {
            subject,
            predicate: rio::NamedNode {
                iri: self.predicate.as_str(),
            },
            object,
        })
    }

    /// Owned copy of a parsed triple
    pub(crate) fn from_rio(triple: rio::Triple<'_>) -> Result<Self> {
        let subject = match triple.subject {
            rio::Subject::NamedNode(node) => Term::Iri(node.iri.to_string()),
            rio::Subject::BlankNode(node) => Term::Blank(node.id.to_string()),
            other => return Err(GraphError::Unsupported(other.to_string())),
        };
        let object = match triple.object {
            rio::Term::NamedNode(node) => Term::Iri(node.iri.to_string()),
            rio::Term::BlankNode(node) => Term::Blank(node.id.to_string()),
            rio::Term::Literal(rio::Literal::Simple { value }) => {
                Term::Literal(Literal::Simple(value.to_string()))
            }
            rio::Term::Literal(rio::Literal::LanguageTaggedString { value, language }) => {
                Term::Literal(Literal::LanguageTagged {
                    value: value.to_string(),
                    language: language.to_lowercase(),
                })
            }
            rio::Term::Literal(rio::Literal::Typed { value, datatype }) => {
                Term::Literal(Literal::Typed {
                    value: value.to_string(),
                    datatype: datatype.iri.to_string(),
                })
            }
            other => return Err(GraphError::Unsupported(other.to_string())),
        };
        Ok(Self::new(subject, triple.predicate.iri, object))
    }
}

impl FromIterator<RdfTriple> for RdfGraph {
    fn from_iter<I: IntoIterator<Item = RdfTriple>>(iter: I) -> Self {
        Self {
            triples: iter.into_iter().collect(),
        }
    }
}

/// `rdf:type` IRI
pub fn rdf_type() -> String {
    format!("{}type", ns::RDF)
}
