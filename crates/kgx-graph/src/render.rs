//! Graphviz rendering of the A-Box
//!
//! Only entities and the object-property edges between them are drawn.
//! Schema triples, reified statements and literals are left out.

use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use kgx_core::ontology::ns;
use kgx_core::OntologyClass;

use crate::rdf::{rdf_type, RdfGraph, Term};
use crate::{GraphError, Result};

const MAX_LABEL_CHARS: usize = 20;
const DEFAULT_COLOR: &str = "#95E1D3";

/// Fill color of a node, by class
pub fn class_color(class: OntologyClass) -> &'static str {
    match class {
        OntologyClass::Person => "#FF6B6B",
        OntologyClass::Place => "#4ECDC4",
        OntologyClass::Organization => "#45B7D1",
        OntologyClass::Document | OntologyClass::ValidatedCourse => "#FFA07A",
    }
}

/// A drawn entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderNode {
    pub iri: String,
    pub label: String,
    pub color: &'static str,
}

impl std::fmt::Display for RenderNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

fn truncate_label(label: &str) -> String {
    if label.chars().count() > MAX_LABEL_CHARS {
        let head: String = label.chars().take(MAX_LABEL_CHARS - 3).collect();
        format!("{head}...")
    } else {
        label.to_string()
    }
}

fn local_name(iri: &str) -> &str {
    iri.rsplit(['#', '/']).next().unwrap_or(iri)
}

fn is_entity(iri: &str) -> bool {
    iri.strip_prefix(ns::DATA)
        .is_some_and(|local| !local.starts_with("statement_"))
}

/// Collect entities and relation edges into a directed graph
pub fn build_render_graph(graph: &RdfGraph) -> DiGraph<RenderNode, String> {
    let rdf_type = rdf_type();
    let rdfs_label = format!("{}label", ns::RDFS);

    let mut labels: HashMap<&str, &str> = HashMap::new();
    let mut classes: HashMap<&str, Vec<OntologyClass>> = HashMap::new();
    for triple in graph.iter() {
        let Some(subject) = triple.subject.as_iri().filter(|s| is_entity(s)) else {
            continue;
        };
        if triple.predicate == rdfs_label {
            if let Term::Literal(literal) = &triple.object {
                labels.entry(subject).or_insert(literal.value());
            }
        } else if triple.predicate == rdf_type {
            if let Some(class) = triple.object.as_iri().and_then(OntologyClass::from_iri) {
                classes.entry(subject).or_default().push(class);
            }
        }
    }

    let mut rendered: DiGraph<RenderNode, String> = DiGraph::new();
    let mut nodes: HashMap<String, NodeIndex> = HashMap::new();
    let mut node_for = |rendered: &mut DiGraph<RenderNode, String>, iri: &str| -> NodeIndex {
        if let Some(&idx) = nodes.get(iri) {
            return idx;
        }
        let color = classes
            .get(iri)
            .and_then(|held| {
                // Person, Place, Organization, Document in that order
                let mut held = held.clone();
                held.sort();
                held.first().copied()
            })
            .map(class_color)
            .unwrap_or(DEFAULT_COLOR);
        let label = labels.get(iri).copied().unwrap_or_else(|| local_name(iri));
        let idx = rendered.add_node(RenderNode {
            iri: iri.to_string(),
            label: truncate_label(label),
            color,
        });
        nodes.insert(iri.to_string(), idx);
        idx
    };

    // Typed entities first so isolated ones are drawn too
    let mut typed: Vec<&str> = classes.keys().copied().collect();
    typed.sort();
    for iri in typed {
        node_for(&mut rendered, iri);
    }

    for triple in graph.iter() {
        if !triple.predicate.starts_with(ns::EX) {
            continue;
        }
        let (Some(subject), Some(object)) = (triple.subject.as_iri(), triple.object.as_iri())
        else {
            continue;
        };
        if !is_entity(subject) || !is_entity(object) {
            continue;
        }
        let from = node_for(&mut rendered, subject);
        let to = node_for(&mut rendered, object);
        rendered.add_edge(from, to, local_name(&triple.predicate).to_string());
    }

    rendered
}

fn dot_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Graphviz DOT document for the A-Box
pub fn render_dot(graph: &RdfGraph) -> String {
    let rendered = build_render_graph(graph);
    let dot = Dot::with_attr_getters(
        &rendered,
        &[Config::NodeNoLabel, Config::EdgeNoLabel],
        &|_, edge| format!("label = \"{}\"", dot_escape(edge.weight())),
        &|_, (_, node)| {
            format!(
                "label = \"{}\", style = filled, fillcolor = \"{}\", shape = ellipse",
                dot_escape(&node.label),
                node.color
            )
        },
    );
    format!("{dot}")
}

/// Turn a DOT file into a PNG with the `dot` executable.
///
/// Returns `Ok(false)` when Graphviz is not installed.
pub fn render_png(dot_path: &Path, png_path: &Path) -> Result<bool> {
    let output = match Command::new("dot")
        .arg("-Tpng")
        .arg(dot_path)
        .arg("-o")
        .arg(png_path)
        .output()
    {
        Ok(output) => output,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("Graphviz `dot` not found; keeping {}", dot_path.display());
            return Ok(false);
        }
        Err(e) => return Err(e.into()),
    };

    if !output.status.success() {
        return Err(GraphError::Render(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }
    tracing::info!("Graph image written to {}", png_path.display());
    Ok(true)
}
