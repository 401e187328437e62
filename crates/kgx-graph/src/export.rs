//! File exports
//!
//! Writes the Turtle, RDF/XML and DOT files of one run into the output
//! directory, and the PNG image when Graphviz is installed.

use std::path::PathBuf;

use kgx_core::OutputConfig;

use crate::rdf::RdfGraph;
use crate::render::{render_dot, render_png};
use crate::{rdfxml, turtle, Result};

/// Paths written by [`export_all`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    pub turtle: PathBuf,
    pub rdfxml: PathBuf,
    pub dot: PathBuf,
    /// `None` when no image could be rendered
    pub image: Option<PathBuf>,
}

/// Remove exports left by a previous run. Returns the removed paths.
pub fn clean_outputs(config: &OutputConfig) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for path in [
        config.turtle_path(),
        config.rdfxml_path(),
        config.dot_path(),
        config.image_path(),
    ] {
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("Removed previous export {}", path.display());
                removed.push(path);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(removed)
}

/// Write every export of the graph
pub fn export_all(graph: &RdfGraph, config: &OutputConfig) -> Result<ExportedFiles> {
    std::fs::create_dir_all(&config.directory)?;

    let turtle_path = config.turtle_path();
    std::fs::write(&turtle_path, turtle::to_turtle(graph)?)?;
    tracing::info!("Turtle written to {}", turtle_path.display());

    let rdfxml_path = config.rdfxml_path();
    std::fs::write(&rdfxml_path, rdfxml::to_rdfxml(graph)?)?;
    tracing::info!("RDF/XML written to {}", rdfxml_path.display());

    let dot_path = config.dot_path();
    std::fs::write(&dot_path, render_dot(graph))?;

    let image_path = config.image_path();
    let image = match render_png(&dot_path, &image_path) {
        Ok(true) => Some(image_path),
        Ok(false) => None,
        Err(e) => {
            tracing::warn!("Image rendering failed: {}", e);
            None
        }
    };

    Ok(ExportedFiles {
        turtle: turtle_path,
        rdfxml: rdfxml_path,
        dot: dot_path,
        image,
    })
}
