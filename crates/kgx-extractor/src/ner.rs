//! Named Entity Recognition (NER) module
//!
//! The recognizer is consumed as a black box producing (text, label)
//! pairs. Two implementations are provided:
//! - Gazetteer: dictionary + regex matching driven by a model file
//! - Static: a fixed mention list, for tests and offline evaluation

use std::collections::HashSet;
use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use crate::EntityRecognizer;
use kgx_core::{EntityLabel, EntityMention, KgError, Result};

// ============================================================================
// Gazetteer model file
// ============================================================================

#[derive(Debug, Deserialize)]
struct GazetteerFile {
    #[serde(default, rename = "term")]
    terms: Vec<TermEntry>,
    #[serde(default, rename = "pattern")]
    patterns: Vec<PatternEntry>,
}

/// Dictionary entry for entity matching
#[derive(Debug, Clone, Deserialize)]
pub struct TermEntry {
    pub text: String,
    pub label: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct PatternEntry {
    regex: String,
    label: String,
}

/// A candidate span before overlap resolution
#[derive(Debug, Clone)]
struct Span {
    start: usize,
    end: usize,
    text: String,
    label: EntityLabel,
}

// ============================================================================
// Gazetteer recognizer
// ============================================================================

/// Dictionary and pattern based recognizer
pub struct GazetteerRecognizer {
    /// Dictionary surface forms, matched case-insensitively
    terms: Vec<(Regex, EntityLabel)>,
    /// Pattern rules (regex -> label)
    patterns: Vec<(Regex, EntityLabel)>,
}

impl GazetteerRecognizer {
    /// Create an empty recognizer
    pub fn new() -> Self {
        Self {
            terms: Vec::new(),
            patterns: Vec::new(),
        }
    }

    /// Load the recognizer model from a TOML gazetteer file.
    ///
    /// A missing or unreadable file is a setup failure.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| KgError::ModelNotFound(format!("{}: {e}", path.display())))?;
        Self::from_toml(&content)
            .map_err(|e| KgError::ModelNotFound(format!("{}: {e}", path.display())))
    }

    /// Parse a gazetteer document
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: GazetteerFile = toml::from_str(content)
            .map_err(|e| KgError::Validation(format!("invalid gazetteer: {e}")))?;

        let mut recognizer = Self::new();
        for entry in file.terms {
            recognizer.add_term(&entry.text, &entry.label, &entry.aliases);
        }
        for entry in file.patterns {
            recognizer.add_pattern(&entry.regex, &entry.label);
        }

        tracing::debug!(
            terms = recognizer.terms.len(),
            patterns = recognizer.patterns.len(),
            "Gazetteer loaded"
        );
        Ok(recognizer)
    }

    /// Add a dictionary term and its aliases
    pub fn add_term(&mut self, term: &str, label: &str, aliases: &[String]) {
        let label = EntityLabel::from_code(label);
        for surface in std::iter::once(term).chain(aliases.iter().map(String::as_str)) {
            if surface.is_empty() {
                continue;
            }
            match RegexBuilder::new(&regex::escape(surface))
                .case_insensitive(true)
                .build()
            {
                Ok(regex) => self.terms.push((regex, label.clone())),
                Err(e) => tracing::warn!("Skipping gazetteer term {surface:?}: {e}"),
            }
        }
    }

    /// Add a regex pattern; invalid patterns are skipped
    pub fn add_pattern(&mut self, pattern: &str, label: &str) {
        match Regex::new(pattern) {
            Ok(regex) => self.patterns.push((regex, EntityLabel::from_code(label))),
            Err(e) => tracing::warn!("Skipping invalid gazetteer pattern {pattern:?}: {e}"),
        }
    }

    /// Extract spans using dictionary lookup
    fn extract_by_dictionary(&self, text: &str) -> Vec<Span> {
        let mut spans = Vec::new();
        for (term, label) in &self.terms {
            for mat in term.find_iter(text) {
                if !is_word_boundary(text, mat.start(), mat.end()) {
                    continue;
                }
                spans.push(Span {
                    start: mat.start(),
                    end: mat.end(),
                    text: mat.as_str().to_string(),
                    label: label.clone(),
                });
            }
        }
        spans
    }

    /// Extract spans using pattern matching
    fn extract_by_patterns(&self, text: &str) -> Vec<Span> {
        let mut spans = Vec::new();
        for (regex, label) in &self.patterns {
            for mat in regex.find_iter(text) {
                spans.push(Span {
                    start: mat.start(),
                    end: mat.end(),
                    text: mat.as_str().to_string(),
                    label: label.clone(),
                });
            }
        }
        spans
    }
}

impl Default for GazetteerRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRecognizer for GazetteerRecognizer {
    fn recognize(&self, text: &str) -> Result<Vec<EntityMention>> {
        let mut spans = self.extract_by_dictionary(text);
        spans.extend(self.extract_by_patterns(text));
        Ok(resolve_overlaps(spans))
    }
}

/// Reject matches glued to surrounding letters ("paris" inside "parisien")
fn is_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

/// Keep the longest span at each position, drop overlaps, return mentions in
/// text order with repeated surface texts removed
fn resolve_overlaps(mut spans: Vec<Span>) -> Vec<EntityMention> {
    spans.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then((b.end - b.start).cmp(&(a.end - a.start)))
    });

    let mut covered_until = 0usize;
    let mut seen: HashSet<String> = HashSet::new();
    let mut mentions = Vec::new();

    for span in spans {
        if span.start < covered_until {
            continue;
        }
        covered_until = span.end;
        if seen.insert(span.text.clone()) {
            mentions.push(EntityMention::new(span.text, span.label));
        }
    }

    mentions
}

// ============================================================================
// Static recognizer
// ============================================================================

/// Recognizer returning a fixed mention list, whatever the text
#[derive(Debug, Clone, Default)]
pub struct StaticRecognizer {
    mentions: Vec<EntityMention>,
}

impl StaticRecognizer {
    pub fn new(mentions: Vec<EntityMention>) -> Self {
        Self { mentions }
    }

    /// Build from (text, label code) pairs
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|(text, label)| EntityMention::new(*text, EntityLabel::from_code(label)))
                .collect(),
        )
    }
}

impl EntityRecognizer for StaticRecognizer {
    fn recognize(&self, _text: &str) -> Result<Vec<EntityMention>> {
        Ok(self.mentions.clone())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const GAZETTEER: &str = r#"
[[term]]
text = "Emmanuel Macron"
label = "PER"
aliases = ["Macron"]

[[term]]
text = "Palais de l'Élysée"
label = "LOC"

[[term]]
text = "Paris"
label = "LOC"

[[term]]
text = "Université de Paris"
label = "ORG"

[[pattern]]
regex = "\\b[A-Z]{3,5}\\b"
label = "MISC"
"#;

    fn texts(mentions: &[EntityMention]) -> Vec<&str> {
        mentions.iter().map(|m| m.text.as_str()).collect()
    }

    #[test]
    fn test_dictionary_match_keeps_surface_and_order() {
        let ner = GazetteerRecognizer::from_toml(GAZETTEER).unwrap();
        let mentions = ner
            .recognize("Emmanuel Macron travaille au Palais de l'Élysée à Paris.")
            .unwrap();

        assert_eq!(
            texts(&mentions),
            vec!["Emmanuel Macron", "Palais de l'Élysée", "Paris"]
        );
        assert_eq!(mentions[0].label, EntityLabel::Person);
        assert_eq!(mentions[1].label, EntityLabel::Location);
    }

    #[test]
    fn test_longest_span_wins() {
        let ner = GazetteerRecognizer::from_toml(GAZETTEER).unwrap();
        let mentions = ner
            .recognize("Marie Curie a enseigné à l'Université de Paris.")
            .unwrap();

        assert_eq!(texts(&mentions), vec!["Université de Paris"]);
        assert_eq!(mentions[0].label, EntityLabel::Organization);
    }

    #[test]
    fn test_case_insensitive_and_word_boundaries() {
        let ner = GazetteerRecognizer::from_toml(GAZETTEER).unwrap();
        let mentions = ner.recognize("le quartier parisien de PARIS").unwrap();
        assert_eq!(texts(&mentions), vec!["PARIS"]);
    }

    #[test]
    fn test_offsets_survive_length_changing_case() {
        // 'İ' grows when lowercased
        let mut ner = GazetteerRecognizer::new();
        ner.add_term("Paris", "LOC", &[]);
        ner.add_pattern(r"\b\d{4}\b", "DATE");

        let mentions = ner.recognize("İİİİİ Paris 1999").unwrap();

        assert_eq!(texts(&mentions), vec!["Paris", "1999"]);
        assert_eq!(mentions[0].label, EntityLabel::Location);
    }

    #[test]
    fn test_patterns_and_duplicates() {
        let ner = GazetteerRecognizer::from_toml(GAZETTEER).unwrap();
        let mentions = ner
            .recognize("Zoubida Kedad enseigne RDFS. RDFS est un langage.")
            .unwrap();
        assert_eq!(texts(&mentions), vec!["RDFS"]);
        assert_eq!(mentions[0].label, EntityLabel::Misc);
    }

    #[test]
    fn test_missing_model_is_setup_failure() {
        let err = GazetteerRecognizer::from_file("/nonexistent/gazetteer.toml")
            .err()
            .unwrap();
        assert!(matches!(err, KgError::ModelNotFound(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{GAZETTEER}").unwrap();
        let ner = GazetteerRecognizer::from_file(file.path()).unwrap();
        assert!(!ner.recognize("Macron").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_pattern_skipped() {
        let mut ner = GazetteerRecognizer::new();
        ner.add_pattern("([unclosed", "MISC");
        assert!(ner.recognize("anything").unwrap().is_empty());
    }

    #[test]
    fn test_static_recognizer() {
        let ner = StaticRecognizer::from_pairs(&[("Victor Hugo", "PER"), ("Les Misérables", "MISC")]);
        let mentions = ner.recognize("ignored").unwrap();
        assert_eq!(mentions.len(), 2);
        assert_eq!(mentions[1].label, EntityLabel::Misc);
    }
}
