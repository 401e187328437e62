//! Entity Type Refiner
//!
//! Asks an external type classifier for a fine-grained type per mention,
//! adding the TOPIC category the recognizer has no label for. Any failure
//! leaves the mentions untouched.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use kgx_core::{EntityLabel, EntityMention, KgError, LlmClient, Result};

// ============================================================================
// Type classifier capability
// ============================================================================

/// External entity type classifier
///
/// Maps entity texts to one of PERSON, ORGANIZATION, LOCATION, TOPIC,
/// DOCUMENT. Entities may be missing from the mapping.
#[async_trait]
pub trait TypeClassifier: Send + Sync {
    async fn classify_types(
        &self,
        entities: &[String],
        sentence: &str,
    ) -> Result<HashMap<String, String>>;
}

/// LLM-backed type classifier
pub struct LlmTypeClassifier {
    client: Arc<dyn LlmClient>,
    system_prompt: String,
}

impl LlmTypeClassifier {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            system_prompt: include_str!("prompts/type_system.txt").to_string(),
        }
    }

    pub fn build_prompt(&self, entities: &[String], sentence: &str) -> String {
        let list = entities
            .iter()
            .map(|e| format!("\"{e}\""))
            .collect::<Vec<_>>()
            .join(", ");
        format!("Context: \"{sentence}\"\n\nEntities detected: [{list}]\n\nJSON:")
    }
}

#[async_trait]
impl TypeClassifier for LlmTypeClassifier {
    async fn classify_types(
        &self,
        entities: &[String],
        sentence: &str,
    ) -> Result<HashMap<String, String>> {
        let prompt = self.build_prompt(entities, sentence);
        let reply = self
            .client
            .generate_with_system(&self.system_prompt, &prompt)
            .await?;
        parse_type_reply(&reply)
    }
}

/// First flat JSON object in a reply
static OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[^}]+\}").expect("Invalid JSON object pattern"));

/// Remove a ```json or ``` fence around the reply, if any
fn strip_fences(reply: &str) -> &str {
    let reply = reply.trim();
    let inner = if let Some((_, rest)) = reply.split_once("```json") {
        rest
    } else if let Some((_, rest)) = reply.split_once("```") {
        rest
    } else {
        return reply;
    };
    inner.split("```").next().unwrap_or(inner).trim()
}

/// Parse a classifier reply into a text → type mapping.
///
/// Tolerates code fences and prose around the JSON object: when the reply
/// is not JSON as a whole, the first `{...}` object in it is used.
pub fn parse_type_reply(reply: &str) -> Result<HashMap<String, String>> {
    let body = strip_fences(reply);
    if let Ok(mapping) = serde_json::from_str::<HashMap<String, String>>(body) {
        return Ok(mapping);
    }

    let candidate = OBJECT
        .find(body)
        .ok_or_else(|| KgError::Classifier(format!("no JSON object in reply: {body:.100}")))?;

    serde_json::from_str(candidate.as_str())
        .map_err(|e| KgError::Classifier(format!("malformed type mapping: {e}")))
}

/// Deterministic classifier for tests and offline evaluation
#[derive(Debug, Clone, Default)]
pub struct FixedTypeClassifier {
    mapping: Option<HashMap<String, String>>,
}

impl FixedTypeClassifier {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            mapping: Some(
                pairs
                    .iter()
                    .map(|(text, ty)| (text.to_string(), ty.to_string()))
                    .collect(),
            ),
        }
    }

    /// Classifier that fails every call
    pub fn failing() -> Self {
        Self { mapping: None }
    }
}

#[async_trait]
impl TypeClassifier for FixedTypeClassifier {
    async fn classify_types(
        &self,
        _entities: &[String],
        _sentence: &str,
    ) -> Result<HashMap<String, String>> {
        self.mapping
            .clone()
            .ok_or_else(|| KgError::Classifier("type classifier unavailable".to_string()))
    }
}

// ============================================================================
// Refiner
// ============================================================================

/// Map a classifier type name to a mention label
pub fn label_for_type(answer: &str) -> Option<EntityLabel> {
    match answer.trim().to_uppercase().as_str() {
        "PERSON" => Some(EntityLabel::Person),
        "ORGANIZATION" => Some(EntityLabel::Organization),
        "LOCATION" => Some(EntityLabel::Location),
        "TOPIC" => Some(EntityLabel::Topic),
        "DOCUMENT" => Some(EntityLabel::Document),
        _ => None,
    }
}

/// Refines coarse recognizer labels through an optional classifier
#[derive(Default)]
pub struct EntityTypeRefiner {
    classifier: Option<Arc<dyn TypeClassifier>>,
}

impl EntityTypeRefiner {
    /// Refiner without a classifier: mentions pass through unchanged
    pub fn new() -> Self {
        Self { classifier: None }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn TypeClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Same length and order as the input, labels possibly updated
    pub async fn refine(&self, mentions: Vec<EntityMention>, sentence: &str) -> Vec<EntityMention> {
        if mentions.is_empty() {
            return mentions;
        }
        let Some(classifier) = &self.classifier else {
            tracing::debug!("No type classifier, keeping recognizer labels");
            return mentions;
        };

        let texts: Vec<String> = mentions.iter().map(|m| m.text.clone()).collect();
        let mapping = match classifier.classify_types(&texts, sentence).await {
            Ok(mapping) => mapping,
            Err(e) => {
                tracing::warn!("Type refinement failed, keeping recognizer labels: {e}");
                return mentions;
            }
        };

        mentions
            .into_iter()
            .map(|mention| {
                let Some(answer) = mapping.get(&mention.text) else {
                    tracing::debug!("'{}' not classified, kept {}", mention.text, mention.label);
                    return mention;
                };
                match label_for_type(answer) {
                    Some(label) if label != mention.label => {
                        tracing::info!(
                            "Refined '{}': {} -> {}",
                            mention.text,
                            mention.label,
                            label
                        );
                        mention.relabel(label)
                    }
                    Some(_) => mention,
                    None => {
                        tracing::debug!("Unknown type {answer:?} for '{}'", mention.text);
                        mention
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mentions() -> Vec<EntityMention> {
        vec![
            EntityMention::new("Albert Einstein", EntityLabel::Person),
            EntityMention::new("physique", EntityLabel::Misc),
            EntityMention::new("Université de Princeton", EntityLabel::Location),
        ]
    }

    #[test]
    fn test_parse_plain_json() {
        let mapping = parse_type_reply(r#"{"Einstein": "PERSON"}"#).unwrap();
        assert_eq!(mapping["Einstein"], "PERSON");
    }

    #[test]
    fn test_parse_fenced_json() {
        let reply = "```json\n{\"Physique\": \"TOPIC\"}\n```";
        assert_eq!(parse_type_reply(reply).unwrap()["Physique"], "TOPIC");

        let reply = "```\n{\"Physique\": \"TOPIC\"}\n```";
        assert_eq!(parse_type_reply(reply).unwrap()["Physique"], "TOPIC");
    }

    #[test]
    fn test_parse_object_in_prose() {
        let reply = "Here you go: {\"Paris\": \"LOCATION\"} Hope it helps.";
        assert_eq!(parse_type_reply(reply).unwrap()["Paris"], "LOCATION");
    }

    #[test]
    fn test_object_pattern_takes_first_object() {
        let found = OBJECT.find("a {\"x\": \"TOPIC\"} b {\"y\": \"PERSON\"}").unwrap();
        assert_eq!(found.as_str(), "{\"x\": \"TOPIC\"}");
        assert!(!OBJECT.is_match("{}"));
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(parse_type_reply("I cannot answer that").is_err());
    }

    #[tokio::test]
    async fn test_refine_adds_topic() {
        let refiner = EntityTypeRefiner::new().with_classifier(Arc::new(FixedTypeClassifier::new(&[
            ("physique", "TOPIC"),
            ("Université de Princeton", "organization"),
            ("Albert Einstein", "ALIEN"),
        ])));

        let refined = refiner.refine(mentions(), "sentence").await;

        assert_eq!(refined.len(), 3);
        assert_eq!(refined[0].label, EntityLabel::Person);
        assert_eq!(refined[1].label, EntityLabel::Topic);
        assert_eq!(refined[2].label, EntityLabel::Organization);
    }

    #[tokio::test]
    async fn test_refine_failure_returns_input() {
        let refiner =
            EntityTypeRefiner::new().with_classifier(Arc::new(FixedTypeClassifier::failing()));
        assert_eq!(refiner.refine(mentions(), "sentence").await, mentions());
        assert_eq!(EntityTypeRefiner::new().refine(mentions(), "s").await, mentions());
    }
}
