//! Priority cascade for relation decisions
//!
//! Keyword rules evaluated over a local context window around an entity
//! pair. Rules are tried in a fixed order and the first one that fires
//! decides the relation; the external classifier is only consulted when
//! none does. Also hosts the answer normalization table and the keyword
//! fallback used when the classifier fails.

use serde::{Deserialize, Serialize};

use crate::normalize::fold_accents;
use kgx_core::Relation;

// ============================================================================
// Keyword lists
// ============================================================================

/// Triggers for teaching a subject (rule 0)
pub const TEACHING_TRIGGERS: &[&str] = &[
    "enseigne", "enseigné", "enseignant", "teach", "taught", "teaching",
];

/// Triggers for teaching at an institution (rule 1)
pub const PROFESSOR_TRIGGERS: &[&str] = &[
    "enseigne", "enseigné", "enseignant", "professeur", "teach", "professor", "taught",
    "teaching",
];

pub const MANAGEMENT_TRIGGERS: &[&str] = &["dirige", "gère", "manage", "manages", "ceo", "dirigeant"];

pub const EMPLOYMENT_TRIGGERS: &[&str] = &["travaille", "works", "employé", "employee"];

pub const AUTHORSHIP_TRIGGERS: &[&str] = &[
    "auteur", "rédigé", "écrit", "author", "wrote", "written", "écrivain", "a écrit",
];

pub const LOCATION_TRIGGERS: &[&str] = &["situé", "située", "basé", "basée", "located", "based"];

/// Genuine cities and countries. Names that commonly appear inside
/// institution names are left out.
pub const CITY_KEYWORDS: &[&str] = &[
    "paris", "france", "versailles", "lyon", "marseille", "toulouse", "bordeaux", "lille",
    "états-unis", "usa", "new york", "londres", "californie", "redmond", "cambridge", "oxford",
    "berkeley", "boston", "seattle", "tokyo", "berlin",
];

pub const INSTITUTION_KEYWORDS: &[&str] = &[
    "palais", "élysée", "mit", "stanford", "harvard", "université", "university", "institut",
    "école", "college",
];

pub const TOPIC_KEYWORDS: &[&str] = &[
    "physique", "mathématiques", "maths", "informatique", "biologie", "chimie", "histoire",
    "géographie", "philosophie", "littérature", "physics", "mathematics", "computer science",
    "biology", "chemistry", "rdfs", "rdf", "owl", "sparql",
];

/// Places recognized by the whole-sentence fallback
pub const FALLBACK_PLACES: &[&str] = &[
    "paris", "france", "versailles", "lyon", "marseille", "toulouse", "bordeaux", "lille",
    "états-unis", "usa", "new york", "londres", "californie", "silicon valley",
];

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}

// ============================================================================
// Object classification
// ============================================================================

/// A city or country name that is not part of an institution name
pub fn is_genuine_city(object: &str) -> bool {
    let object = object.to_lowercase();
    contains_any(&object, CITY_KEYWORDS) && !contains_any(&object, INSTITUTION_KEYWORDS)
}

/// A building or institution name
pub fn is_building(object: &str) -> bool {
    contains_any(&object.to_lowercase(), INSTITUTION_KEYWORDS)
}

/// An academic subject
pub fn is_topic(object: &str) -> bool {
    contains_any(&object.to_lowercase(), TOPIC_KEYWORDS)
}

// ============================================================================
// Local context
// ============================================================================

/// Byte offset `n` characters before `from`, clamped to the start
fn back_chars(s: &str, from: usize, n: usize) -> usize {
    if n == 0 {
        return from;
    }
    s[..from]
        .char_indices()
        .rev()
        .take(n)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(from)
}

/// Byte offset `n` characters after `from`, clamped to the end
fn forward_chars(s: &str, from: usize, n: usize) -> usize {
    s[from..]
        .char_indices()
        .nth(n)
        .map(|(i, _)| from + i)
        .unwrap_or(s.len())
}

/// Lowercased window of `radius` characters around the span covering both
/// entities. Falls back to the whole lowercased sentence when either
/// entity does not occur verbatim.
pub fn local_context(sentence: &str, first: &str, second: &str, radius: usize) -> String {
    let sentence = sentence.to_lowercase();
    let first = first.to_lowercase();
    let second = second.to_lowercase();

    match (sentence.find(&first), sentence.find(&second)) {
        (Some(p1), Some(p2)) => {
            let start = p1.min(p2);
            let end = (p1 + first.len()).max(p2 + second.len());
            let from = back_chars(&sentence, start, radius);
            let to = forward_chars(&sentence, end, radius);
            sentence[from..to].to_string()
        }
        _ => sentence,
    }
}

// ============================================================================
// Cascade
// ============================================================================

/// The cascade rule that decided a relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeRule {
    /// Teaching trigger and an academic subject as object
    TeachingTopic,
    /// Teaching or professor trigger
    Teaching,
    /// Management trigger, object not a city
    Management,
    /// Employment trigger
    Employment,
    /// Employment trigger with a city as object
    EmploymentInCity,
    /// Authorship trigger
    Authorship,
    /// Location trigger with a city or building as object
    ExplicitLocation,
    /// City as object
    CityObject,
}

impl CascadeRule {
    /// Relation forced by this rule
    pub fn relation(&self) -> Relation {
        match self {
            Self::TeachingTopic => Relation::TeachesSubject,
            Self::Teaching => Relation::Teaches,
            Self::Management => Relation::Manages,
            Self::Employment => Relation::WorksAt,
            Self::EmploymentInCity | Self::ExplicitLocation | Self::CityObject => {
                Relation::LocatedIn
            }
            Self::Authorship => Relation::Author,
        }
    }

    /// Position in the cascade
    pub fn priority(&self) -> &'static str {
        match self {
            Self::TeachingTopic => "0",
            Self::Teaching => "1",
            Self::Management => "2",
            Self::Employment | Self::EmploymentInCity => "3",
            Self::Authorship => "4",
            Self::ExplicitLocation => "4.5",
            Self::CityObject => "5",
        }
    }
}

impl std::fmt::Display for CascadeRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rule {} ({})", self.priority(), self.relation())
    }
}

/// Evaluate the cascade over a local context and the object's surface text.
///
/// Strict top-to-bottom precedence: the first rule that fires wins.
pub fn apply_cascade(context: &str, object: &str) -> Option<CascadeRule> {
    let context = context.to_lowercase();
    let city = is_genuine_city(object);

    if contains_any(&context, TEACHING_TRIGGERS) && is_topic(object) {
        Some(CascadeRule::TeachingTopic)
    } else if contains_any(&context, PROFESSOR_TRIGGERS) {
        Some(CascadeRule::Teaching)
    } else if contains_any(&context, MANAGEMENT_TRIGGERS) && !city {
        Some(CascadeRule::Management)
    } else if contains_any(&context, EMPLOYMENT_TRIGGERS) {
        if city {
            Some(CascadeRule::EmploymentInCity)
        } else {
            Some(CascadeRule::Employment)
        }
    } else if contains_any(&context, AUTHORSHIP_TRIGGERS) {
        Some(CascadeRule::Authorship)
    } else if contains_any(&context, LOCATION_TRIGGERS) {
        (city || is_building(object)).then_some(CascadeRule::ExplicitLocation)
    } else if city {
        Some(CascadeRule::CityObject)
    } else {
        None
    }
}

// ============================================================================
// Classifier answer normalization
// ============================================================================

/// Ordered (substring, relation) table applied to accent-folded answers.
/// The first entry with a matching substring wins.
pub const ANSWER_PATTERNS: &[(&str, Relation)] = &[
    ("teach", Relation::Teaches),
    ("author", Relation::Author),
    ("wrote", Relation::Author),
    ("work", Relation::WorksAt),
    ("locat", Relation::LocatedIn),
    ("situe", Relation::LocatedIn),
    ("base", Relation::LocatedIn),
    ("collabor", Relation::CollaboratesWith),
    ("etud", Relation::StudiesAt),
    ("studies", Relation::StudiesAt),
    ("ger", Relation::Manages),
    ("manage", Relation::Manages),
];

/// Strip the noise classifiers wrap single-word answers in
pub fn clean_answer(answer: &str) -> String {
    fold_accents(answer.trim())
        .chars()
        .filter(|c| !matches!(c, '.' | '"' | '\'' | '`'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Map a raw classifier answer to the vocabulary, defaulting to `relatedTo`.
///
/// `teachesSubject` is reserved for the cascade, so an answer naming it
/// lands on `teaches`.
pub fn normalize_answer(answer: &str) -> Relation {
    let cleaned = clean_answer(answer);
    ANSWER_PATTERNS
        .iter()
        .find(|(pattern, _)| cleaned.contains(pattern))
        .map(|(_, relation)| *relation)
        .unwrap_or(Relation::RelatedTo)
}

// ============================================================================
// Keyword fallback
// ============================================================================

/// Whole-sentence heuristic used when the classifier is unavailable
pub fn keyword_fallback(sentence: &str, object: &str) -> Relation {
    let sentence = sentence.to_lowercase();
    let object = object.to_lowercase();

    if contains_any(&object, FALLBACK_PLACES) {
        return Relation::LocatedIn;
    }

    const SENTENCE_RULES: &[(&[&str], Relation)] = &[
        (&["enseigne", "teach"], Relation::Teaches),
        (&["rédigé", "écrit", "author"], Relation::Author),
        (&["travaille", "works"], Relation::WorksAt),
        (&["situé", "basé", "located"], Relation::LocatedIn),
        (&["collabore", "collaborate"], Relation::CollaboratesWith),
        (&["étudie", "studies"], Relation::StudiesAt),
    ];

    SENTENCE_RULES
        .iter()
        .find(|(keywords, _)| contains_any(&sentence, keywords))
        .map(|(_, relation)| *relation)
        .unwrap_or(Relation::RelatedTo)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_versus_institution() {
        assert!(is_genuine_city("Paris"));
        assert!(is_genuine_city("Redmond"));
        assert!(!is_genuine_city("Université de Versailles"));
        assert!(!is_genuine_city("Microsoft"));
        assert!(is_building("Palais de l'Élysée"));
        assert!(is_building("Université de Princeton"));
        assert!(is_topic("physique"));
        assert!(!is_topic("Microsoft"));
    }

    #[test]
    fn test_local_context_window() {
        let padding = "x".repeat(80);
        let sentence = format!("{padding} Alice enseigne. Bob travaille à Lyon {padding}");
        let context = local_context(&sentence, "Bob", "Lyon", 50);

        assert!(context.starts_with("x"));
        assert!(context.contains("bob travaille à lyon"));
        assert_eq!(context.chars().count(), "bob travaille à lyon".chars().count() + 100);
    }

    #[test]
    fn test_local_context_counts_characters() {
        let sentence = "éééééé Alice travaille à Paris éééééé";
        let context = local_context(sentence, "Alice", "Paris", 3);
        assert_eq!(context, "éé alice travaille à paris éé");
    }

    #[test]
    fn test_local_context_missing_entity_uses_sentence() {
        let context = local_context("Alice Works At Paris", "Bob", "Paris", 50);
        assert_eq!(context, "alice works at paris");
    }

    #[test]
    fn test_rule_teaching_topic() {
        let rule = apply_cascade("einstein a enseigné la physique", "physique");
        assert_eq!(rule, Some(CascadeRule::TeachingTopic));
        assert_eq!(rule.unwrap().relation(), Relation::TeachesSubject);
    }

    #[test]
    fn test_rule_teaching() {
        assert_eq!(
            apply_cascade("professeur à l'université de princeton", "Université de Princeton"),
            Some(CascadeRule::Teaching)
        );
    }

    #[test]
    fn test_rule_management_skips_cities() {
        assert_eq!(
            apply_cascade("satya nadella dirige microsoft", "Microsoft"),
            Some(CascadeRule::Management)
        );
        // A city object falls through to the city rule
        assert_eq!(
            apply_cascade("il dirige une équipe à paris", "Paris"),
            Some(CascadeRule::CityObject)
        );
    }

    #[test]
    fn test_rule_employment() {
        assert_eq!(
            apply_cascade("macron travaille au palais de l'élysée", "Palais de l'Élysée"),
            Some(CascadeRule::Employment)
        );
        assert_eq!(
            apply_cascade("macron travaille au palais de l'élysée à paris", "Paris"),
            Some(CascadeRule::EmploymentInCity)
        );
    }

    #[test]
    fn test_rule_authorship() {
        assert_eq!(
            apply_cascade("victor hugo a écrit le roman les misérables", "Les Misérables"),
            Some(CascadeRule::Authorship)
        );
    }

    #[test]
    fn test_rule_explicit_location() {
        assert_eq!(
            apply_cascade("le laboratoire est situé à l'université", "Université de Lille 2"),
            Some(CascadeRule::ExplicitLocation)
        );
        assert_eq!(apply_cascade("microsoft est basé quelque part", "Contoso"), None);
    }

    #[test]
    fn test_rule_city_object() {
        assert_eq!(apply_cascade("rien de spécial", "Berlin"), Some(CascadeRule::CityObject));
        assert_eq!(apply_cascade("rien de spécial", "Contoso"), None);
    }

    #[test]
    fn test_strict_precedence_teaching_over_management() {
        assert_eq!(
            apply_cascade("elle dirige le département et enseigne", "Inria"),
            Some(CascadeRule::Teaching)
        );
    }

    #[test]
    fn test_rule_priorities() {
        assert_eq!(CascadeRule::ExplicitLocation.priority(), "4.5");
        assert_eq!(CascadeRule::EmploymentInCity.to_string(), "rule 3 (locatedIn)");
    }

    // One test per normalization table entry

    #[test]
    fn test_answer_teach() {
        assert_eq!(normalize_answer("teaches"), Relation::Teaches);
        assert_eq!(normalize_answer("teachesSubject"), Relation::Teaches);
    }

    #[test]
    fn test_answer_author() {
        assert_eq!(normalize_answer("Author."), Relation::Author);
    }

    #[test]
    fn test_answer_wrote() {
        assert_eq!(normalize_answer("he wrote it"), Relation::Author);
    }

    #[test]
    fn test_answer_work() {
        assert_eq!(normalize_answer("\"worksAt\""), Relation::WorksAt);
    }

    #[test]
    fn test_answer_locat() {
        assert_eq!(normalize_answer("locatedIn"), Relation::LocatedIn);
    }

    #[test]
    fn test_answer_situe() {
        assert_eq!(normalize_answer("Situé"), Relation::LocatedIn);
    }

    #[test]
    fn test_answer_base() {
        assert_eq!(normalize_answer("basé à"), Relation::LocatedIn);
    }

    #[test]
    fn test_answer_collabor() {
        assert_eq!(normalize_answer("collaboratesWith"), Relation::CollaboratesWith);
    }

    #[test]
    fn test_answer_etud() {
        assert_eq!(normalize_answer("étudie"), Relation::StudiesAt);
    }

    #[test]
    fn test_answer_studies() {
        assert_eq!(normalize_answer("studiesAt"), Relation::StudiesAt);
    }

    #[test]
    fn test_answer_ger() {
        assert_eq!(normalize_answer("gère"), Relation::Manages);
    }

    #[test]
    fn test_answer_manage() {
        assert_eq!(normalize_answer("manages"), Relation::Manages);
    }

    #[test]
    fn test_answer_unknown_is_related_to() {
        assert_eq!(normalize_answer("relatedTo"), Relation::RelatedTo);
        assert_eq!(normalize_answer("no idea"), Relation::RelatedTo);
        assert_eq!(normalize_answer(""), Relation::RelatedTo);
    }

    #[test]
    fn test_keyword_fallback() {
        assert_eq!(keyword_fallback("anything", "Silicon Valley"), Relation::LocatedIn);
        assert_eq!(keyword_fallback("Marie enseigne", "X"), Relation::Teaches);
        assert_eq!(keyword_fallback("Il a écrit un livre", "X"), Relation::Author);
        assert_eq!(keyword_fallback("Bob works here", "X"), Relation::WorksAt);
        assert_eq!(keyword_fallback("Le siège est basé", "X"), Relation::LocatedIn);
        assert_eq!(keyword_fallback("Ils collaborent", "X"), Relation::CollaboratesWith);
        assert_eq!(keyword_fallback("Elle étudie", "X"), Relation::StudiesAt);
        assert_eq!(keyword_fallback("Rien", "X"), Relation::RelatedTo);
    }
}
