//! Ontology schema (T-Box)
//!
//! Static declaration of the classes and properties the extractor is
//! allowed to instantiate, with the domain/range constraints the relation
//! engine validates against. Nothing here is mutated during extraction.

use serde::{Deserialize, Serialize};

// ============================================================================
// Namespaces
// ============================================================================

/// Well-known namespace IRIs
pub mod ns {
    pub const EX: &str = "http://example.org/master2/ontology#";
    pub const DATA: &str = "http://example.org/master2/data#";
    pub const SCHEMA: &str = "http://schema.org/";
    pub const FOAF: &str = "http://xmlns.com/foaf/0.1/";
    pub const DC: &str = "http://purl.org/dc/elements/1.1/";
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
    pub const OWL: &str = "http://www.w3.org/2002/07/owl#";
    pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

    /// Prefix table used for display and prefixed-name expansion
    pub const PREFIXES: &[(&str, &str)] = &[
        ("ex", EX),
        ("data", DATA),
        ("schema", SCHEMA),
        ("foaf", FOAF),
        ("dc", DC),
        ("rdf", RDF),
        ("rdfs", RDFS),
        ("owl", OWL),
        ("xsd", XSD),
    ];

    /// Shorten an IRI to `prefix:local` when a known namespace matches
    pub fn compact(iri: &str) -> String {
        for (prefix, base) in PREFIXES {
            if let Some(local) = iri.strip_prefix(base) {
                return format!("{prefix}:{local}");
            }
        }
        iri.to_string()
    }
}

// ============================================================================
// Classes
// ============================================================================

/// Ontology classes an entity record can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OntologyClass {
    Person,
    Place,
    Organization,
    Document,
    ValidatedCourse,
}

impl OntologyClass {
    pub const ALL: [OntologyClass; 5] = [
        Self::Person,
        Self::Place,
        Self::Organization,
        Self::Document,
        Self::ValidatedCourse,
    ];

    /// Full class IRI
    pub fn iri(&self) -> String {
        match self {
            Self::Person => format!("{}Person", ns::FOAF),
            Self::Place => format!("{}Place", ns::SCHEMA),
            Self::Organization => format!("{}Organization", ns::SCHEMA),
            Self::Document => format!("{}Document", ns::EX),
            Self::ValidatedCourse => format!("{}ValidatedCourse", ns::EX),
        }
    }

    /// Resolve a class from its IRI
    pub fn from_iri(iri: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.iri() == iri)
    }

    /// Local name (e.g. "Person")
    pub fn local_name(&self) -> &'static str {
        match self {
            Self::Person => "Person",
            Self::Place => "Place",
            Self::Organization => "Organization",
            Self::Document => "Document",
            Self::ValidatedCourse => "ValidatedCourse",
        }
    }

    /// French label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Person => "Personne",
            Self::Place => "Lieu",
            Self::Organization => "Organisation",
            Self::Document => "Document",
            Self::ValidatedCourse => "Cours Validé",
        }
    }

    /// French description
    pub fn comment(&self) -> &'static str {
        match self {
            Self::Person => "Classe FOAF représentant un individu humain",
            Self::Place => {
                "Classe Schema.org représentant un lieu géographique ou une institution"
            }
            Self::Organization => "Classe Schema.org représentant une entité organisationnelle",
            Self::Document => "Classe représentant un document, cours ou publication",
            Self::ValidatedCourse => "Cours ayant au moins un auteur identifié",
        }
    }

    /// Declared superclass, if any
    pub fn parent(&self) -> Option<OntologyClass> {
        match self {
            Self::ValidatedCourse => Some(Self::Document),
            _ => None,
        }
    }
}

impl std::fmt::Display for OntologyClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.local_name())
    }
}

// ============================================================================
// Relations (closed vocabulary)
// ============================================================================

/// Relation vocabulary the engine may assert between two entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Relation {
    Teaches,
    TeachesSubject,
    Author,
    WorksAt,
    LocatedIn,
    CollaboratesWith,
    StudiesAt,
    Manages,
    RelatedTo,
}

impl Relation {
    pub const VOCABULARY: [Relation; 9] = [
        Self::Teaches,
        Self::TeachesSubject,
        Self::Author,
        Self::WorksAt,
        Self::LocatedIn,
        Self::CollaboratesWith,
        Self::StudiesAt,
        Self::Manages,
        Self::RelatedTo,
    ];

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Teaches => "teaches",
            Self::TeachesSubject => "teachesSubject",
            Self::Author => "author",
            Self::WorksAt => "worksAt",
            Self::LocatedIn => "locatedIn",
            Self::CollaboratesWith => "collaboratesWith",
            Self::StudiesAt => "studiesAt",
            Self::Manages => "manages",
            Self::RelatedTo => "relatedTo",
        }
    }

    /// Exact (case-insensitive) lookup of a vocabulary name
    pub fn from_name(s: &str) -> Option<Self> {
        Self::VOCABULARY
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Predicate IRI
    pub fn iri(&self) -> String {
        format!("{}{}", ns::EX, self.as_str())
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Property declarations
// ============================================================================

/// Object property declaration with its domain/range constraint
///
/// `None` for domain or range stands for `rdfs:Resource` (unconstrained).
/// `also_accepts` lists range classes the validator accepts besides the
/// declared one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDeclaration {
    pub name: &'static str,
    pub label: &'static str,
    pub comment: &'static str,
    pub domain: Option<OntologyClass>,
    pub range: Option<OntologyClass>,
    pub also_accepts: &'static [OntologyClass],
}

impl PropertyDeclaration {
    pub fn iri(&self) -> String {
        format!("{}{}", ns::EX, self.name)
    }

    /// Every range class accepted at validation time, declared one first
    pub fn accepted_range(&self) -> Vec<OntologyClass> {
        self.range
            .into_iter()
            .chain(self.also_accepts.iter().copied())
            .collect()
    }
}

/// Literal datatype of a datatype property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XsdType {
    String,
    Integer,
}

impl XsdType {
    pub fn iri(&self) -> String {
        match self {
            Self::String => format!("{}string", ns::XSD),
            Self::Integer => format!("{}integer", ns::XSD),
        }
    }
}

/// Datatype property declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatatypePropertyDeclaration {
    pub iri: String,
    pub label: &'static str,
    pub comment: &'static str,
    pub domain: OntologyClass,
    pub range: XsdType,
}

/// `owl:someValuesFrom` restriction attached to a class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SomeValuesRestriction {
    pub class: OntologyClass,
    pub on_property: &'static str,
    pub some_values_from: OntologyClass,
}

// ============================================================================
// Ontology
// ============================================================================

/// The complete T-Box
#[derive(Debug, Clone)]
pub struct Ontology {
    properties: Vec<PropertyDeclaration>,
    datatype_properties: Vec<DatatypePropertyDeclaration>,
    restrictions: Vec<SomeValuesRestriction>,
}

impl Default for Ontology {
    fn default() -> Self {
        Self::new()
    }
}

impl Ontology {
    /// Build the academic-domain schema
    pub fn new() -> Self {
        use OntologyClass::*;

        let properties = vec![
            PropertyDeclaration {
                name: "teaches",
                label: "enseigne à",
                comment: "Relation entre une personne et le lieu où elle enseigne",
                domain: Some(Person),
                range: Some(Place),
                also_accepts: &[Organization],
            },
            PropertyDeclaration {
                name: "teachesSubject",
                label: "enseigne la matière",
                comment: "Relation entre un enseignant et la matière qu'il enseigne",
                domain: Some(Person),
                range: Some(Document),
                also_accepts: &[],
            },
            PropertyDeclaration {
                name: "author",
                label: "a rédigé",
                comment: "Relation entre un auteur et un document qu'il a rédigé",
                domain: Some(Person),
                range: Some(Document),
                also_accepts: &[],
            },
            PropertyDeclaration {
                name: "about",
                label: "traite de",
                comment: "Relation entre un document et son sujet principal",
                domain: Some(Document),
                range: None,
                also_accepts: &[],
            },
            PropertyDeclaration {
                name: "worksAt",
                label: "travaille à",
                comment: "Relation entre une personne et son lieu de travail",
                domain: Some(Person),
                range: Some(Organization),
                also_accepts: &[],
            },
            PropertyDeclaration {
                name: "locatedIn",
                label: "situé à",
                comment: "Relation de localisation géographique",
                domain: None,
                range: Some(Place),
                also_accepts: &[],
            },
            PropertyDeclaration {
                name: "collaboratesWith",
                label: "collabore avec",
                comment: "Relation de collaboration entre deux personnes",
                domain: Some(Person),
                range: Some(Person),
                also_accepts: &[],
            },
            PropertyDeclaration {
                name: "studiesAt",
                label: "étudie à",
                comment: "Relation entre un étudiant et son établissement",
                domain: Some(Person),
                range: Some(Organization),
                also_accepts: &[],
            },
            PropertyDeclaration {
                name: "manages",
                label: "gère",
                comment: "Relation de gestion/direction d'une organisation",
                domain: Some(Person),
                range: Some(Organization),
                also_accepts: &[],
            },
            PropertyDeclaration {
                name: "relatedTo",
                label: "en relation avec",
                comment: "Relation générique entre deux ressources",
                domain: None,
                range: None,
                also_accepts: &[],
            },
        ];

        let datatype_properties = vec![
            DatatypePropertyDeclaration {
                iri: format!("{}name", ns::FOAF),
                label: "nom",
                comment: "Nom complet d'une personne",
                domain: Person,
                range: XsdType::String,
            },
            DatatypePropertyDeclaration {
                iri: format!("{}title", ns::EX),
                label: "intitulé",
                comment: "Titre ou intitulé d'un document",
                domain: Document,
                range: XsdType::String,
            },
            DatatypePropertyDeclaration {
                iri: format!("{}age", ns::EX),
                label: "âge",
                comment: "Âge d'une personne en années",
                domain: Person,
                range: XsdType::Integer,
            },
        ];

        let restrictions = vec![SomeValuesRestriction {
            class: ValidatedCourse,
            on_property: "author",
            some_values_from: Person,
        }];

        Self {
            properties,
            datatype_properties,
            restrictions,
        }
    }

    /// Declared classes
    pub fn classes(&self) -> &'static [OntologyClass] {
        &OntologyClass::ALL
    }

    /// Object property declarations
    pub fn properties(&self) -> &[PropertyDeclaration] {
        &self.properties
    }

    /// Datatype property declarations
    pub fn datatype_properties(&self) -> &[DatatypePropertyDeclaration] {
        &self.datatype_properties
    }

    /// Class restrictions
    pub fn restrictions(&self) -> &[SomeValuesRestriction] {
        &self.restrictions
    }

    /// Look up a property by name
    pub fn property(&self, name: &str) -> Option<&PropertyDeclaration> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Declaration backing a vocabulary relation
    pub fn declaration(&self, relation: Relation) -> Option<&PropertyDeclaration> {
        self.property(relation.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================
