//! End-to-end extraction scenarios and engine properties

use std::sync::Arc;

use proptest::prelude::*;

use kgx_core::{KnowledgeGraph, Ontology, OntologyClass, Relation, RelationAssertion};
use kgx_extractor::cascade::{CITY_KEYWORDS, TOPIC_KEYWORDS};
use kgx_extractor::{
    attempt_widen, load_scenarios, EntityRecognizer, EntityTypeRefiner, ExtractionReport,
    FixedRelationClassifier, FixedTypeClassifier, GazetteerRecognizer, InstantiatedEntity,
    Pipeline, RelationEngine, StaticRecognizer,
};

async fn run(
    text: &str,
    mentions: &[(&str, &str)],
    types: &[(&str, &str)],
) -> (KnowledgeGraph, ExtractionReport) {
    let mut pipeline = Pipeline::new(Arc::new(StaticRecognizer::from_pairs(mentions)));
    if !types.is_empty() {
        pipeline = pipeline.with_refiner(
            EntityTypeRefiner::new().with_classifier(Arc::new(FixedTypeClassifier::new(types))),
        );
    }
    pipeline.run(text, KnowledgeGraph::new()).await.unwrap()
}

fn has(graph: &KnowledgeGraph, subject: &str, relation: Relation, object: &str) -> bool {
    graph
        .assertions()
        .contains(&RelationAssertion::new(subject, relation, object))
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_macron_works_at_palace_located_in_paris() {
    let (graph, report) = run(
        "Emmanuel Macron travaille au Palais de l'Élysée à Paris.",
        &[
            ("Emmanuel Macron", "PER"),
            ("Palais de l'Élysée", "LOC"),
            ("Paris", "LOC"),
        ],
        &[],
    )
    .await;

    assert!(has(&graph, "emmanuel_macron", Relation::WorksAt, "palais_de_lelysee"));
    assert!(has(&graph, "palais_de_lelysee", Relation::LocatedIn, "paris"));

    let palace = graph.entity("palais_de_lelysee").unwrap();
    assert!(palace.has_class(OntologyClass::Place));
    assert!(palace.has_class(OntologyClass::Organization));
    assert!(report
        .widenings
        .iter()
        .any(|w| w.entity == "palais_de_lelysee" && w.class == OntologyClass::Organization));

    // worksAt is on the reification whitelist
    assert!(graph
        .statements()
        .iter()
        .any(|s| s.assertion.relation == Relation::WorksAt));
}

#[tokio::test]
async fn test_hugo_author_validates_document() {
    let (graph, report) = run(
        "Victor Hugo a écrit le roman Les Misérables.",
        &[("Victor Hugo", "PER"), ("Les Misérables", "MISC")],
        &[],
    )
    .await;

    assert!(has(&graph, "victor_hugo", Relation::Author, "les_miserables"));
    assert!(graph.has_class("les_miserables", OntologyClass::Document));
    assert!(graph.has_class("les_miserables", OntologyClass::ValidatedCourse));
    assert_eq!(report.statements.len(), 1);
    assert_eq!(graph.statements()[0].source, "texte_exemple.txt");
}

#[tokio::test]
async fn test_einstein_teaches_subject_and_institution() {
    let (graph, report) = run(
        "Albert Einstein a enseigné la physique à l'Université de Princeton.",
        &[
            ("Albert Einstein", "PER"),
            ("physique", "MISC"),
            ("Université de Princeton", "ORG"),
        ],
        &[("physique", "TOPIC")],
    )
    .await;

    assert!(has(&graph, "albert_einstein", Relation::TeachesSubject, "physique"));
    assert!(has(&graph, "albert_einstein", Relation::Teaches, "universite_de_princeton"));
    assert_eq!(report.refined[1].label.code(), "TOPIC");
}

#[tokio::test]
async fn test_nadella_manages_microsoft_in_redmond() {
    let (graph, _) = run(
        "Satya Nadella dirige Microsoft qui est situé à Redmond.",
        &[
            ("Satya Nadella", "PER"),
            ("Microsoft", "ORG"),
            ("Redmond", "LOC"),
        ],
        &[],
    )
    .await;

    assert!(has(&graph, "satya_nadella", Relation::Manages, "microsoft"));
    assert!(has(&graph, "microsoft", Relation::LocatedIn, "redmond"));
}

#[tokio::test]
async fn test_failing_classifiers_never_abort() {
    let engine = RelationEngine::new(Ontology::new())
        .with_classifier(Arc::new(FixedRelationClassifier::failing()));
    let pipeline = Pipeline::new(Arc::new(StaticRecognizer::from_pairs(&[
        ("Alice", "PER"),
        ("Bob", "PER"),
        ("1905", "DATE"),
    ])))
    .with_engine(engine)
    .with_refiner(EntityTypeRefiner::new().with_classifier(Arc::new(FixedTypeClassifier::failing())));

    let (graph, report) = pipeline
        .run("Alice collabore avec Bob.", KnowledgeGraph::new())
        .await
        .unwrap();

    assert!(has(&graph, "alice", Relation::CollaboratesWith, "bob"));
    assert_eq!(report.classifier_failures, 1);
    assert_eq!(report.skipped_entities.len(), 1);
}

#[tokio::test]
async fn test_rejected_relation_is_reported() {
    // A document cannot teach at an institution
    let (graph, report) = run(
        "La physique est enseignée à l'Université de Princeton.",
        &[("physique", "TOPIC"), ("Université de Princeton", "ORG")],
        &[],
    )
    .await;

    assert!(graph.assertions().is_empty());
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].relation, Relation::Teaches);
}

const AUTHOR_THEN_TEACHER: &str = "Hugo a écrit Chimie. Ceci est un long remplissage sans aucun \
                                   mot declencheur. Marie enseigne Chimie.";

#[tokio::test]
async fn test_widening_by_earlier_pair_enables_later_pair() {
    let (graph, _) = run(
        AUTHOR_THEN_TEACHER,
        &[("Hugo", "PER"), ("Marie", "PER"), ("Chimie", "LOC")],
        &[],
    )
    .await;

    assert!(has(&graph, "hugo", Relation::Author, "chimie"));
    assert!(has(&graph, "marie", Relation::TeachesSubject, "chimie"));

    let chimie = graph.entity("chimie").unwrap();
    assert!(chimie.has_class(OntologyClass::Place));
    assert!(chimie.has_class(OntologyClass::Document));
    assert!(chimie.has_class(OntologyClass::ValidatedCourse));
}

#[tokio::test]
async fn test_mention_order_decides_pair_order() {
    // Marie's pair comes first, before authorship makes Chimie a Document
    let (graph, report) = run(
        AUTHOR_THEN_TEACHER,
        &[("Marie", "PER"), ("Hugo", "PER"), ("Chimie", "LOC")],
        &[],
    )
    .await;

    assert!(!has(&graph, "marie", Relation::TeachesSubject, "chimie"));
    assert!(has(&graph, "hugo", Relation::Author, "chimie"));
    assert!(report
        .rejected
        .iter()
        .any(|r| r.subject == "marie" && r.relation == Relation::TeachesSubject));
}

#[test]
fn test_demo_files_load() {
    let demos = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos");

    let recognizer = GazetteerRecognizer::from_file(demos.join("gazetteer.toml")).unwrap();
    let mentions = recognizer
        .recognize("Zoubida Kedad enseigne à l'Université de Versailles. Elle a rédigé un cours sur RDFS.")
        .unwrap();
    let texts: Vec<&str> = mentions.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["Zoubida Kedad", "Université de Versailles", "cours sur RDFS"]);

    let content = std::fs::read_to_string(demos.join("scenarios.toml")).unwrap();
    let scenarios = load_scenarios(&content).unwrap();
    assert_eq!(scenarios.len(), 5);
    assert!(scenarios.iter().all(|s| !s.expected.is_empty()));
}

// ============================================================================
// Properties
// ============================================================================

const ANSWERS: &[&str] = &[
    "teaches",
    "teachesSubject",
    "author",
    "worksAt",
    "locatedIn",
    "collaboratesWith",
    "studiesAt",
    "manages",
    "relatedTo",
    "garbage",
];

fn class_strategy() -> impl Strategy<Value = OntologyClass> {
    proptest::sample::select(OntologyClass::ALL.to_vec())
}

proptest! {
    #[test]
    fn prop_topic_after_teaching_is_teaches_subject(
        topic in proptest::sample::select(TOPIC_KEYWORDS.to_vec()),
        answer in proptest::sample::select(ANSWERS.to_vec()),
    ) {
        let engine = RelationEngine::new(Ontology::new())
            .with_classifier(Arc::new(FixedRelationClassifier::always(answer)));
        let sentence = format!("Alice enseigne la {topic}.");

        let decision = runtime().block_on(engine.decide("Alice", topic, &sentence));
        prop_assert_eq!(decision.relation, Relation::TeachesSubject);
    }

    #[test]
    fn prop_genuine_city_is_located_in(
        city in proptest::sample::select(CITY_KEYWORDS.to_vec()),
        answer in proptest::sample::select(ANSWERS.to_vec()),
    ) {
        let engine = RelationEngine::new(Ontology::new())
            .with_classifier(Arc::new(FixedRelationClassifier::always(answer)));
        let sentence = format!("Alice et {city}.");

        let decision = runtime().block_on(engine.decide("Alice", city, &sentence));
        prop_assert_eq!(decision.relation, Relation::LocatedIn);
    }

    #[test]
    fn prop_author_always_validates_object(
        subject_class in class_strategy(),
        object_class in class_strategy(),
    ) {
        let mut graph = KnowledgeGraph::new();
        graph.upsert_entity("auteur_x", subject_class, "Auteur X");
        graph.upsert_entity("oeuvre_y", object_class, "Oeuvre Y");
        let entities = vec![
            InstantiatedEntity { text: "Auteur X".into(), id: "auteur_x".into(), class: subject_class },
            InstantiatedEntity { text: "Oeuvre Y".into(), id: "oeuvre_y".into(), class: object_class },
        ];
        let sentence = "Auteur X a écrit Oeuvre Y.";
        let mut report = ExtractionReport::new(sentence);

        runtime().block_on(
            RelationEngine::new(Ontology::new()).extract_all(&mut graph, &entities, sentence, &mut report),
        );

        for assertion in graph.assertions_with(Relation::Author) {
            prop_assert!(graph.has_class(&assertion.object, OntologyClass::ValidatedCourse));
        }
    }

    #[test]
    fn prop_widening_is_additive(
        initial in proptest::collection::vec(class_strategy(), 1..4),
        requests in proptest::collection::vec((0usize..3, class_strategy()), 0..12),
    ) {
        let mut graph = KnowledgeGraph::new();
        for (i, class) in initial.iter().enumerate() {
            graph.upsert_entity(format!("e{i}"), *class, format!("E{i}"));
        }

        for (idx, required) in requests {
            let id = format!("e{}", idx % initial.len());
            let before = graph.entity(&id).unwrap().classes.clone();
            let widened = attempt_widen(&mut graph, &id, required);
            let after = &graph.entity(&id).unwrap().classes;

            prop_assert!(after.is_superset(&before));
            prop_assert!(!after.is_empty());
            if widened {
                prop_assert!(before.contains(&OntologyClass::Place));
                prop_assert!(after.contains(&required));
            }
        }
    }
}
