//! KGX CLI - Command-line interface
//!
//! Usage:
//!   kgx extract [TEXT...] [--text T] [--input FILE]
//!   kgx inspect <file>
//!   kgx schema [--format turtle|rdfxml]
//!   kgx eval <scenarios.toml>

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};

use kgx_core::{
    AppConfig, EntityLabel, EntityMention, KgError, KnowledgeGraph, LoggingConfig, Ontology,
};
use kgx_extractor::{
    evaluate_relations, load_scenarios, EntityRecognizer, EntityTypeRefiner, FixedTypeClassifier,
    GazetteerRecognizer, Pipeline, RelationMetrics, StaticRecognizer,
};
use kgx_graph::{clean_outputs, export_all, materialize, materialize_tbox, GraphStats, RdfFormat};

const DEMO_TEXT: &str =
    "Zoubida Kedad enseigne à l'Université de Versailles. Elle a rédigé un cours sur RDFS.";

#[derive(Parser)]
#[command(name = "kgx")]
#[command(about = "Knowledge graph extraction from French text")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a knowledge graph from text and export it
    Extract(ExtractArgs),
    /// Re-parse an exported graph and print statistics
    Inspect {
        /// Turtle (.ttl) or RDF/XML (.xml, .rdf) file
        file: PathBuf,
    },
    /// Print the ontology schema
    Schema {
        #[arg(long, value_enum, default_value_t = SchemaFormat::Turtle)]
        format: SchemaFormat,
    },
    /// Run offline evaluation scenarios
    Eval {
        /// Scenario file (TOML list of [[scenario]])
        file: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
struct ExtractArgs {
    /// Source text as positional words
    words: Vec<String>,

    /// Source text
    #[arg(long)]
    text: Option<String>,

    /// Read the source text from a file
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Provenance recorded on reified statements
    #[arg(long)]
    source: Option<String>,

    /// Recognizer gazetteer file
    #[arg(long)]
    gazetteer: Option<PathBuf>,

    /// Write the extraction report as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    /// Do not call the LLM; heuristics decide everything
    #[arg(long)]
    offline: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SchemaFormat {
    Turtle,
    Rdfxml,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.logging);

    match cli.command {
        Commands::Extract(args) => extract(config, args).await,
        Commands::Inspect { file } => inspect(&file),
        Commands::Schema { format } => schema(format),
        Commands::Eval { file } => eval(&config, &file).await,
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("kgx={}", logging.level).into());

    if logging.json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

// ============================================================================
// extract
// ============================================================================

/// Pick the source text: --text, positional words, --input, staged file,
/// then the demo sentence.
fn resolve_text(args: &ExtractArgs, staged: &Path) -> anyhow::Result<(String, String)> {
    if let Some(text) = args.text.as_ref().filter(|t| !t.trim().is_empty()) {
        return Ok((text.clone(), "--text".to_string()));
    }
    if !args.words.is_empty() {
        return Ok((args.words.join(" "), "arguments".to_string()));
    }
    if let Some(path) = &args.input {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read input file {}", path.display()))?;
        return Ok((text.trim().to_string(), path.display().to_string()));
    }
    if staged.exists() {
        match std::fs::read_to_string(staged) {
            Ok(text) if !text.trim().is_empty() => {
                return Ok((text.trim().to_string(), staged.display().to_string()));
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Cannot read staged input {}: {}", staged.display(), e),
        }
    }
    Ok((DEMO_TEXT.to_string(), "demo".to_string()))
}

async fn extract(mut config: AppConfig, args: ExtractArgs) -> anyhow::Result<()> {
    if let Some(dir) = &args.output_dir {
        config.output.directory = dir.clone();
    }
    if let Some(source) = &args.source {
        config.extraction.provenance_source = source.clone();
    }
    if let Some(path) = &args.gazetteer {
        config.extraction.gazetteer_path = path.clone();
    }

    // Setup failures abort before anything is written
    let recognizer = GazetteerRecognizer::from_file(&config.extraction.gazetteer_path)
        .context("cannot load the entity recognizer")?;

    let llm = if args.offline {
        tracing::info!("Offline mode: classifiers disabled");
        None
    } else {
        match kgx_llm::create_llm_client(&config.llm) {
            Ok(client) => {
                tracing::info!("Using LLM classifier {}", client.model());
                Some(client)
            }
            Err(KgError::MissingCredential(msg)) => {
                tracing::warn!("{}; running with heuristics only", msg);
                None
            }
            Err(e) => {
                tracing::warn!("LLM client unavailable ({}); running with heuristics only", e);
                None
            }
        }
    };

    let (text, origin) = resolve_text(&args, &config.extraction.staged_input)?;
    tracing::info!("Source text from {}: \"{}\"", origin, text);

    if config.output.clean_previous {
        for path in clean_outputs(&config.output)? {
            tracing::info!("Removed previous export {}", path.display());
        }
    }

    let pipeline = Pipeline::from_config(Arc::new(recognizer), &config.extraction, llm);
    let (graph, report) = pipeline.run(&text, KnowledgeGraph::new()).await?;

    let rdf = materialize(pipeline.engine().ontology(), &graph);
    let files = export_all(&rdf, &config.output)?;

    if let Some(path) = &args.report {
        std::fs::write(path, report.to_json()?)
            .with_context(|| format!("cannot write report {}", path.display()))?;
    }

    println!("{}", RdfFormat::Turtle.serialize(&rdf)?);
    println!("{}", GraphStats::compute(&rdf));
    println!();
    println!("{}", report.summary());
    println!("Turtle:  {}", files.turtle.display());
    println!("RDF/XML: {}", files.rdfxml.display());
    println!("DOT:     {}", files.dot.display());
    match &files.image {
        Some(image) => println!("Image:   {}", image.display()),
        None => println!("Image:   not rendered (Graphviz unavailable)"),
    }

    Ok(())
}

// ============================================================================
// inspect / schema
// ============================================================================

fn inspect(file: &Path) -> anyhow::Result<()> {
    let format = RdfFormat::from_path(file)?;
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("cannot read {}", file.display()))?;
    let graph = format.parse(&content)?;
    println!("{}", GraphStats::compute(&graph));
    Ok(())
}

fn schema(format: SchemaFormat) -> anyhow::Result<()> {
    let tbox = materialize_tbox(&Ontology::new());
    let document = match format {
        SchemaFormat::Turtle => RdfFormat::Turtle.serialize(&tbox)?,
        SchemaFormat::Rdfxml => RdfFormat::RdfXml.serialize(&tbox)?,
    };
    println!("{document}");
    Ok(())
}

// ============================================================================
// eval
// ============================================================================

async fn eval(config: &AppConfig, file: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("cannot read scenario file {}", file.display()))?;
    let scenarios = load_scenarios(&content)?;

    let mut gazetteer: Option<Arc<dyn EntityRecognizer>> = None;
    let mut total = RelationMetrics::default();

    for scenario in &scenarios {
        let recognizer: Arc<dyn EntityRecognizer> = if scenario.mentions.is_empty() {
            match &gazetteer {
                Some(recognizer) => recognizer.clone(),
                None => {
                    let loaded: Arc<dyn EntityRecognizer> = Arc::new(
                        GazetteerRecognizer::from_file(&config.extraction.gazetteer_path)
                            .context("cannot load the entity recognizer")?,
                    );
                    gazetteer = Some(loaded.clone());
                    loaded
                }
            }
        } else {
            Arc::new(StaticRecognizer::new(
                scenario
                    .mentions
                    .iter()
                    .map(|m| EntityMention::new(&m.text, EntityLabel::from_code(&m.label)))
                    .collect(),
            ))
        };

        let mut pipeline = Pipeline::from_config(recognizer, &config.extraction, None);
        if !scenario.types.is_empty() {
            let pairs: Vec<(&str, &str)> = scenario
                .types
                .iter()
                .map(|(text, kind)| (text.as_str(), kind.as_str()))
                .collect();
            pipeline = pipeline.with_refiner(
                EntityTypeRefiner::new().with_classifier(Arc::new(FixedTypeClassifier::new(&pairs))),
            );
        }

        let (graph, _) = pipeline.run(&scenario.text, KnowledgeGraph::new()).await?;
        let metrics = evaluate_relations(&graph, &scenario.expected);
        println!("{:<24} {}", scenario.name, metrics.summary());
        total.add(&metrics);
    }

    println!("{:<24} {}", "overall", total.summary());
    Ok(())
}
