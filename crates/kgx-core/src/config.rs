//! KGX Configuration Management
//!
//! Handles configuration from environment variables and TOML files
//! with sensible defaults for a single local extraction run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Extraction pipeline configuration
    pub extraction: ExtractionConfig,

    /// Export configuration
    pub output: OutputConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        self.apply_env()?;
        Ok(self)
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        // LLM
        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            self.llm.provider = provider.parse()?;
        }
        let key_var = match self.llm.provider {
            LlmProvider::Groq => Some("GROQ_API_KEY"),
            LlmProvider::OpenAI => Some("OPENAI_API_KEY"),
            LlmProvider::Ollama => None,
        };
        if let Some(var) = key_var {
            if let Ok(key) = std::env::var(var) {
                if !key.trim().is_empty() {
                    self.llm.api_key = Some(key);
                }
            }
        }
        if let Ok(url) = std::env::var("LLM_BASE_URL") {
            self.llm.base_url = Some(url);
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Ok(timeout) = std::env::var("LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = timeout.parse().map_err(|_| ConfigError::InvalidValue {
                key: "LLM_TIMEOUT_SECS".to_string(),
                value: timeout,
            })?;
        }

        // Extraction
        if let Ok(path) = std::env::var("KGX_GAZETTEER") {
            self.extraction.gazetteer_path = PathBuf::from(path);
        }
        if let Ok(source) = std::env::var("KGX_SOURCE") {
            self.extraction.provenance_source = source;
        }

        // Output
        if let Ok(dir) = std::env::var("KGX_OUTPUT_DIR") {
            self.output.directory = PathBuf::from(dir);
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// LLM provider to use
    pub provider: LlmProvider,

    /// API key (Groq or OpenAI); absent means heuristic-only mode
    pub api_key: Option<String>,

    /// API base URL override (for compatible APIs)
    pub base_url: Option<String>,

    /// Ollama server URL
    pub ollama_url: String,

    /// Model name to use
    pub model: String,

    /// Maximum tokens for completion
    pub max_tokens: u32,

    /// Temperature for generation
    pub temperature: f32,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Groq,
            api_key: None,
            base_url: None,
            ollama_url: "http://localhost:11434".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            max_tokens: 256,
            temperature: 0.0,
            timeout_secs: 20,
        }
    }
}

impl LlmConfig {
    /// Default base URL for the configured provider
    pub fn resolved_base_url(&self) -> String {
        if let Some(url) = &self.base_url {
            return url.trim_end_matches('/').to_string();
        }
        match self.provider {
            LlmProvider::Groq => "https://api.groq.com/openai/v1".to_string(),
            LlmProvider::OpenAI => "https://api.openai.com/v1".to_string(),
            LlmProvider::Ollama => self.ollama_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Supported LLM providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Groq,
    OpenAI,
    Ollama,
}

impl std::str::FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "groq" => Ok(Self::Groq),
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            _ => Err(ConfigError::InvalidValue {
                key: "LLM_PROVIDER".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Extraction pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Characters kept on each side of the entity pair span
    pub context_window: usize,

    /// Recognizer model (gazetteer) file
    pub gazetteer_path: PathBuf,

    /// Predicates whose assertions get a reified statement
    pub reify_predicates: Vec<String>,

    /// Provenance recorded on every reified statement
    pub provenance_source: String,

    /// Staged input file read when no text is given on the command line
    pub staged_input: PathBuf,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            context_window: 50,
            gazetteer_path: PathBuf::from("demos/gazetteer.toml"),
            reify_predicates: ["teaches", "author", "about", "relatedTo", "worksAt"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
            provenance_source: "texte_exemple.txt".to_string(),
            staged_input: PathBuf::from("texte_temp.txt"),
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving every export
    pub directory: PathBuf,

    /// Turtle file name
    pub turtle_file: String,

    /// RDF/XML file name
    pub rdfxml_file: String,

    /// Graphviz DOT file name
    pub dot_file: String,

    /// Rendered image file name
    pub image_file: String,

    /// Remove exports left over from a previous run
    pub clean_previous: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            turtle_file: "knowledge_graph.ttl".to_string(),
            rdfxml_file: "knowledge_graph.xml".to_string(),
            dot_file: "graphe_connaissance.dot".to_string(),
            image_file: "graphe_connaissance.png".to_string(),
            clean_previous: true,
        }
    }
}

impl OutputConfig {
    pub fn turtle_path(&self) -> PathBuf {
        self.directory.join(&self.turtle_file)
    }

    pub fn rdfxml_path(&self) -> PathBuf {
        self.directory.join(&self.rdfxml_file)
    }

    pub fn dot_path(&self) -> PathBuf {
        self.directory.join(&self.dot_file)
    }

    pub fn image_path(&self) -> PathBuf {
        self.directory.join(&self.image_file)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
