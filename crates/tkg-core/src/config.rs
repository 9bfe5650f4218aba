//! TKG Configuration Management
//!
//! Handles configuration from environment variables and TOML files
//! with sensible defaults for local development.
//!
//! Author: hephaex@gmail.com

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Default interview participants
    pub speakers: SpeakerConfig,

    /// Graph store connection
    pub graph: GraphConfig,

    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Context retrieval configuration
    pub retrieval: RetrievalConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Speakers
        if let Ok(name) = std::env::var("TKG_INTERVIEWER") {
            config.speakers.interviewer = name;
        }
        if let Ok(name) = std::env::var("TKG_INTERVIEWEE") {
            config.speakers.interviewee = name;
        }

        // Graph store
        if let Ok(backend) = std::env::var("GRAPH_BACKEND") {
            config.graph.backend = backend.parse()?;
        }
        if let Ok(url) = std::env::var("SURREALDB_URL") {
            config.graph.surrealdb_url = url;
        }
        if let Ok(user) = std::env::var("SURREALDB_USER") {
            config.graph.surrealdb_user = user;
        }
        if let Ok(pass) = std::env::var("SURREALDB_PASS") {
            config.graph.surrealdb_pass = pass;
        }

        // LLM
        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            config.llm.provider = provider.parse()?;
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            config.llm.openai_api_key = Some(key);
        }
        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            config.llm.openai_base_url = Some(url);
        }
        if let Ok(url) = std::env::var("OLLAMA_URL") {
            config.llm.ollama_url = url;
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            config.llm.model = model;
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::ParseError { message, .. } => ConfigError::ParseError { path, message },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from("<inline>"),
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;
        let defaults = Self::default();

        // Only override if env values differ from defaults
        if env_config.speakers.interviewer != defaults.speakers.interviewer {
            self.speakers.interviewer = env_config.speakers.interviewer;
        }
        if env_config.speakers.interviewee != defaults.speakers.interviewee {
            self.speakers.interviewee = env_config.speakers.interviewee;
        }
        if env_config.graph.backend != defaults.graph.backend {
            self.graph.backend = env_config.graph.backend;
        }
        if env_config.graph.surrealdb_url != defaults.graph.surrealdb_url {
            self.graph.surrealdb_url = env_config.graph.surrealdb_url;
        }
        if env_config.llm.provider != defaults.llm.provider {
            self.llm.provider = env_config.llm.provider;
        }
        if env_config.llm.model != defaults.llm.model {
            self.llm.model = env_config.llm.model;
        }
        if env_config.logging.level != defaults.logging.level {
            self.logging.level = env_config.logging.level;
        }

        // Always use env for sensitive values
        if env_config.llm.openai_api_key.is_some() {
            self.llm.openai_api_key = env_config.llm.openai_api_key;
        }
        if env_config.graph.surrealdb_pass != defaults.graph.surrealdb_pass {
            self.graph.surrealdb_pass = env_config.graph.surrealdb_pass;
        }

        Ok(self)
    }
}

/// Default interview participants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeakerConfig {
    /// Identity substituted for first-person pronouns
    pub interviewer: String,

    /// Identity substituted for third-person pronouns
    pub interviewee: String,
}

impl Default for SpeakerConfig {
    fn default() -> Self {
        Self {
            interviewer: "Interviewer".to_string(),
            interviewee: "Speaker".to_string(),
        }
    }
}

impl From<&SpeakerConfig> for crate::Speakers {
    fn from(config: &SpeakerConfig) -> Self {
        crate::Speakers::new(config.interviewer.clone(), config.interviewee.clone())
    }
}

/// Graph store connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Which store implementation to use
    pub backend: GraphBackend,

    /// SurrealDB WebSocket URL
    pub surrealdb_url: String,

    /// SurrealDB username
    pub surrealdb_user: String,

    /// SurrealDB password
    pub surrealdb_pass: String,

    /// SurrealDB namespace
    pub surrealdb_namespace: String,

    /// SurrealDB database name
    pub surrealdb_database: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            backend: GraphBackend::Memory,
            surrealdb_url: "ws://localhost:8000".to_string(),
            surrealdb_user: "root".to_string(),
            surrealdb_pass: "root".to_string(),
            surrealdb_namespace: "tkg".to_string(),
            surrealdb_database: "interviews".to_string(),
        }
    }
}

/// Supported graph store backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphBackend {
    Memory,
    SurrealDb,
}

impl std::str::FromStr for GraphBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "surrealdb" => Ok(Self::SurrealDb),
            _ => Err(ConfigError::InvalidValue {
                key: "GRAPH_BACKEND".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// LLM provider to use
    pub provider: LlmProvider,

    /// OpenAI API key
    pub openai_api_key: Option<String>,

    /// OpenAI API base URL (for compatible APIs)
    pub openai_base_url: Option<String>,

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
            provider: LlmProvider::Ollama,
            openai_api_key: None,
            openai_base_url: None,
            ollama_url: "http://localhost:11434".to_string(),
            model: "deepseek-r1:1.5b".to_string(),
            max_tokens: 2048,
            temperature: 0.2,
            timeout_secs: 120,
        }
    }
}

/// Supported LLM providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    OpenAI,
    Ollama,
}

impl std::str::FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            _ => Err(ConfigError::InvalidValue {
                key: "LLM_PROVIDER".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Context retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Maximum number of triples placed in one context string
    pub max_context_triples: usize,

    /// Number of memoised query -> subjects entries
    pub subject_cache_capacity: u64,

    /// Sentences per chunk for LLM ingestion
    pub chunk_sentences: usize,

    /// Sentences shared between consecutive chunks
    pub chunk_overlap: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_context_triples: 50,
            subject_cache_capacity: 1_000,
            chunk_sentences: 4,
            chunk_overlap: 1,
        }
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
