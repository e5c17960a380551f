//! Configuration for the IntelliJect service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable naming an optional TOML config file
pub const CONFIG_PATH_ENV: &str = "INTELLIJECT_CONFIG";

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Provider backend (openai or ollama)
    pub backend: BackendProvider,
    /// Server configuration
    pub server: ServerConfig,
    /// OpenAI-compatible API configuration
    pub openai: OpenAiConfig,
    /// Ollama configuration
    pub ollama: OllamaConfig,
    /// Record store configuration
    pub database: DatabaseConfig,
    /// Matching pipeline configuration
    pub pipeline: PipelineConfig,
}

/// Backend provider selection
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendProvider {
    /// Hosted OpenAI-compatible API (chat completions + embeddings)
    #[default]
    OpenAi,
    /// Local Ollama server
    Ollama,
}

impl std::str::FromStr for BackendProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            other => Err(Error::Config(format!("Unknown backend: {}", other))),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 50MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
            max_upload_size: 50 * 1024 * 1024,
        }
    }
}

/// OpenAI-compatible API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API base URL
    pub base_url: String,
    /// API key (usually from OPENAI_API_KEY)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Chat model used for subtopics and answer extraction
    pub chat_model: String,
    /// Embedding model
    pub embed_model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            chat_model: "gpt-3.5-turbo".to_string(),
            embed_model: "text-embedding-ada-002".to_string(),
            temperature: 0.0,
            timeout_secs: 60,
            max_retries: 2,
        }
    }
}

/// Ollama configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Embedding model name
    pub embed_model: String,
    /// Generation model name
    pub generate_model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            generate_model: "phi3".to_string(),
            temperature: 0.0,
            timeout_secs: 120,
            max_retries: 2,
        }
    }
}

/// Record store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("intelliject")
            .join("intelliject.db");

        Self { path }
    }
}

/// Matching pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of related questions retrieved per chunk
    pub top_k: usize,
    /// Subtopic used when inference fails
    pub default_subtopic: String,
    /// Rendering resolution for highlighted page images
    pub render_dpi: u32,
    /// Sentences per chunk when matching free-text notes
    pub note_sentences_per_chunk: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            default_subtopic: "General".to_string(),
            render_dpi: 150,
            note_sentences_per_chunk: 5,
        }
    }
}

impl AppConfig {
    /// Load configuration: `.env`, then the optional TOML file named by
    /// `INTELLIJECT_CONFIG`, then environment overrides.
    pub fn load() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!("No .env file loaded: {}", e);
        }

        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Apply environment overrides using the given lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.openai.api_key = Some(key);
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            self.openai.base_url = url;
        }
        if let Some(path) = lookup("DATABASE_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(host) = lookup("INTELLIJECT_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("INTELLIJECT_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| Error::Config(format!("Invalid INTELLIJECT_PORT: {}", port)))?;
        }
        if let Some(backend) = lookup("INTELLIJECT_BACKEND") {
            self.backend = backend.parse()?;
        }
        Ok(())
    }

    /// Reject configurations the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.backend == BackendProvider::OpenAi && self.openai.api_key.is_none() {
            return Err(Error::Config(
                "OpenAI backend selected but OPENAI_API_KEY is not set".to_string(),
            ));
        }
        if self.pipeline.top_k == 0 {
            return Err(Error::Config("pipeline.top_k must be at least 1".to_string()));
        }
        if self.pipeline.render_dpi == 0 {
            return Err(Error::Config("pipeline.render_dpi must be positive".to_string()));
        }
        if self.pipeline.note_sentences_per_chunk == 0 {
            return Err(Error::Config(
                "pipeline.note_sentences_per_chunk must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Chat/generation model for the configured backend
    pub fn generation_model(&self) -> &str {
        match self.backend {
            BackendProvider::OpenAi => &self.openai.chat_model,
            BackendProvider::Ollama => &self.ollama.generate_model,
        }
    }

    /// Embedding model for the configured backend
    pub fn embedding_model(&self) -> &str {
        match self.backend {
            BackendProvider::OpenAi => &self.openai.embed_model,
            BackendProvider::Ollama => &self.ollama.embed_model,
        }
    }
}
