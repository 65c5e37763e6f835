use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::errors::RagError;
use crate::pipeline::Collaborator;

/// Vector-store namespace isolating this system's vectors
pub const DEFAULT_NAMESPACE: &str = "computeless-rag";
/// Nearest-neighbour matches requested per query
pub const DEFAULT_TOP_K: usize = 3;
/// Output-token budget for answer generation
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_SECRET_ID: &str = "pineconeApiKey";
pub const DEFAULT_EMBEDDING_MODEL: &str = "amazon.titan-embed-text-v1";
pub const DEFAULT_GENERATION_MODEL: &str = "anthropic.claude-3-haiku-20240307-v1:0";
pub const DEFAULT_ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub backtrace: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            backtrace: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-call timeout for every collaborator request, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretsConfig {
    pub endpoint: String,
    #[serde(default = "default_secret_id")]
    pub secret_id: String,
    /// Extra static headers sent with every request (gateway auth and the like)
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

fn default_secret_id() -> String {
    DEFAULT_SECRET_ID.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    pub endpoint: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    /// Expected vector length; responses of any other length are rejected
    #[serde(default)]
    pub dimension: Option<usize>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    pub endpoint: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

const fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub endpoint: String,
    #[serde(default = "default_generation_model")]
    pub model: String,
    #[serde(default = "default_anthropic_version")]
    pub anthropic_version: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

fn default_generation_model() -> String {
    DEFAULT_GENERATION_MODEL.to_string()
}

fn default_anthropic_version() -> String {
    DEFAULT_ANTHROPIC_VERSION.to_string()
}

const fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Persona the model answers as
    #[serde(default = "default_assistant_role")]
    pub assistant_role: String,
}

fn default_assistant_role() -> String {
    "HR assistant".to_string()
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            assistant_role: default_assistant_role(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub enable_cors: bool,
    /// Upper bound on queries served at once
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_concurrency() -> usize {
    64
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            enable_cors: false,
            max_concurrency: default_max_concurrency(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub http: HttpConfig,
    pub secrets: SecretsConfig,
    pub embeddings: EmbeddingsConfig,
    pub vector_store: VectorStoreConfig,
    pub generation: GenerationConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default config file path
    pub fn load() -> crate::Result<Self> {
        // Try to load from config.toml first, then fall back to config.example.toml
        if Path::new("config.toml").exists() {
            Self::from_file("config.toml")
        } else if Path::new("config.example.toml").exists() {
            eprintln!(
                "Warning: Using config.example.toml. Please create config.toml for production use."
            );
            Self::from_file("config.example.toml")
        } else {
            Err(RagError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No config file found. Please create config.toml or config.example.toml",
            )))
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        for collaborator in Collaborator::ALL {
            if self.endpoint(collaborator).trim().is_empty() {
                return Err(RagError::ConfigError(format!(
                    "endpoint for {collaborator} must not be empty"
                )));
            }
        }
        if self.vector_store.top_k == 0 {
            return Err(RagError::ConfigError(
                "vector_store.top_k must be at least 1".to_string(),
            ));
        }
        if self.vector_store.namespace.trim().is_empty() {
            return Err(RagError::ConfigError(
                "vector_store.namespace must not be empty".to_string(),
            ));
        }
        if self.generation.max_tokens == 0 {
            return Err(RagError::ConfigError(
                "generation.max_tokens must be at least 1".to_string(),
            ));
        }
        if self.embeddings.dimension == Some(0) {
            return Err(RagError::ConfigError(
                "embeddings.dimension must be at least 1 when set".to_string(),
            ));
        }
        if self.http.timeout_secs == 0 {
            return Err(RagError::ConfigError(
                "http.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Base URL for a collaborator
    pub fn endpoint(&self, collaborator: Collaborator) -> &str {
        match collaborator {
            Collaborator::SecretStore => &self.secrets.endpoint,
            Collaborator::EmbeddingModel => &self.embeddings.endpoint,
            Collaborator::VectorStore => &self.vector_store.endpoint,
            Collaborator::GenerationModel => &self.generation.endpoint,
        }
    }

    /// Static headers configured for a collaborator
    pub fn extra_headers(&self, collaborator: Collaborator) -> &BTreeMap<String, String> {
        match collaborator {
            Collaborator::SecretStore => &self.secrets.headers,
            Collaborator::EmbeddingModel => &self.embeddings.headers,
            Collaborator::VectorStore => &self.vector_store.headers,
            Collaborator::GenerationModel => &self.generation.headers,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            http: HttpConfig::default(),
            secrets: SecretsConfig {
                endpoint: "https://secretsmanager.us-east-1.amazonaws.com".to_string(),
                secret_id: default_secret_id(),
                headers: BTreeMap::new(),
            },
            embeddings: EmbeddingsConfig {
                endpoint: "https://bedrock-runtime.us-east-1.amazonaws.com".to_string(),
                model: default_embedding_model(),
                dimension: None,
                headers: BTreeMap::new(),
            },
            vector_store: VectorStoreConfig {
                endpoint: "https://your-index.svc.pinecone.io".to_string(),
                namespace: default_namespace(),
                top_k: DEFAULT_TOP_K,
                headers: BTreeMap::new(),
            },
            generation: GenerationConfig {
                endpoint: "https://bedrock-runtime.us-east-1.amazonaws.com".to_string(),
                model: default_generation_model(),
                anthropic_version: default_anthropic_version(),
                max_tokens: DEFAULT_MAX_TOKENS,
                headers: BTreeMap::new(),
            },
            prompt: PromptConfig::default(),
            server: ServerConfig::default(),
        }
    }
}
