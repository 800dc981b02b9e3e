use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::RagError;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_EMBED_MODEL: &str = "text-embedding-ada-002";

/// Optional keys read from `config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    openai_api_key: Option<String>,
    api_base: Option<String>,
    llm_model: Option<String>,
    temperature: Option<f32>,
    embed_model: Option<String>,
    chunk_size: Option<usize>,
    chunk_overlap: Option<usize>,
    embed_batch_size: Option<usize>,
}

/// Credential, endpoint and model settings shared by ingestion and querying.
#[derive(Clone)]
pub struct RagConfig {
    pub api_key: String,
    pub api_base: String,
    pub llm_model: String,
    pub temperature: f32,
    pub embed_model: String,
    /// Target chunk size in estimated tokens.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in estimated tokens.
    pub chunk_overlap: usize,
    pub embed_batch_size: usize,
}

impl fmt::Debug for RagConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RagConfig")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("llm_model", &self.llm_model)
            .field("temperature", &self.temperature)
            .field("embed_model", &self.embed_model)
            .field("chunk_size", &self.chunk_size)
            .field("chunk_overlap", &self.chunk_overlap)
            .field("embed_batch_size", &self.embed_batch_size)
            .finish()
    }
}

impl RagConfig {
    /// Defaults for everything but the credential.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            temperature: 0.1,
            embed_model: DEFAULT_EMBED_MODEL.to_string(),
            chunk_size: 1024,
            chunk_overlap: 20,
            embed_batch_size: 100,
        }
    }

    /// Resolve the configuration from the config file and the environment.
    ///
    /// The key in the config file wins over `OPENAI_API_KEY`; `OPENAI_API_BASE`
    /// wins over the file's `api_base`.
    pub fn load() -> Result<Self, RagError> {
        let file = match config_file_path() {
            Some(path) => Some(read_config_file(&path)?),
            None => None,
        };
        resolve(
            file.unwrap_or_default(),
            non_empty_env("OPENAI_API_KEY"),
            non_empty_env("OPENAI_API_BASE"),
        )
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

/// Config file location: `$CATALOG_QA_CONFIG`, else `./config.toml`, else
/// `{config_dir}/catalog-qa/config.toml`. Only existing files are returned.
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("CATALOG_QA_CONFIG") {
        return Some(PathBuf::from(p));
    }
    let local = PathBuf::from("config.toml");
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|d| d.join("catalog-qa").join("config.toml"))
        .filter(|p| p.is_file())
}

fn read_config_file(path: &Path) -> Result<ConfigFile, RagError> {
    let raw = std::fs::read_to_string(path)?;
    toml::from_str(&raw).map_err(|source| RagError::Config {
        path: path.to_path_buf(),
        source,
    })
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn resolve(
    file: ConfigFile,
    env_key: Option<String>,
    env_base: Option<String>,
) -> Result<RagConfig, RagError> {
    let api_key = file
        .openai_api_key
        .filter(|k| !k.trim().is_empty())
        .or(env_key)
        .ok_or(RagError::MissingApiKey)?;

    let mut config = RagConfig::with_api_key(api_key);
    if let Some(base) = env_base.or(file.api_base) {
        config.api_base = base.trim_end_matches('/').to_string();
    }
    if let Some(m) = file.llm_model {
        config.llm_model = m;
    }
    if let Some(t) = file.temperature {
        config.temperature = t;
    }
    if let Some(m) = file.embed_model {
        config.embed_model = m;
    }
    if let Some(n) = file.chunk_size {
        config.chunk_size = n.max(1);
    }
    if let Some(n) = file.chunk_overlap {
        config.chunk_overlap = n;
    }
    if let Some(n) = file.embed_batch_size {
        config.embed_batch_size = n.max(1);
    }
    Ok(config)
}
