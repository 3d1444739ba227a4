use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Sampling parameters for one kind of chat request (optional sections in config.toml).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Sampling temperature passed as `options.temperature`.
    pub temperature: f32,
    /// Output-length ceiling passed as `options.num_predict`.
    pub num_predict: u32,
}

impl GenerationConfig {
    /// Low temperature and a generous ceiling for the synthesized answer.
    pub fn answer() -> Self {
        Self {
            temperature: 0.2,
            num_predict: 16000,
        }
    }

    /// Higher temperature and a short ceiling for the title.
    pub fn title() -> Self {
        Self {
            temperature: 0.7,
            num_predict: 100,
        }
    }
}

fn default_answer() -> GenerationConfig {
    GenerationConfig::answer()
}

fn default_title() -> GenerationConfig {
    GenerationConfig::title()
}

fn default_title_system_prompt() -> String {
    "You are a helpful assistant that generates concise titles.".to_string()
}

fn default_artifact_extension() -> String {
    "txt".to_string()
}

/// Global configuration loaded from `~/.config/websum/config.toml`.
///
/// Loaded once at startup and passed by reference into every pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebsumConfig {
    /// Page fetched for every query (no real search is performed).
    pub search_url: String,
    /// Base URL of the Ollama server, e.g. `http://localhost:11434`.
    pub ollama_url: String,
    /// Model name sent with every chat request.
    pub ollama_model: String,
    /// System message for the answer request.
    pub system_prompt: String,
    /// Answer prompt template; `{query}` and `{texts}` are substituted.
    pub user_prompt: String,
    /// Title prompt template; `{content}` is substituted with the answer.
    pub title_prompt: String,
    /// Directory where answers are saved (created if missing).
    pub output_directory: PathBuf,
    /// System message for the title request.
    #[serde(default = "default_title_system_prompt")]
    pub title_system_prompt: String,
    /// File extension of saved answers, without the dot.
    #[serde(default = "default_artifact_extension")]
    pub artifact_extension: String,
    #[serde(default = "default_answer")]
    pub answer: GenerationConfig,
    #[serde(default = "default_title")]
    pub title: GenerationConfig,
}

impl Default for WebsumConfig {
    fn default() -> Self {
        Self {
            search_url: "https://text.npr.org/".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3.1".to_string(),
            system_prompt: "You are a research assistant. Answer the user's question using \
                            only the provided sources, and say so when they do not cover it."
                .to_string(),
            user_prompt: "Question: {query}\n\nSources:\n{texts}\n\nAnswer the question."
                .to_string(),
            title_prompt: "Write a short title (at most eight words) for the following text. \
                           Reply with the title only.\n\n{content}"
                .to_string(),
            output_directory: PathBuf::from("summaries"),
            title_system_prompt: default_title_system_prompt(),
            artifact_extension: default_artifact_extension(),
            answer: GenerationConfig::answer(),
            title: GenerationConfig::title(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("websum")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Read and parse a config file at an explicit path.
pub fn load_from_path(path: &Path) -> Result<WebsumConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: WebsumConfig = toml::from_str(&data)
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<WebsumConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = WebsumConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from_path(&path)
}
