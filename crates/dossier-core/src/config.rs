//! Configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env
//! vars, then extracts the typed [`Settings`] sections. Helpers expand `~`
//! and `${VAR}` and resolve relative paths against a known base directory.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        Ok(Self { figment })
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn extract<T>(&self) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to extract configuration: {}", e))
    }
}

/// The typed view over the merged configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub embedding: EmbeddingSettings,
    pub retrieval: RetrievalSettings,
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        Config::load()?.extract()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Directory scanned for `.md`/`.markdown`/`.txt` corpus files.
    pub corpus_dir: String,
    /// LanceDB database directory.
    pub store_dir: String,
    /// Chunk table name.
    pub table: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            corpus_dir: "corpus".to_string(),
            store_dir: "data/lancedb".to_string(),
            table: "document_chunks".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Local model directory; `None` falls back to env vars / `./models`.
    pub model_dir: Option<String>,
    pub dimension: usize,
    pub max_len: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self { model_dir: None, dimension: 384, max_len: 256 }
    }
}

/// Retrieval knobs. Defaults mirror the scenario definitions; the scan
/// caps bound how many entity-matched chunks are considered.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub seed_top_k: usize,
    pub scenario1_top_k: usize,
    pub entity_chunks: usize,
    pub document_chunks: usize,
    pub entity_scan_cap: usize,
    pub expansion_scan_cap: usize,
    pub per_document_cap: usize,
    pub expansion_max: usize,
    pub min_chunks: usize,
    pub max_chunks: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            seed_top_k: 3,
            scenario1_top_k: 5,
            entity_chunks: 2,
            document_chunks: 2,
            entity_scan_cap: 100,
            expansion_scan_cap: 50,
            per_document_cap: 3,
            expansion_max: 10,
            min_chunks: 3,
            max_chunks: 6,
        }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    // Expand ~ at start
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() {
        p
    } else {
        base.join(p)
    }
}
