//! Configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults, `config.toml`, `config.<env>.toml`
//! and `APP_*` env vars (nested keys split on `__`, e.g.
//! `APP_RETRIEVAL__FUSION_ALPHA=0.5`). Provides helpers to expand `~` and
//! `${VAR}` and to resolve relative paths against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Retrieval tunables. Passed explicitly into index and fuser construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub vector_candidate_k: usize,
    pub bm25_candidate_k: usize,
    pub fusion_alpha: f64,
    pub bm25_k1: f64,
    pub bm25_b: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            vector_candidate_k: 50,
            bm25_candidate_k: 50,
            fusion_alpha: 0.70,
            bm25_k1: 1.5,
            bm25_b: 0.75,
        }
    }
}

impl RetrievalConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.fusion_alpha) {
            return Err(Error::InvalidConfig(format!(
                "fusion_alpha must be within [0, 1], got {}",
                self.fusion_alpha
            )));
        }
        if !self.bm25_k1.is_finite() || self.bm25_k1 < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "bm25_k1 must be finite and >= 0, got {}",
                self.bm25_k1
            )));
        }
        if !(0.0..=1.0).contains(&self.bm25_b) {
            return Err(Error::InvalidConfig(format!(
                "bm25_b must be within [0, 1], got {}",
                self.bm25_b
            )));
        }
        Ok(())
    }
}

/// Aliases that name the same thing, e.g. a product sold under two names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymGroup {
    pub canonical: String,
    pub aliases: Vec<String>,
    #[serde(default)]
    pub note: String,
}

/// Output width of the built-in embedder unless `corpus.embedding_dim` says otherwise.
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    pub dir: String,
    pub embedding_dim: usize,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self { dir: "data/corpus".to_string(), embedding_dim: DEFAULT_EMBEDDING_DIM }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub retrieval: RetrievalConfig,
    pub synonyms: Vec<SynonymGroup>,
    pub corpus: CorpusConfig,
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?.retrieval.validate()?;
        Ok(config)
    }

    /// Wrap an already-assembled figment; defaults are merged underneath.
    pub fn from_figment(figment: Figment) -> Self {
        Self { figment: Figment::from(Serialized::defaults(Settings::default())).merge(figment) }
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{}': {}", key, e)))
    }

    pub fn settings(&self) -> Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| Error::InvalidConfig(format!("Failed to extract settings: {}", e)))
    }

    pub fn retrieval(&self) -> Result<RetrievalConfig> {
        let retrieval: RetrievalConfig = self.get("retrieval")?;
        retrieval.validate()?;
        Ok(retrieval)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
