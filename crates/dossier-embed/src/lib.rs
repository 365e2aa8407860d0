//! dossier-embed
//!
//! Embedding providers behind `dossier_core::traits::Embedder`: a candle
//! BERT model loaded from a local sentence-transformers directory, and a
//! deterministic hashed stand-in for tests and offline work.
//! `default_embedder` selects between them via `APP_USE_FAKE_EMBEDDINGS`.

pub mod device;
pub mod hashed;
pub mod pool;
pub mod tokenize;

pub use hashed::HashedEmbedder;

use anyhow::{anyhow, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use dossier_core::config::{expand_path, EmbeddingSettings};
use dossier_core::traits::Embedder;
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;
use tracing::info;

/// BERT encoder with masked mean pooling, the layout used by
/// sentence-transformers/all-MiniLM-L6-v2: `tokenizer.json`, `config.json`
/// and either `model.safetensors` or `pytorch_model.bin`.
pub struct BertEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    max_len: usize,
}

impl BertEmbedder {
    pub fn from_dir(model_dir: &Path, max_len: usize) -> Result<Self> {
        let device = device::select_device();

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e)
        })?;

        let config_path = model_dir.join("config.json");
        let config: BertConfig = serde_json::from_str(&std::fs::read_to_string(&config_path)?)?;
        let dim = config.hidden_size;

        let vb = load_weights(model_dir, &device)?;
        let model = BertModel::load(vb, &config)?;
        info!(model_dir = %model_dir.display(), dim, "embedding model loaded");
        Ok(Self { model, tokenizer, device, dim, max_len })
    }

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let (input_ids, attention_mask) =
            tokenize::tokenize_on_device(&self.tokenizer, text, self.max_len, 0, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = pool::masked_mean_l2(&hidden, &attention_mask)?;
        let emb = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1::<f32>()?;
        Ok(emb)
    }
}

impl Embedder for BertEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn max_len(&self) -> usize {
        self.max_len
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed_one(t)).collect()
    }
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        let tensors = candle_core::safetensors::load(&safetensors, device)?;
        return Ok(VarBuilder::from_tensors(tensors, DType::F32, device));
    }
    let pytorch = model_dir.join("pytorch_model.bin");
    if pytorch.exists() {
        let weights = candle_core::pickle::read_all(&pytorch)?;
        let map: std::collections::HashMap<String, Tensor> = weights.into_iter().collect();
        return Ok(VarBuilder::from_tensors(map, DType::F32, device));
    }
    Err(anyhow!(
        "No model.safetensors or pytorch_model.bin under {}",
        model_dir.display()
    ))
}

/// Build the configured embedder. `APP_USE_FAKE_EMBEDDINGS=1` (or `true`)
/// selects the hashed embedder at the configured dimension.
pub fn default_embedder(settings: &EmbeddingSettings) -> Result<Box<dyn Embedder>> {
    let use_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if use_fake {
        info!(dim = settings.dimension, "using hashed embeddings");
        return Ok(Box::new(HashedEmbedder::new(settings.dimension)));
    }

    let model_dir = match &settings.model_dir {
        Some(dir) => {
            let p = expand_path(dir);
            if !p.exists() {
                return Err(anyhow!("Configured model_dir does not exist: {}", p.display()));
            }
            p
        }
        None => resolve_model_dir()?,
    };
    Ok(Box::new(BertEmbedder::from_dir(&model_dir, settings.max_len)?))
}

fn resolve_model_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("APP_MODEL_DIR") {
        let p = PathBuf::from(&dir);
        if p.exists() {
            info!(dir = %p.display(), "using APP_MODEL_DIR");
            return Ok(p);
        }
    }
    if let Ok(dir) = std::env::var("MODEL_DIR") {
        let p = PathBuf::from(&dir);
        if p.exists() {
            info!(dir = %p.display(), "using MODEL_DIR");
            return Ok(p);
        }
    }
    for candidate in ["models/all-MiniLM-L6-v2", "../models/all-MiniLM-L6-v2"] {
        let p = Path::new(candidate);
        if p.exists() {
            info!(dir = %p.display(), "using model dir");
            return Ok(p.to_path_buf());
        }
    }
    Err(anyhow!("Could not locate the embedding model directory"))
}
