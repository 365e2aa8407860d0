use dossier_core::traits::Embedder;
use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

/// Deterministic token-hash embedding for tests and offline development.
/// Tokens are hashed into dimension buckets; output is L2-normalized, so
/// identical text always produces the identical unit vector.
pub struct HashedEmbedder {
    dim: usize,
    max_len: usize,
}

impl HashedEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim, max_len: 256 }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        v
    }
}

impl Embedder for HashedEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn max_len(&self) -> usize {
        self.max_len
    }

    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}
