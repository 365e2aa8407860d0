use dossier_core::config::EmbeddingSettings;
use dossier_core::traits::Embedder;
use dossier_embed::{default_embedder, HashedEmbedder};

#[test]
fn hashed_embedder_shapes_and_determinism() {
    let embedder = HashedEmbedder::new(384);
    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(embedder.dim(), 384);
    assert_eq!(v1.len(), 384, "embedding dim is 384");

    // Norm approximately 1.0
    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    // Deterministic for same input
    for (a, b) in v1.iter().zip(v2.iter()) {
        assert!((a - b).abs() <= 1e-6);
    }
}

#[test]
fn different_texts_differ() {
    let embedder = HashedEmbedder::new(64);
    let embs = embedder
        .embed_batch(&["quarterly earnings report".to_string(), "harbor excursion".to_string()])
        .expect("embed_batch");

    assert_ne!(embs[0], embs[1]);
}

#[test]
fn empty_text_is_finite() {
    let embedder = HashedEmbedder::new(16);
    let embs = embedder.embed_batch(&[String::new()]).expect("embed_batch");
    assert!(embs[0].iter().all(|x| x.is_finite()));
}

#[test]
fn default_embedder_honors_fake_switch() {
    // Force the hashed embedder to avoid loading model weights
    std::env::set_var("APP_USE_FAKE_EMBEDDINGS", "1");

    let settings = EmbeddingSettings::default();
    let embedder = default_embedder(&settings).expect("embedder");
    assert_eq!(embedder.dim(), settings.dimension);

    let embs = embedder.embed_batch(&["case file".to_string()]).expect("embed_batch");
    assert_eq!(embs[0].len(), settings.dimension);
}
