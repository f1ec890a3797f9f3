//! Ground-truth input generator for deterministic scenarios.
//!
//! Synthesizes sentences, token lists, and embedding matrices from a seed,
//! so every scenario input is reproducible by seed number. Corruption
//! helpers inject the malformed shapes the sanitizer must absorb.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Word pool for synthetic sentences.
const WORDS: [&str; 16] = [
    "the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog", "model",
    "reads", "every", "token", "slowly", "then", "predicts", "one",
];

/// Seeded generator for scenario inputs.
pub struct EmbeddingOracle {
    rng: ChaCha8Rng,
}

impl EmbeddingOracle {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Produces a sentence and its token list.
    ///
    /// Tokens after the first carry a leading space, matching how the
    /// tokenizer's display tokens come back from the service.
    pub fn sentence(&mut self, num_tokens: usize) -> (String, Vec<String>) {
        let mut tokens = Vec::with_capacity(num_tokens);
        for i in 0..num_tokens {
            let word = WORDS[self.rng.gen_range(0..WORDS.len())];
            if i == 0 {
                tokens.push(word.to_string());
            } else {
                tokens.push(format!(" {}", word));
            }
        }
        let sentence: String = tokens.concat();
        (sentence, tokens)
    }

    /// Gaussian embedding matrix: `num_tokens` rows of `dim` columns.
    ///
    /// `spread` scales the distribution the way deeper layers inflate
    /// hidden-state magnitudes.
    pub fn embedding_batch(&mut self, num_tokens: usize, dim: usize, spread: f64) -> Vec<Vec<f64>> {
        // Clamped to a positive std dev, so construction cannot fail
        let normal = Normal::new(0.0, spread.abs().max(1e-12)).expect("positive std dev");
        (0..num_tokens)
            .map(|_| (0..dim).map(|_| normal.sample(&mut self.rng)).collect())
            .collect()
    }

    /// The canonical hand-written batch: every vector zero except the first
    /// component.
    pub fn one_hot_batch(num_tokens: usize, dim: usize) -> Vec<Vec<f64>> {
        (0..num_tokens)
            .map(|_| {
                let mut v = vec![0.0; dim];
                if dim > 0 {
                    v[0] = 1.0;
                }
                v
            })
            .collect()
    }

    /// A batch of identical vectors (fully degenerate cloud).
    pub fn constant_batch(num_tokens: usize, dim: usize, value: f64) -> Vec<Vec<f64>> {
        (0..num_tokens).map(|_| vec![value; dim]).collect()
    }

    /// Plants a NaN at `[vector_idx][dim_idx]`; out-of-range indices are
    /// ignored.
    pub fn inject_nan(batch: &mut [Vec<f64>], vector_idx: usize, dim_idx: usize) {
        if let Some(v) = batch.get_mut(vector_idx) {
            if let Some(slot) = v.get_mut(dim_idx) {
                *slot = f64::NAN;
            }
        }
    }

    /// Plants an infinity at `[vector_idx][dim_idx]`; out-of-range indices
    /// are ignored.
    pub fn inject_inf(batch: &mut [Vec<f64>], vector_idx: usize, dim_idx: usize) {
        if let Some(v) = batch.get_mut(vector_idx) {
            if let Some(slot) = v.get_mut(dim_idx) {
                *slot = f64::INFINITY;
            }
        }
    }
}
