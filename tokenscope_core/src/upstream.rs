//! Payload types for the upstream inference service.
//!
//! The engine performs no network I/O. The host fetches the service's JSON
//! responses (tokenization, hidden states, attention weights, next-token
//! probabilities, residual-stream norms) and hands them over as data; this
//! module mirrors those shapes and converts them into [`AnimationInput`].
//! Numeric content is treated as untrusted until it passes the sanitizer.

use crate::engine::{AnimationInput, InputGeometry};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors at the payload conversion boundary.
///
/// Nothing past this boundary surfaces errors; the engine degrades to its
/// placeholder instead.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// Response body was not valid JSON for the expected shape
    #[error("malformed payload JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Token list and vector batch disagree on length
    #[error("token/vector count mismatch: {tokens} tokens, {vectors} vectors")]
    CountMismatch { tokens: usize, vectors: usize },
}

/// Parses one service response body.
pub fn parse<T: DeserializeOwned>(json: &str) -> Result<T, PayloadError> {
    Ok(serde_json::from_str(json)?)
}

/// Tokenization result: ids, display tokens, and the attention mask.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizeResponse {
    pub input_ids: Vec<i64>,
    pub tokens: Vec<String>,
    #[serde(default)]
    pub attention_mask: Vec<Vec<i64>>,
}

/// Hidden-state vectors from one model layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsResponse {
    pub embeddings: Vec<Vec<f64>>,
    pub layer: usize,
    #[serde(default)]
    pub num_tokens: Option<usize>,
    #[serde(default)]
    pub embedding_dim: Option<usize>,
}

/// Hidden states from every layer plus precomputed 3D coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsAllResponse {
    pub num_layers: usize,
    pub hidden_states: Vec<Vec<Vec<f64>>>,
    /// May be empty when the service's own projection failed
    #[serde(default)]
    pub embeddings3d: Vec<Vec<f64>>,
}

/// Attention weights: layers × heads × seq × seq.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttentionResponse {
    pub num_layers: usize,
    pub attentions: Vec<Vec<Vec<Vec<f64>>>>,
}

/// One candidate continuation and its probability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenProb {
    pub token: String,
    pub prob: f64,
}

/// Sampled next token plus the top-k distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextTokenResponse {
    pub token: String,
    pub token_id: i64,
    pub probability: f64,
    pub probs: Vec<TokenProb>,
}

/// Residual-stream norms per token per layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResidualStreamResponse {
    pub layer_values: Vec<Vec<f64>>,
    pub tokens: Vec<String>,
    pub num_layers: usize,
}

impl AnimationInput {
    /// Builds engine input from full-dimension hidden states.
    pub fn from_hidden_states(
        sentence: impl Into<String>,
        tokenize: &TokenizeResponse,
        embeddings: &EmbeddingsResponse,
    ) -> Result<Self, PayloadError> {
        if tokenize.tokens.len() != embeddings.embeddings.len() {
            return Err(PayloadError::CountMismatch {
                tokens: tokenize.tokens.len(),
                vectors: embeddings.embeddings.len(),
            });
        }
        Ok(Self::new(
            sentence,
            tokenize.tokens.clone(),
            InputGeometry::Embeddings(embeddings.embeddings.clone()),
        ))
    }

    /// Builds engine input from the service's precomputed 3D coordinates.
    ///
    /// An empty coordinate list is the service's "projection failed" signal
    /// and degrades to missing geometry rather than an error.
    pub fn from_projected(
        sentence: impl Into<String>,
        tokenize: &TokenizeResponse,
        all: &EmbeddingsAllResponse,
    ) -> Result<Self, PayloadError> {
        if all.embeddings3d.is_empty() {
            return Ok(Self::new(
                sentence,
                tokenize.tokens.clone(),
                InputGeometry::Missing,
            ));
        }
        if tokenize.tokens.len() != all.embeddings3d.len() {
            return Err(PayloadError::CountMismatch {
                tokens: tokenize.tokens.len(),
                vectors: all.embeddings3d.len(),
            });
        }
        Ok(Self::new(
            sentence,
            tokenize.tokens.clone(),
            InputGeometry::Points(all.embeddings3d.clone()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tokenize_response() {
        let body = r#"{
            "input_ids": [464, 2068, 7586],
            "tokens": ["The", " quick", " brown"],
            "attention_mask": [[1, 1, 1]]
        }"#;
        let parsed: TokenizeResponse = parse(body).unwrap();
        assert_eq!(parsed.tokens.len(), 3);
        assert_eq!(parsed.input_ids[0], 464);
        assert_eq!(parsed.attention_mask[0], vec![1, 1, 1]);
    }

    #[test]
    fn test_parse_next_token_response() {
        let body = r#"{
            "token": "fox",
            "token_id": 21831,
            "probability": 0.62,
            "probs": [
                {"token": "fox", "prob": 0.62},
                {"token": "dog", "prob": 0.11}
            ]
        }"#;
        let parsed: NextTokenResponse = parse(body).unwrap();
        assert_eq!(parsed.token, "fox");
        assert_eq!(parsed.probs.len(), 2);
        assert!(parsed.probs[0].prob > parsed.probs[1].prob);
    }

    #[test]
    fn test_parse_error_surface() {
        let err = parse::<TokenizeResponse>("not json").unwrap_err();
        assert!(matches!(err, PayloadError::Json(_)));
    }

    #[test]
    fn test_from_hidden_states_count_mismatch() {
        let tokenize = TokenizeResponse {
            input_ids: vec![1, 2],
            tokens: vec!["a".into(), "b".into()],
            attention_mask: vec![],
        };
        let embeddings = EmbeddingsResponse {
            embeddings: vec![vec![0.0; 8]],
            layer: 0,
            num_tokens: Some(1),
            embedding_dim: Some(8),
        };
        let err = AnimationInput::from_hidden_states("ab", &tokenize, &embeddings).unwrap_err();
        assert!(matches!(
            err,
            PayloadError::CountMismatch {
                tokens: 2,
                vectors: 1
            }
        ));
    }

    #[test]
    fn test_from_projected_empty_coordinates_degrade() {
        let tokenize = TokenizeResponse {
            input_ids: vec![1],
            tokens: vec!["a".into()],
            attention_mask: vec![],
        };
        let all = EmbeddingsAllResponse {
            num_layers: 13,
            hidden_states: vec![],
            embeddings3d: vec![],
        };
        let input = AnimationInput::from_projected("a", &tokenize, &all).unwrap();
        assert!(matches!(input.geometry, InputGeometry::Missing));
    }

    #[test]
    fn test_from_projected_roundtrip() {
        let tokenize = TokenizeResponse {
            input_ids: vec![1, 2],
            tokens: vec!["a".into(), "b".into()],
            attention_mask: vec![],
        };
        let all = EmbeddingsAllResponse {
            num_layers: 13,
            hidden_states: vec![],
            embeddings3d: vec![vec![0.1, 0.2, 0.3], vec![0.4, 0.5, 0.6]],
        };
        let input = AnimationInput::from_projected("ab", &tokenize, &all).unwrap();
        let InputGeometry::Points(points) = input.geometry else {
            panic!("expected precomputed points");
        };
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_parse_residual_stream() {
        let body = r#"{
            "layer_values": [[10.5, 11.2], [9.8, 12.0]],
            "tokens": ["The", " quick"],
            "num_layers": 2
        }"#;
        let parsed: ResidualStreamResponse = parse(body).unwrap();
        assert_eq!(parsed.layer_values.len(), 2);
        assert_eq!(parsed.num_layers, 2);
    }
}
