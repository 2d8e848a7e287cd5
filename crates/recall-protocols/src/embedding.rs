//! Embedding provider protocol.

use async_trait::async_trait;

use crate::error::EmbeddingError;
use crate::types::EmbeddingVector;

/// Maps text to a fixed-dimension vector.
///
/// Failure or latency here is the dominant cost of retrieval; callers cache
/// aggressively and apply their own deadlines.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate the embedding for one text.
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError>;

    /// Generate embeddings for several texts, in input order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<EmbeddingVector>, EmbeddingError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Dimension of every vector this provider returns.
    fn dimension(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant;

    #[async_trait]
    impl EmbeddingProvider for Constant {
        async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
            Ok(vec![text.len() as f32, 1.0])
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    #[tokio::test]
    async fn test_default_embed_batch_preserves_order() {
        let provider = Constant;
        let vectors = provider.embed_batch(&["a", "abc", ""]).await.unwrap();
        assert_eq!(vectors, vec![vec![1.0, 1.0], vec![3.0, 1.0], vec![0.0, 1.0]]);
    }
}
