//! Cosine similarity over embedding vectors.
//!
//! Pure functions: no I/O, no shared state. Accumulation happens in `f64` so
//! long vectors do not lose precision before the final division.

use recall_protocols::SimilarityError;

/// Cosine similarity between two vectors of equal dimension.
///
/// Returns 0 when either vector has zero norm: a zero vector has no
/// direction and is maximally dissimilar to everything, itself included.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, SimilarityError> {
    if a.len() != b.len() {
        return Err(SimilarityError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok((dot / (norm_a.sqrt() * norm_b.sqrt())) as f32)
}

/// Similarity of `query` against every vector in `vectors`, in order.
///
/// The query norm is computed once. A candidate whose dimension disagrees
/// with the query scores 0 without affecting the others.
pub fn batch_cosine_similarity<V: AsRef<[f32]>>(query: &[f32], vectors: &[V]) -> Vec<f32> {
    let query_norm = query
        .iter()
        .map(|x| f64::from(*x) * f64::from(*x))
        .sum::<f64>()
        .sqrt();

    if query_norm == 0.0 {
        return vec![0.0; vectors.len()];
    }

    vectors
        .iter()
        .map(|vector| {
            let vector = vector.as_ref();
            if vector.len() != query.len() {
                return 0.0;
            }

            let mut dot = 0.0f64;
            let mut norm = 0.0f64;
            for (q, v) in query.iter().zip(vector) {
                let (q, v) = (f64::from(*q), f64::from(*v));
                dot += q * v;
                norm += v * v;
            }

            if norm == 0.0 {
                return 0.0;
            }

            (dot / (query_norm * norm.sqrt())) as f32
        })
        .collect()
}
