use uuid::Uuid;

/// Raw cosine similarity between two equally-sized vectors.
/// A zero-magnitude operand yields 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += f64::from(*x) * f64::from(*y);
        norm_a += f64::from(*x) * f64::from(*x);
        norm_b += f64::from(*y) * f64::from(*y);
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Computes the similarity edges to persist: every ordered pair of listings
/// whose cosine similarity exceeds the threshold, in both directions.
///
/// Similarity is clamped into [0, 1] to satisfy the edge weight invariant
/// (near-antipodal embeddings never pass the threshold anyway).
pub fn build_edges(
    embeddings: &[(Uuid, Vec<f32>)],
    threshold: f64,
) -> Vec<(Uuid, Uuid, f64)> {
    let mut edges = Vec::new();

    for (i, (source_id, source_embedding)) in embeddings.iter().enumerate() {
        for (target_id, target_embedding) in embeddings.iter().skip(i + 1) {
            let similarity = cosine_similarity(source_embedding, target_embedding);
            if similarity > threshold {
                let similarity = similarity.clamp(0.0, 1.0);
                edges.push((*source_id, *target_id, similarity));
                edges.push((*target_id, *source_id, similarity));
            }
        }
    }

    edges
}
