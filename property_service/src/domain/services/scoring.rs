//! Pure scoring math shared by the recommendation strategies.
//!
//! All helpers here are total: degraded inputs (zero-magnitude vectors,
//! length mismatches) produce neutral values instead of errors, so a single
//! bad candidate can never abort a whole request.

use crate::domain::entities::geo::GeoPoint;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Neutral similarity for degraded vector comparisons
pub const NEUTRAL_SIMILARITY: f64 = 0.5;

/// Fixed score assigned by the recency fallback strategy
pub const FALLBACK_SCORE: f64 = 0.4;

/// Great-circle distance in kilometers between two points (haversine)
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Linear proximity score: 1 at the center, 0 at the radius boundary
pub fn proximity_score(distance_km: f64, radius_km: f64) -> f64 {
    if radius_km <= 0.0 {
        return 0.0;
    }
    (1.0 - distance_km / radius_km).clamp(0.0, 1.0)
}

/// Raw cosine similarity in [-1, 1].
///
/// Vectors of unequal length are compared over their overlapping prefix.
/// A zero-magnitude operand (which includes an empty overlap) yields 0.0,
/// the direction-less neutral value.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let len = a.len().min(b.len());
    let a = &a[..len];
    let b = &b[..len];

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

/// Maps a raw cosine value from [-1, 1] into [0, 1] so vector-similarity
/// scores are comparable with the other strategies.
///
/// The degraded-input neutral (raw 0.0) lands exactly on 0.5.
pub fn normalized_similarity(a: &[f32], b: &[f32]) -> f64 {
    ((cosine_similarity(a, b) + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// Componentwise mean of equally-sized vectors.
///
/// Vectors whose length differs from the first one are skipped; returns
/// `None` when nothing usable remains.
pub fn mean_embedding(embeddings: &[Vec<f32>]) -> Option<Vec<f32>> {
    let first = embeddings.iter().find(|e| !e.is_empty())?;
    let dimension = first.len();

    let mut sum = vec![0.0f64; dimension];
    let mut count = 0usize;
    for embedding in embeddings.iter().filter(|e| e.len() == dimension) {
        for (acc, value) in sum.iter_mut().zip(embedding.iter()) {
            *acc += f64::from(*value);
        }
        count += 1;
    }

    if count == 0 {
        return None;
    }

    Some(sum.iter().map(|acc| (acc / count as f64) as f32).collect())
}

/// Exponential-moving-average update of a taste profile:
/// 70% previous profile, 30% fresh mean of liked embeddings.
///
/// With no usable prior (absent or dimension mismatch), the fresh mean is
/// taken as-is: the first update is a plain average.
pub fn blend_embeddings(prior: Option<&[f32]>, fresh: &[f32]) -> Vec<f32> {
    const PRIOR_WEIGHT: f32 = 0.7;
    const FRESH_WEIGHT: f32 = 0.3;

    match prior {
        Some(prior) if prior.len() == fresh.len() => prior
            .iter()
            .zip(fresh.iter())
            .map(|(old, new)| PRIOR_WEIGHT * old + FRESH_WEIGHT * new)
            .collect(),
        _ => fresh.to_vec(),
    }
}
