use std::collections::{HashMap, HashSet};

use sqlx::PgPool;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::{
    configuration::RecommendationSettings,
    domain::{
        entities::{
            filter::PropertyFilter,
            geo::GeoPoint,
            property::Property,
            recommendation::{ScoreReason, ScoredProperty},
        },
        services::scoring::{
            haversine_km, normalized_similarity, proximity_score, FALLBACK_SCORE,
            NEUTRAL_SIMILARITY,
        },
    },
    repositories::{
        edge_postgres_repository::{EdgePostgresRepository, SimilarityEdge},
        interaction_postgres_repository::InteractionPostgresRepository,
        property_postgres_repository::PropertyPostgresRepository,
        user_postgres_repository::UserPostgresRepository,
    },
};

/// A fully validated recommendation request
#[derive(Debug)]
pub struct RecommendationRequest {
    pub user_id: Uuid,
    pub limit: usize,
    pub location: Option<GeoPoint>,
    pub radius_km: f64,
    pub filter: PropertyFilter,
}

/// The recommendation scorer.
///
/// One candidate fetch, then a strict strategy ladder: location proximity,
/// vector similarity, graph traversal, recency fallback. A strategy that is
/// unavailable or yields too few results falls through to the next one, and
/// results are merged without double-counting. Upstream failures abandon the
/// failing strategy instead of the request, so the caller always gets a
/// ranked (possibly empty) list.
pub struct GetRecommendationsUseCase {
    property_repository: PropertyPostgresRepository,
    interaction_repository: InteractionPostgresRepository,
    edge_repository: EdgePostgresRepository,
    user_repository: UserPostgresRepository,
    settings: RecommendationSettings,
}

impl GetRecommendationsUseCase {
    pub fn new(
        property_repository: PropertyPostgresRepository,
        interaction_repository: InteractionPostgresRepository,
        edge_repository: EdgePostgresRepository,
        user_repository: UserPostgresRepository,
        settings: RecommendationSettings,
    ) -> Self {
        Self {
            property_repository,
            interaction_repository,
            edge_repository,
            user_repository,
            settings,
        }
    }

    #[tracing::instrument(name = "Scoring recommendations", skip(self, pool, request), fields(user_id = %request.user_id))]
    pub async fn execute(&self, pool: &PgPool, request: &RecommendationRequest) -> Vec<ScoredProperty> {
        let candidates = match self
            .property_repository
            .find_candidates(pool, &request.user_id, &request.filter)
            .await
        {
            Ok(candidates) => candidates,
            Err(error) => {
                error!(?error, "Candidate fetch failed, returning an empty ranking");
                return vec![];
            }
        };

        if candidates.is_empty() {
            info!("No candidate passed the filters");
            return vec![];
        }
        debug!(candidate_count = candidates.len(), "Fetched candidates");

        // A strategy yielding fewer results than this falls through to the
        // next one on the ladder.
        let min_results = self.settings.min_results.min(request.limit);

        let mut ranked: Vec<ScoredProperty> = Vec::new();
        let mut scored_ids: HashSet<Uuid> = HashSet::new();

        // 1. Location mode: a valid coordinate pair was supplied
        if let Some(center) = request.location {
            let scored = score_by_proximity(&candidates, center, request.radius_km);
            debug!(count = scored.len(), "Location strategy scored candidates");
            merge_scored(&mut ranked, &mut scored_ids, scored);
        }

        // 2. Vector mode: the user has a stored taste embedding
        if ranked.len() < min_results {
            match self
                .user_repository
                .find_embedding(pool, &request.user_id)
                .await
            {
                Ok(Some(user_embedding)) => {
                    let scored = score_by_similarity(&candidates, &user_embedding);
                    debug!(count = scored.len(), "Vector strategy scored candidates");
                    merge_scored(&mut ranked, &mut scored_ids, scored);
                }
                Ok(None) => {}
                Err(error) => {
                    error!(?error, "User embedding fetch failed, abandoning vector strategy");
                }
            }
        }

        // 3. Graph mode: at least one similarity edge exists
        if ranked.len() < min_results {
            match self.score_by_graph_traversal(pool, &request.user_id, &candidates).await {
                Ok(scored) => {
                    debug!(count = scored.len(), "Graph strategy scored candidates");
                    merge_scored(&mut ranked, &mut scored_ids, scored);
                }
                Err(error) => {
                    error!(?error, "Edge traversal failed, abandoning graph strategy");
                }
            }
        }

        // 4. Fallback: plain recency so the deck is never empty
        if ranked.len() < min_results {
            let scored = score_by_recency(&candidates);
            merge_scored(&mut ranked, &mut scored_ids, scored);
        }

        rank(ranked, request.limit)
    }

    /// Follows outgoing similarity edges from the user's liked properties
    /// into the candidate pool.
    async fn score_by_graph_traversal(
        &self,
        pool: &PgPool,
        user_id: &Uuid,
        candidates: &[Property],
    ) -> Result<Vec<ScoredProperty>, anyhow::Error> {
        if !self.edge_repository.has_edges(pool).await? {
            return Ok(vec![]);
        }

        let liked_ids = self
            .interaction_repository
            .find_liked_property_ids(pool, user_id)
            .await?;
        if liked_ids.is_empty() {
            return Ok(vec![]);
        }

        let edges = self.edge_repository.edges_from(pool, &liked_ids).await?;
        let weights = aggregate_edge_weights(&edges);

        Ok(score_by_graph(candidates, &weights))
    }
}

/// Proximity scoring: candidates beyond the radius (or without coordinates)
/// are excluded entirely, the rest score linearly from 1 at the center down
/// to 0 at the boundary. Ordered by ascending distance, then by descending
/// score for explicitness.
fn score_by_proximity(
    candidates: &[Property],
    center: GeoPoint,
    radius_km: f64,
) -> Vec<ScoredProperty> {
    let mut scored: Vec<ScoredProperty> = candidates
        .iter()
        .filter_map(|property| {
            let coordinates = property.coordinates()?;
            let distance_km = haversine_km(center, coordinates);
            if distance_km > radius_km {
                return None;
            }

            Some(ScoredProperty {
                property: property.clone(),
                score: proximity_score(distance_km, radius_km),
                distance_km: Some(distance_km),
                reason: ScoreReason::LocationPriority,
            })
        })
        .collect();

    scored.sort_by(|a, b| {
        let distance_order = a
            .distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(std::cmp::Ordering::Equal);
        distance_order.then_with(|| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    });

    scored
}

/// Vector-similarity scoring against the user's taste embedding.
///
/// Candidates with a degraded or missing embedding get the neutral score
/// instead of being dropped: one bad vector never empties the deck.
fn score_by_similarity(candidates: &[Property], user_embedding: &[f32]) -> Vec<ScoredProperty> {
    let mut scored: Vec<ScoredProperty> = candidates
        .iter()
        .map(|property| {
            let score = match &property.embedding {
                Some(embedding) => normalized_similarity(user_embedding, embedding),
                None => NEUTRAL_SIMILARITY,
            };

            ScoredProperty {
                property: property.clone(),
                score,
                distance_km: None,
                reason: ScoreReason::VectorSimilarity,
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    scored
}

/// Averages edge weights per target: a candidate reachable from several
/// liked properties scores the mean of its incoming weights.
fn aggregate_edge_weights(edges: &[SimilarityEdge]) -> HashMap<Uuid, f64> {
    let mut sums: HashMap<Uuid, (f64, usize)> = HashMap::new();
    for edge in edges {
        let entry = sums.entry(edge.target_property_id).or_insert((0.0, 0));
        entry.0 += edge.similarity;
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(target, (sum, count))| (target, sum / count as f64))
        .collect()
}

/// Graph-traversal scoring: candidates reached by at least one edge score
/// their aggregated edge weight, ranked by descending weight.
fn score_by_graph(candidates: &[Property], weights: &HashMap<Uuid, f64>) -> Vec<ScoredProperty> {
    let mut scored: Vec<ScoredProperty> = candidates
        .iter()
        .filter_map(|property| {
            let weight = weights.get(&property.id)?;

            Some(ScoredProperty {
                property: property.clone(),
                score: weight.clamp(0.0, 1.0),
                distance_km: None,
                reason: ScoreReason::GraphTraversal,
            })
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    scored
}

/// Recency fallback: every candidate gets the same neutral score and the
/// fetch order (most recently ingested first) is kept as-is.
fn score_by_recency(candidates: &[Property]) -> Vec<ScoredProperty> {
    candidates
        .iter()
        .map(|property| ScoredProperty {
            property: property.clone(),
            score: FALLBACK_SCORE,
            distance_km: None,
            reason: ScoreReason::Fallback,
        })
        .collect()
}

/// Appends strategy output, skipping properties a higher-priority strategy
/// already scored
fn merge_scored(
    ranked: &mut Vec<ScoredProperty>,
    scored_ids: &mut HashSet<Uuid>,
    additions: Vec<ScoredProperty>,
) {
    for scored in additions {
        if scored_ids.insert(scored.property.id) {
            ranked.push(scored);
        }
    }
}

/// Final ranking: stable sort by descending score (ties keep strategy
/// priority and each strategy's own ordering), truncated to the limit
fn rank(mut merged: Vec<ScoredProperty>, limit: usize) -> Vec<ScoredProperty> {
    merged.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    merged.truncate(limit);
    merged
}
