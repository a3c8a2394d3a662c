use serde::Serialize;

use crate::domain::entities::property::Property;

/// Which scoring strategy produced a recommendation.
///
/// Exposed to the caller so the UI can explain a card ("near you" vs
/// "because you liked X") and to make scoring behavior observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreReason {
    LocationPriority,
    VectorSimilarity,
    GraphTraversal,
    Fallback,
}

impl ScoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreReason::LocationPriority => "location_priority",
            ScoreReason::VectorSimilarity => "vector_similarity",
            ScoreReason::GraphTraversal => "graph_traversal",
            ScoreReason::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for ScoreReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ranked entry returned to the caller. Scores from every strategy
/// live in [0, 1] so mixed-strategy results stay comparable.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredProperty {
    pub property: Property,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    pub reason: ScoreReason,
}
