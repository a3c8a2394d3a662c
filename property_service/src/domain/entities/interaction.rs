use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "interaction_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Like,
    Skip,
    Superlike,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Like => "like",
            InteractionKind::Skip => "skip",
            InteractionKind::Superlike => "superlike",
        }
    }

    /// Likes and superlikes feed the user taste embedding; skips never do
    pub fn is_positive(&self) -> bool {
        matches!(self, InteractionKind::Like | InteractionKind::Superlike)
    }
}

impl std::fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded swipe. The log is append-only and holds at most one row
/// per (user, property) pair.
#[derive(Debug, Clone, Serialize)]
pub struct Interaction {
    pub user_id: Uuid,
    pub property_id: Uuid,
    pub kind: InteractionKind,
    pub created_at: DateTime<Utc>,
}
