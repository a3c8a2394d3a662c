use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::geo::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(type_name = "property_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    SingleFamily,
    Condo,
    Townhouse,
    MultiFamily,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::SingleFamily => "single_family",
            PropertyType::Condo => "condo",
            PropertyType::Townhouse => "townhouse",
            PropertyType::MultiFamily => "multi_family",
        }
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single_family" => Ok(PropertyType::SingleFamily),
            "condo" => Ok(PropertyType::Condo),
            "townhouse" => Ok(PropertyType::Townhouse),
            "multi_family" => Ok(PropertyType::MultiFamily),
            _ => Err(format!("Invalid PropertyType: {}", s)),
        }
    }
}

/// A listing as exposed by the catalog.
///
/// Immutable once ingested, except for the embedding which the seed worker
/// may recompute. The embedding is kept as a plain numeric array here; how it
/// is persisted (pgvector column) is the repository's concern.
#[derive(Debug, Clone, Serialize)]
pub struct Property {
    pub id: Uuid,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub price: f64,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<f64>,
    pub square_feet: Option<i32>,
    pub lot_size: Option<f64>,
    pub property_type: PropertyType,
    pub year_built: Option<i32>,
    pub cap_rate: Option<f64>,
    pub description: String,
    pub images: Option<Vec<String>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(skip_serializing)]
    pub embedding: Option<Vec<f32>>,
    pub created_at: DateTime<Utc>,
}

impl Property {
    /// Both coordinates present and finite, or nothing
    pub fn coordinates(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => GeoPoint::new(latitude, longitude).ok(),
            _ => None,
        }
    }
}
