use crate::domain::entities::property::PropertyType;

/// Hard filters applied when fetching candidates.
///
/// Every field is optional: an absent bound imposes no constraint.
#[derive(Debug, Clone, Default)]
pub struct PropertyFilter {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_bedrooms: Option<i32>,
    pub max_bedrooms: Option<i32>,
    pub min_bathrooms: Option<f64>,
    pub max_bathrooms: Option<f64>,
    pub min_square_feet: Option<i32>,
    pub max_square_feet: Option<i32>,
    pub min_lot_size: Option<f64>,
    pub max_lot_size: Option<f64>,
    pub min_year_built: Option<i32>,
    pub max_year_built: Option<i32>,
    /// A listing without a cap rate always passes these two bounds:
    /// missing data is not penalized.
    pub min_cap_rate: Option<f64>,
    pub max_cap_rate: Option<f64>,
    pub property_types: Vec<PropertyType>,
    pub states: Vec<String>,
}

impl PropertyFilter {
    pub fn is_empty(&self) -> bool {
        self.min_price.is_none()
            && self.max_price.is_none()
            && self.min_bedrooms.is_none()
            && self.max_bedrooms.is_none()
            && self.min_bathrooms.is_none()
            && self.max_bathrooms.is_none()
            && self.min_square_feet.is_none()
            && self.max_square_feet.is_none()
            && self.min_lot_size.is_none()
            && self.max_lot_size.is_none()
            && self.min_year_built.is_none()
            && self.max_year_built.is_none()
            && self.min_cap_rate.is_none()
            && self.max_cap_rate.is_none()
            && self.property_types.is_empty()
            && self.states.is_empty()
    }
}
