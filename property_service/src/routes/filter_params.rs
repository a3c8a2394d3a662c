use std::str::FromStr;

use common::helper::error_chain_fmt;
use serde::Deserialize;

use crate::domain::entities::{filter::PropertyFilter, property::PropertyType};

/// Query-string shape of the hard filters, shared by the catalog listing
/// and the recommendations endpoint.
///
/// Set-membership filters arrive as comma-separated values, e.g.
/// `?property_types=condo,townhouse&states=IL,WI`.
#[derive(Debug, Default, Deserialize)]
pub struct PropertyFilterParams {
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
    pub min_cap_rate: Option<f64>,
    pub max_cap_rate: Option<f64>,
    pub property_types: Option<String>,
    pub states: Option<String>,
}

impl TryFrom<PropertyFilterParams> for PropertyFilter {
    type Error = FilterParamsError;

    fn try_from(params: PropertyFilterParams) -> Result<Self, Self::Error> {
        let property_types = match &params.property_types {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    PropertyType::from_str(s)
                        .map_err(|_| FilterParamsError::InvalidPropertyType(s.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => vec![],
        };

        let states = match &params.states {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| s.to_uppercase())
                .collect(),
            None => vec![],
        };

        for bound in [
            params.min_price,
            params.max_price,
            params.min_bathrooms,
            params.max_bathrooms,
            params.min_lot_size,
            params.max_lot_size,
            params.min_cap_rate,
            params.max_cap_rate,
        ]
        .into_iter()
        .flatten()
        {
            if !bound.is_finite() {
                return Err(FilterParamsError::NonFiniteBound(bound));
            }
        }

        Ok(PropertyFilter {
            min_price: params.min_price,
            max_price: params.max_price,
            min_bedrooms: params.min_bedrooms,
            max_bedrooms: params.max_bedrooms,
            min_bathrooms: params.min_bathrooms,
            max_bathrooms: params.max_bathrooms,
            min_square_feet: params.min_square_feet,
            max_square_feet: params.max_square_feet,
            min_lot_size: params.min_lot_size,
            max_lot_size: params.max_lot_size,
            min_year_built: params.min_year_built,
            max_year_built: params.max_year_built,
            min_cap_rate: params.min_cap_rate,
            max_cap_rate: params.max_cap_rate,
            property_types,
            states,
        })
    }
}

#[derive(thiserror::Error)]
pub enum FilterParamsError {
    #[error("Invalid property type filter: {0}")]
    InvalidPropertyType(String),
    #[error("Filter bounds must be finite numbers, got {0}")]
    NonFiniteBound(f64),
}

impl std::fmt::Debug for FilterParamsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
