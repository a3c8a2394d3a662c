use rand::{distributions::WeightedIndex, prelude::Distribution, seq::SliceRandom, Rng};
use uuid::Uuid;

use crate::domain::{entities::listing::Listing, services::market::CityMarket};

/// Type mix of the generated catalog: mostly single-family homes,
/// some condos, a few townhouses
const PROPERTY_TYPES: [&str; 3] = ["single_family", "condo", "townhouse"];
const PROPERTY_TYPE_WEIGHTS: [f64; 3] = [0.6, 0.3, 0.1];

/// Share of listings marketed as investment properties, which carry a
/// cap rate; everything else leaves it unset
const CAP_RATE_SHARE: f64 = 0.25;

/// Generates `count` plausible demo listings for one market
pub fn generate_listings(market: &CityMarket, count: usize, rng: &mut impl Rng) -> Vec<Listing> {
    let type_distribution =
        WeightedIndex::new(PROPERTY_TYPE_WEIGHTS).expect("Property type weights are valid");

    (0..count)
        .map(|_| {
            let street_number = rng.gen_range(100..10_000);
            let street = market.streets.choose(rng).expect("Market has streets");
            let neighborhood = market
                .neighborhoods
                .choose(rng)
                .expect("Market has neighborhoods");

            let (min_price, max_price) = market.price_range;
            let price = (market.base_price * rng.gen_range(0.7..1.4)).clamp(min_price, max_price);

            let bedrooms = *market.bedrooms.choose(rng).expect("Market has unit mixes");
            let bathrooms = *market.bathrooms.choose(rng).expect("Market has unit mixes");
            let (min_sqft, max_sqft) = market.sqft_range;
            let square_feet = rng.gen_range(min_sqft..=max_sqft);

            let property_type = PROPERTY_TYPES[type_distribution.sample(rng)];

            // Single-family lots get an actual lot size, stacked homes do not
            let lot_size = (property_type == "single_family")
                .then(|| (square_feet as f64 * rng.gen_range(1.5..4.0)).round());

            let cap_rate = rng
                .gen_bool(CAP_RATE_SHARE)
                .then(|| (rng.gen_range(3.0..9.0) * 10.0).round() / 10.0);

            let descriptions = [
                format!(
                    "Beautiful {} in the heart of {}",
                    property_type.replace('_', " "),
                    neighborhood
                ),
                format!(
                    "Stunning {} bedroom home with modern amenities and {} charm",
                    bedrooms, neighborhood
                ),
                format!(
                    "Charming {} perfect for families in {}",
                    property_type.replace('_', " "),
                    neighborhood
                ),
                format!(
                    "Luxurious {} bed {} with premium finishes",
                    bedrooms,
                    property_type.replace('_', " ")
                ),
                format!(
                    "Spacious {} in desirable {} location",
                    property_type.replace('_', " "),
                    neighborhood
                ),
            ];
            let description = descriptions
                .choose(rng)
                .expect("Description pool is not empty")
                .clone();

            let images = (0..rng.gen_range(4..=8))
                .map(|index| {
                    format!(
                        "https://images.unsplash.com/photo-{}?auto=format&fit=crop&w=1000&q=80&sig={}",
                        rng.gen_range(1_500_000_000_000u64..1_600_000_000_000u64),
                        index
                    )
                })
                .collect();

            Listing {
                id: Uuid::new_v4(),
                address: format!("{} {}", street_number, street),
                city: market.city.to_string(),
                state: market.state.to_string(),
                zip_code: format!("{}{:02}", market.zip_prefix, rng.gen_range(0..100)),
                price,
                bedrooms,
                bathrooms,
                square_feet,
                lot_size,
                property_type,
                year_built: rng.gen_range(1950..=2023),
                cap_rate,
                description,
                images,
                // Jitters listings around the city center, ~11 km either way
                latitude: market.latitude + rng.gen_range(-0.1..0.1),
                longitude: market.longitude + rng.gen_range(-0.1..0.1),
            }
        })
        .collect()
}
