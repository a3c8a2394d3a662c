/// Static market data the demo listings are generated from.
///
/// Prices, unit mixes and street pools roughly track each city's actual
/// market so the seeded catalog looks plausible in the UI.
pub struct CityMarket {
    pub city: &'static str,
    pub state: &'static str,
    pub zip_prefix: u32,
    /// City center, listings are jittered around it
    pub latitude: f64,
    pub longitude: f64,
    pub base_price: f64,
    pub price_range: (f64, f64),
    pub bedrooms: &'static [i32],
    pub bathrooms: &'static [f64],
    pub sqft_range: (i32, i32),
    pub streets: &'static [&'static str],
    pub neighborhoods: &'static [&'static str],
}

pub fn markets() -> &'static [CityMarket] {
    &[
        CityMarket {
            city: "San Francisco",
            state: "CA",
            zip_prefix: 941,
            latitude: 37.7749,
            longitude: -122.4194,
            base_price: 1_200_000.0,
            price_range: (800_000.0, 2_500_000.0),
            bedrooms: &[1, 2, 3, 4],
            bathrooms: &[1.0, 1.5, 2.0, 2.5, 3.0],
            sqft_range: (600, 2500),
            streets: &[
                "Market St",
                "Mission St",
                "Valencia St",
                "Castro St",
                "Divisadero St",
                "Fillmore St",
                "Polk St",
                "Van Ness Ave",
            ],
            neighborhoods: &[
                "Mission District",
                "Castro",
                "Haight-Ashbury",
                "Pacific Heights",
                "Marina District",
                "SOMA",
            ],
        },
        CityMarket {
            city: "Los Angeles",
            state: "CA",
            zip_prefix: 900,
            latitude: 34.0522,
            longitude: -118.2437,
            base_price: 800_000.0,
            price_range: (500_000.0, 1_800_000.0),
            bedrooms: &[2, 3, 4, 5],
            bathrooms: &[2.0, 2.5, 3.0, 3.5, 4.0],
            sqft_range: (800, 3000),
            streets: &[
                "Sunset Blvd",
                "Melrose Ave",
                "Santa Monica Blvd",
                "Wilshire Blvd",
                "Beverly Blvd",
                "Hollywood Blvd",
                "Vine St",
            ],
            neighborhoods: &[
                "Hollywood",
                "Beverly Hills",
                "Santa Monica",
                "Venice",
                "West Hollywood",
                "Silver Lake",
            ],
        },
        CityMarket {
            city: "Seattle",
            state: "WA",
            zip_prefix: 981,
            latitude: 47.6062,
            longitude: -122.3321,
            base_price: 700_000.0,
            price_range: (400_000.0, 1_500_000.0),
            bedrooms: &[2, 3, 4],
            bathrooms: &[1.5, 2.0, 2.5, 3.0],
            sqft_range: (900, 2200),
            streets: &[
                "Pike St",
                "Broadway",
                "Queen Anne Ave",
                "Fremont Ave",
                "Ballard Ave",
                "University Way",
            ],
            neighborhoods: &[
                "Capitol Hill",
                "Queen Anne",
                "Ballard",
                "Fremont",
                "Green Lake",
                "Wallingford",
            ],
        },
        CityMarket {
            city: "Chicago",
            state: "IL",
            zip_prefix: 606,
            latitude: 41.8781,
            longitude: -87.6298,
            base_price: 450_000.0,
            price_range: (250_000.0, 1_200_000.0),
            bedrooms: &[1, 2, 3, 4],
            bathrooms: &[1.0, 1.5, 2.0, 2.5],
            sqft_range: (700, 2400),
            streets: &[
                "W Randolph St",
                "N Michigan Ave",
                "W Division St",
                "N Milwaukee Ave",
                "S Halsted St",
                "W Fullerton Ave",
            ],
            neighborhoods: &[
                "Wicker Park",
                "Lincoln Park",
                "Logan Square",
                "West Loop",
                "Hyde Park",
                "Lakeview",
            ],
        },
        CityMarket {
            city: "Miami",
            state: "FL",
            zip_prefix: 331,
            latitude: 25.7617,
            longitude: -80.1918,
            base_price: 600_000.0,
            price_range: (300_000.0, 2_000_000.0),
            bedrooms: &[1, 2, 3, 4],
            bathrooms: &[1.0, 2.0, 2.5, 3.0],
            sqft_range: (650, 2600),
            streets: &[
                "Ocean Dr",
                "Collins Ave",
                "Brickell Ave",
                "Biscayne Blvd",
                "Coral Way",
                "Flagler St",
            ],
            neighborhoods: &[
                "South Beach",
                "Brickell",
                "Wynwood",
                "Coconut Grove",
                "Little Havana",
                "Coral Gables",
            ],
        },
    ]
}
