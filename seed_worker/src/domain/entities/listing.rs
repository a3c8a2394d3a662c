use uuid::Uuid;

/// A generated demo listing, ready to be embedded and persisted
#[derive(Debug, Clone)]
pub struct Listing {
    pub id: Uuid,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub price: f64,
    pub bedrooms: i32,
    pub bathrooms: f64,
    pub square_feet: i32,
    pub lot_size: Option<f64>,
    pub property_type: &'static str,
    pub year_built: i32,
    pub cap_rate: Option<f64>,
    pub description: String,
    pub images: Vec<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl Listing {
    /// The text handed to the sentence-embedding model: one composed
    /// description per listing
    pub fn embedding_text(&self) -> String {
        let mut parts = vec![
            format!("{} in {}, {}", self.address, self.city, self.state),
            self.description.clone(),
            format!("{} bedrooms, {} bathrooms", self.bedrooms, self.bathrooms),
            format!("{} square feet", self.square_feet),
            self.property_type.replace('_', " "),
            format!("Price: ${:.0}", self.price),
        ];
        parts.retain(|p| !p.is_empty());

        parts.join(" ")
    }
}
