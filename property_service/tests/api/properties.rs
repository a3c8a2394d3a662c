use crate::helpers::{sample_property_body, spawn_app};
use serde_json::json;
use uuid::Uuid;

#[tokio::test(flavor = "multi_thread")]
async fn a_valid_property_is_created_and_persisted() {
    // Arranges
    let app = spawn_app().await;

    // Acts
    let response = app
        .api_client
        .post(&format!("{}/properties", &app.address))
        .json(&sample_property_body())
        .send()
        .await
        .expect("Failed to execute request");

    // Asserts the API response
    assert_eq!(201, response.status().as_u16());

    // Asserts the listing has been persisted
    let (address, city, price): (String, String, f64) = sqlx::query_as(
        "SELECT address, city, price FROM property",
    )
    .fetch_one(&app.db_pool)
    .await
    .expect("Failed to fetch newly created property");

    assert_eq!(address, "123 W Randolph St");
    assert_eq!(city, "Chicago");
    assert_eq!(price, 350_000.0);
}

#[tokio::test(flavor = "multi_thread")]
async fn an_unknown_property_type_is_rejected() {
    let app = spawn_app().await;

    let mut body = sample_property_body();
    body["property_type"] = json!("castle");

    let response = app
        .api_client
        .post(&format!("{}/properties", &app.address))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test(flavor = "multi_thread")]
async fn a_lone_latitude_is_rejected() {
    let app = spawn_app().await;

    let mut body = sample_property_body();
    body["latitude"] = json!(41.8781);

    let response = app
        .api_client
        .post(&format!("{}/properties", &app.address))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test(flavor = "multi_thread")]
async fn listing_applies_price_and_bedroom_filters() {
    // Arranges
    let app = spawn_app().await;

    let mut cheap = sample_property_body();
    cheap["price"] = json!(150_000.0);
    app.seed_property(&cheap).await;

    let mut small = sample_property_body();
    small["bedrooms"] = json!(1);
    app.seed_property(&small).await;

    let matching = app.seed_property(&sample_property_body()).await;

    // Acts
    let response = app
        .api_client
        .get(&format!(
            "{}/properties?min_price=200000&max_price=600000&min_bedrooms=2&max_bedrooms=4",
            &app.address
        ))
        .send()
        .await
        .expect("Failed to execute request");

    // Asserts
    assert_eq!(200, response.status().as_u16());
    let listings: Vec<serde_json::Value> = response.json().await.expect("Failed to parse response");
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0]["id"].as_str().unwrap(), matching.to_string());
}

#[tokio::test(flavor = "multi_thread")]
async fn a_missing_cap_rate_is_not_penalized_by_cap_rate_filters() {
    // Arranges
    let app = spawn_app().await;

    let mut with_good_cap_rate = sample_property_body();
    with_good_cap_rate["cap_rate"] = json!(6.5);
    let with_good_cap_rate = app.seed_property(&with_good_cap_rate).await;

    let mut with_bad_cap_rate = sample_property_body();
    with_bad_cap_rate["cap_rate"] = json!(2.0);
    let with_bad_cap_rate = app.seed_property(&with_bad_cap_rate).await;

    // No cap rate at all: should pass the filter untouched
    let without_cap_rate = app.seed_property(&sample_property_body()).await;

    // Acts
    let response = app
        .api_client
        .get(&format!("{}/properties?min_cap_rate=5", &app.address))
        .send()
        .await
        .expect("Failed to execute request");

    // Asserts
    let listings: Vec<serde_json::Value> = response.json().await.expect("Failed to parse response");
    let ids: Vec<String> = listings
        .iter()
        .map(|l| l["id"].as_str().unwrap().to_string())
        .collect();

    assert!(ids.contains(&with_good_cap_rate.to_string()));
    assert!(ids.contains(&without_cap_rate.to_string()));
    assert!(!ids.contains(&with_bad_cap_rate.to_string()));
}

#[tokio::test(flavor = "multi_thread")]
async fn fetching_an_unknown_property_returns_404() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .get(&format!("{}/properties/{}", &app.address, Uuid::new_v4()))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test(flavor = "multi_thread")]
async fn fetching_a_created_property_by_id_works() {
    let app = spawn_app().await;
    let property_id = app.seed_property(&sample_property_body()).await;

    let response = app
        .api_client
        .get(&format!("{}/properties/{}", &app.address, property_id))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(200, response.status().as_u16());
    let listing: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(listing["id"].as_str().unwrap(), property_id.to_string());
    assert_eq!(listing["state"].as_str().unwrap(), "IL");
}
