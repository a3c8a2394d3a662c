use crate::helpers::{sample_property_body, spawn_app};
use serde_json::json;
use uuid::Uuid;

const CHICAGO_LAT: f64 = 41.8781;
const CHICAGO_LNG: f64 = -87.6298;

/// Moves roughly `km` kilometers north of the Chicago loop
/// (a degree of latitude is ~111 km)
fn lat_north_of_chicago(km: f64) -> f64 {
    CHICAGO_LAT + km / 111.0
}

fn body_at_km(km: f64) -> serde_json::Value {
    let mut body = sample_property_body();
    body["latitude"] = json!(lat_north_of_chicago(km));
    body["longitude"] = json!(CHICAGO_LNG);
    body
}

fn embedding_with_first_component(value: f32) -> Vec<f32> {
    let mut embedding = vec![0.0f32; 384];
    embedding[0] = value;
    embedding
}

#[tokio::test(flavor = "multi_thread")]
async fn a_missing_user_id_is_rejected() {
    let app = spawn_app().await;

    let response = app.get_recommendations("limit=10").await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test(flavor = "multi_thread")]
async fn a_lone_latitude_is_rejected() {
    let app = spawn_app().await;

    let response = app
        .get_recommendations(&format!("user_id={}&lat=41.8", Uuid::new_v4()))
        .await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test(flavor = "multi_thread")]
async fn a_non_positive_radius_is_rejected() {
    let app = spawn_app().await;

    let response = app
        .get_recommendations(&format!(
            "user_id={}&lat=41.8&lng=-87.6&radius_km=0",
            Uuid::new_v4()
        ))
        .await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test(flavor = "multi_thread")]
async fn an_unknown_property_type_filter_is_rejected() {
    let app = spawn_app().await;

    let response = app
        .get_recommendations(&format!("user_id={}&property_types=castle", Uuid::new_v4()))
        .await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test(flavor = "multi_thread")]
async fn an_empty_catalog_yields_an_empty_ranking() {
    let app = spawn_app().await;

    let recommendations = app
        .get_recommendation_list(&format!("user_id={}", Uuid::new_v4()))
        .await;

    assert!(recommendations.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn location_mode_scores_nearby_listings_and_excludes_far_ones() {
    // Arranges: one listing 10 km away, one 80 km away, both passing filters
    let app = spawn_app().await;
    let near_id = app.seed_property(&body_at_km(10.0)).await;
    app.seed_property(&body_at_km(80.0)).await;

    // Acts
    let recommendations = app
        .get_recommendation_list(&format!(
            "user_id={}&limit=1&lat={}&lng={}&radius_km=50&min_price=200000&max_price=600000&min_bedrooms=2&max_bedrooms=4",
            Uuid::new_v4(),
            CHICAGO_LAT,
            CHICAGO_LNG
        ))
        .await;

    // Asserts: only the near listing, tagged and scored by proximity
    assert_eq!(recommendations.len(), 1);
    let top = &recommendations[0];
    assert_eq!(top["property"]["id"].as_str().unwrap(), near_id.to_string());
    assert_eq!(top["reason"].as_str().unwrap(), "location_priority");

    // score = 1 - 10/50
    let score = top["score"].as_f64().unwrap();
    assert!((score - 0.8).abs() < 0.05, "score was {}", score);

    let distance = top["distance_km"].as_f64().unwrap();
    assert!((distance - 10.0).abs() < 1.0, "distance was {}", distance);
}

#[tokio::test(flavor = "multi_thread")]
async fn listings_beyond_the_radius_only_surface_through_the_fallback() {
    // Arranges: one listing inside the radius, one just beyond it
    let app = spawn_app().await;
    let inside_id = app.seed_property(&body_at_km(10.0)).await;
    let outside_id = app.seed_property(&body_at_km(56.0)).await;

    // Acts: limit 2 forces the ladder to fall through and merge
    let recommendations = app
        .get_recommendation_list(&format!(
            "user_id={}&limit=2&lat={}&lng={}&radius_km=50",
            Uuid::new_v4(),
            CHICAGO_LAT,
            CHICAGO_LNG
        ))
        .await;

    // Asserts: no double-counting, and the far listing is never a
    // location-mode result
    assert_eq!(recommendations.len(), 2);
    assert_eq!(
        recommendations[0]["property"]["id"].as_str().unwrap(),
        inside_id.to_string()
    );
    assert_eq!(
        recommendations[0]["reason"].as_str().unwrap(),
        "location_priority"
    );
    assert_eq!(
        recommendations[1]["property"]["id"].as_str().unwrap(),
        outside_id.to_string()
    );
    assert_eq!(recommendations[1]["reason"].as_str().unwrap(), "fallback");
}

#[tokio::test(flavor = "multi_thread")]
async fn closer_listings_rank_before_farther_ones() {
    // Arranges
    let app = spawn_app().await;
    let middle_id = app.seed_property(&body_at_km(15.0)).await;
    let near_id = app.seed_property(&body_at_km(5.0)).await;
    let far_id = app.seed_property(&body_at_km(30.0)).await;

    // Acts
    let recommendations = app
        .get_recommendation_list(&format!(
            "user_id={}&limit=3&lat={}&lng={}&radius_km=50",
            Uuid::new_v4(),
            CHICAGO_LAT,
            CHICAGO_LNG
        ))
        .await;

    // Asserts strictly monotonic distance ordering
    let ids: Vec<String> = recommendations
        .iter()
        .map(|r| r["property"]["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        ids,
        vec![near_id.to_string(), middle_id.to_string(), far_id.to_string()]
    );

    let scores: Vec<f64> = recommendations
        .iter()
        .map(|r| r["score"].as_f64().unwrap())
        .collect();
    assert!(scores[0] > scores[1] && scores[1] > scores[2]);
}

#[tokio::test(flavor = "multi_thread")]
async fn liked_and_skipped_listings_are_excluded_superliked_stay_eligible() {
    // Arranges
    let app = spawn_app().await;
    let user_id = Uuid::new_v4();

    let liked_id = app.seed_property(&sample_property_body()).await;
    let skipped_id = app.seed_property(&sample_property_body()).await;
    let superliked_id = app.seed_property(&sample_property_body()).await;
    let fresh_id = app.seed_property(&sample_property_body()).await;

    app.record_interaction(&user_id, &liked_id, "like").await;
    app.record_interaction(&user_id, &skipped_id, "skip").await;
    app.record_interaction(&user_id, &superliked_id, "superlike")
        .await;

    // Acts
    let recommendations = app
        .get_recommendation_list(&format!("user_id={}", user_id))
        .await;

    // Asserts
    let ids: Vec<String> = recommendations
        .iter()
        .map(|r| r["property"]["id"].as_str().unwrap().to_string())
        .collect();
    assert!(!ids.contains(&liked_id.to_string()));
    assert!(!ids.contains(&skipped_id.to_string()));
    assert!(ids.contains(&superliked_id.to_string()));
    assert!(ids.contains(&fresh_id.to_string()));
}

#[tokio::test(flavor = "multi_thread")]
async fn users_without_any_signal_get_recency_tagged_fallback() {
    // Arranges: no coordinates, no taste embedding, no edges
    let app = spawn_app().await;
    app.seed_property(&sample_property_body()).await;
    let newest_id = app.seed_property(&sample_property_body()).await;

    // Acts
    let recommendations = app
        .get_recommendation_list(&format!("user_id={}", Uuid::new_v4()))
        .await;

    // Asserts every entry is fallback-tagged and the newest comes first
    assert_eq!(recommendations.len(), 2);
    assert!(recommendations
        .iter()
        .all(|r| r["reason"].as_str().unwrap() == "fallback"));
    assert_eq!(
        recommendations[0]["property"]["id"].as_str().unwrap(),
        newest_id.to_string()
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn vector_mode_ranks_by_taste_similarity() {
    // Arranges: a stored taste embedding and candidates of varying alignment
    let app = spawn_app().await;
    let user_id = Uuid::new_v4();
    app.seed_user_embedding(&user_id, embedding_with_first_component(1.0))
        .await;

    let mut aligned = sample_property_body();
    aligned["embedding"] = json!(embedding_with_first_component(1.0));
    let aligned_id = app.seed_property(&aligned).await;

    let mut opposite = sample_property_body();
    opposite["embedding"] = json!(embedding_with_first_component(-1.0));
    let opposite_id = app.seed_property(&opposite).await;

    // Degraded data: no embedding at all, must neither crash nor be dropped
    let missing_id = app.seed_property(&sample_property_body()).await;

    // Acts
    let recommendations = app
        .get_recommendation_list(&format!("user_id={}", user_id))
        .await;

    // Asserts: all vector-tagged, scores normalized into [0, 1],
    // aligned > neutral > opposite
    assert_eq!(recommendations.len(), 3);
    assert!(recommendations
        .iter()
        .all(|r| r["reason"].as_str().unwrap() == "vector_similarity"));

    let ids: Vec<String> = recommendations
        .iter()
        .map(|r| r["property"]["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        ids,
        vec![
            aligned_id.to_string(),
            missing_id.to_string(),
            opposite_id.to_string()
        ]
    );

    let scores: Vec<f64> = recommendations
        .iter()
        .map(|r| r["score"].as_f64().unwrap())
        .collect();
    assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));
    assert!((scores[0] - 1.0).abs() < 1e-3);
    assert!((scores[1] - 0.5).abs() < 1e-3);
    assert!(scores[2] < 1e-3);
}

#[tokio::test(flavor = "multi_thread")]
async fn graph_mode_follows_edges_from_liked_listings() {
    // Arranges: no taste embedding (the liked listing carries none), so the
    // ladder lands on graph traversal
    let app = spawn_app().await;
    let user_id = Uuid::new_v4();

    let liked_id = app.seed_property(&sample_property_body()).await;
    let strong_id = app.seed_property(&sample_property_body()).await;
    let weak_id = app.seed_property(&sample_property_body()).await;
    let unreached_id = app.seed_property(&sample_property_body()).await;

    app.record_interaction(&user_id, &liked_id, "like").await;
    app.seed_edge(&liked_id, &strong_id, 0.9).await;
    app.seed_edge(&liked_id, &weak_id, 0.6).await;

    // Acts
    let recommendations = app
        .get_recommendation_list(&format!("user_id={}", user_id))
        .await;

    // Asserts: edge targets rank by weight, the rest arrives via fallback,
    // and the liked source itself is excluded
    let ids: Vec<String> = recommendations
        .iter()
        .map(|r| r["property"]["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        ids,
        vec![
            strong_id.to_string(),
            weak_id.to_string(),
            unreached_id.to_string()
        ]
    );

    assert_eq!(
        recommendations[0]["reason"].as_str().unwrap(),
        "graph_traversal"
    );
    assert!((recommendations[0]["score"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    assert_eq!(
        recommendations[1]["reason"].as_str().unwrap(),
        "graph_traversal"
    );
    assert_eq!(recommendations[2]["reason"].as_str().unwrap(), "fallback");
}

#[tokio::test(flavor = "multi_thread")]
async fn a_target_reached_through_several_liked_sources_scores_the_average_weight() {
    // Arranges
    let app = spawn_app().await;
    let user_id = Uuid::new_v4();

    let first_liked_id = app.seed_property(&sample_property_body()).await;
    let second_liked_id = app.seed_property(&sample_property_body()).await;
    let target_id = app.seed_property(&sample_property_body()).await;

    app.record_interaction(&user_id, &first_liked_id, "like")
        .await;
    app.record_interaction(&user_id, &second_liked_id, "superlike")
        .await;
    app.seed_edge(&first_liked_id, &target_id, 0.9).await;
    app.seed_edge(&second_liked_id, &target_id, 0.7).await;

    // Acts
    let recommendations = app
        .get_recommendation_list(&format!("user_id={}", user_id))
        .await;

    // Asserts the two incoming weights are averaged
    let target = recommendations
        .iter()
        .find(|r| r["property"]["id"].as_str().unwrap() == target_id.to_string())
        .expect("Edge target missing from the ranking");
    assert_eq!(target["reason"].as_str().unwrap(), "graph_traversal");
    assert!((target["score"].as_f64().unwrap() - 0.8).abs() < 1e-6);
}
