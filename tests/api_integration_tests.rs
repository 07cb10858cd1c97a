// API integration tests
//
// Purpose: drive every endpoint through the router, offline (mock chat,
// demo weather, no trained models).
// Run with: cargo test --test api_integration_tests

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use farm_advisor_rust::{create_router, AppState, Settings};
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt; // for oneshot

// Helper: offline app with the given per-minute limit
fn create_test_app(rate_limit: usize) -> axum::Router {
    let settings = Settings {
        rate_limit,
        ..Settings::default()
    };
    let state = AppState::new(settings).expect("test state should build offline");
    create_router(state)
}

// Helper: JSON POST request from a client address
fn post_json(uri: &str, client: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", client)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_req(uri: &str, client: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-forwarded-for", client)
        .body(Body::empty())
        .unwrap()
}

// Helper: parse JSON response
async fn json_response(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&body).expect("Failed to parse JSON")
}

fn crop_body() -> Value {
    json!({
        "nitrogen": 50.0,
        "phosphorus": 50.0,
        "potassium": 50.0,
        "temperature": 25.0,
        "humidity": 80.0,
        "ph": 6.5,
        "rainfall": 200.0
    })
}

fn fertilizer_body(nitrogen: f64) -> Value {
    json!({
        "nitrogen": nitrogen,
        "phosphorus": 45.0,
        "potassium": 45.0,
        "temperature": 28.0,
        "humidity": 65.0,
        "moisture": 40.0,
        "soil_type": "Loam",
        "crop_type": "rice"
    })
}

// =========================================================================
// Section 1: Health
// =========================================================================

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app(10);

    let response = app.oneshot(get_req("/health", "1.1.1.1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_response(response).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_root_reports_service() {
    let app = create_test_app(10);

    let response = app.oneshot(get_req("/", "1.1.1.1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_response(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "farm-advisor-api");
}

// =========================================================================
// Section 2: Crop recommendation
// =========================================================================

#[tokio::test]
async fn test_crop_recommendation_wet_tropical() {
    let app = create_test_app(10);

    let response = app
        .oneshot(post_json("/predict/crop", "2.2.2.2", &crop_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_response(response).await;
    assert_eq!(body["success"], true);

    let recommendations = body["recommendations"].as_array().unwrap();
    assert!(!recommendations.is_empty() && recommendations.len() <= 5);
    assert_eq!(recommendations[0]["crop"], "Rice");
    assert_eq!(recommendations[0]["confidence"], 90.0);
    assert!(recommendations[0]["season"].is_string());
    assert!(recommendations[0]["water_requirement"].is_string());
}

#[tokio::test]
async fn test_crop_recommendation_rejects_out_of_range() {
    let app = create_test_app(10);

    let mut body = crop_body();
    body["rainfall"] = json!(900.0);

    let response = app
        .oneshot(post_json("/predict/crop", "2.2.2.3", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = json_response(response).await;
    assert!(body["error"].as_str().unwrap().contains("rainfall"));
}

// =========================================================================
// Section 3: Fertilizer advisory
// =========================================================================

#[tokio::test]
async fn test_fertilizer_excess_nitrogen() {
    let app = create_test_app(10);

    let response = app
        .oneshot(post_json("/predict/fertilizer", "3.3.3.3", &fertilizer_body(140.0)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_response(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["crop"], "rice");
    assert_eq!(body["optimal_npk"]["nitrogen"], json!([60.0, 120.0]));
    assert_eq!(body["current_npk"]["nitrogen"], 140.0);

    let recommendations = body["recommendations"].as_array().unwrap();
    let descriptions: Vec<&str> = recommendations
        .iter()
        .map(|r| r["description"].as_str().unwrap())
        .collect();
    assert!(descriptions.iter().any(|d| d.contains("excess nitrogen")));
    assert!(!descriptions.iter().any(|d| d.contains("nitrogen is deficient")));
}

#[tokio::test]
async fn test_fertilizer_maintain_when_balanced() {
    let app = create_test_app(10);

    let response = app
        .oneshot(post_json("/predict/fertilizer", "3.3.3.4", &fertilizer_body(90.0)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_response(response).await;
    let recommendations = body["recommendations"].as_array().unwrap();
    assert_eq!(recommendations.len(), 1);
    assert_eq!(recommendations[0]["type"], "maintain");
}

#[tokio::test]
async fn test_fertilizer_crop_key_tolerant() {
    let app = create_test_app(10);

    let mut body = fertilizer_body(140.0);
    body["crop_type"] = json!(" Rice ");

    let response = app
        .oneshot(post_json("/predict/fertilizer", "3.3.3.5", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_response(response).await;
    // Same band as plain "rice"
    assert_eq!(body["optimal_npk"]["nitrogen"], json!([60.0, 120.0]));
}

// =========================================================================
// Section 4: Rate limiting
// =========================================================================

#[tokio::test]
async fn test_rate_limit_rejects_after_quota() {
    let app = create_test_app(2);

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(post_json("/predict/crop", "9.9.9.9", &crop_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(post_json("/predict/crop", "9.9.9.9", &crop_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let body = json_response(response).await;
    assert!(body["error"].as_str().unwrap().contains("Too many requests"));
    assert!(body["retry_after_secs"].as_u64().unwrap() <= 60);
}

#[tokio::test]
async fn test_rate_limit_clients_independent() {
    let app = create_test_app(1);

    let ok = app
        .clone()
        .oneshot(post_json("/predict/crop", "8.8.8.8", &crop_body()))
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);

    let limited = app
        .clone()
        .oneshot(post_json("/predict/crop", "8.8.8.8", &crop_body()))
        .await
        .unwrap();
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);

    // A different client still gets through
    let other = app
        .clone()
        .oneshot(post_json("/predict/crop", "8.8.4.4", &crop_body()))
        .await
        .unwrap();
    assert_eq!(other.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_shared_across_endpoints() {
    let app = create_test_app(1);

    let first = app
        .clone()
        .oneshot(post_json("/chat", "7.7.7.7", &json!({ "message": "hello" })))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    // The quota is per client, not per endpoint
    let second = app
        .clone()
        .oneshot(post_json("/predict/crop", "7.7.7.7", &crop_body()))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
}

// =========================================================================
// Section 5: Chat (mock mode)
// =========================================================================

#[tokio::test]
async fn test_chat_mock_reply() {
    let app = create_test_app(10);

    let response = app
        .oneshot(post_json(
            "/chat",
            "5.5.5.5",
            &json!({ "message": "how do I grow rice?" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_response(response).await;
    assert_eq!(body["mock"], true);
    assert!(body["reply"].as_str().unwrap().contains("Rice"));
    assert!(body["tokens_used"].is_null());
}

#[tokio::test]
async fn test_chat_rejects_invalid_history_role() {
    let app = create_test_app(10);

    let response = app
        .oneshot(post_json(
            "/chat",
            "5.5.5.6",
            &json!({
                "message": "hi",
                "history": [{ "role": "system", "content": "sneaky" }]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_chat_rejects_empty_message() {
    let app = create_test_app(10);

    let response = app
        .oneshot(post_json("/chat", "5.5.5.7", &json!({ "message": "  " })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// =========================================================================
// Section 6: Weather proxy (demo mode)
// =========================================================================

#[tokio::test]
async fn test_weather_demo_payload() {
    let app = create_test_app(10);

    let response = app
        .oneshot(get_req("/api/weather?lat=12.97&lon=77.59", "6.6.6.6"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_response(response).await;
    assert_eq!(body["_mock"], true);
    assert_eq!(body["coord"]["lat"], 12.97);
    assert!(body["main"]["temp"].is_number());
}

#[tokio::test]
async fn test_weather_forecast_demo_payload() {
    let app = create_test_app(10);

    let response = app
        .oneshot(get_req(
            "/api/weather/forecast?lat=12.97&lon=77.59&units=metric",
            "6.6.6.7",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_response(response).await;
    assert_eq!(body["_mock"], true);
    assert_eq!(body["list"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_weather_response_is_cached() {
    let app = create_test_app(10);

    let first = app
        .clone()
        .oneshot(get_req("/api/weather?lat=1.0&lon=2.0", "6.6.6.8"))
        .await
        .unwrap();
    let first_body = json_response(first).await;

    // Cache TTL is minutes; an immediate repeat serves the same payload
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second = app
        .clone()
        .oneshot(get_req("/api/weather?lat=1.0&lon=2.0", "6.6.6.9"))
        .await
        .unwrap();
    let second_body = json_response(second).await;

    assert_eq!(first_body, second_body);
}
