//! HTTP API tests against an in-memory store and a canned weather provider

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use weathercard::{
    ActivityEvaluator, CardService, CurrentWeather, MemoryCardStore, Result, WeatherCardError,
    WeatherProvider, WeatherReading, web,
};

struct CannedWeather;

#[async_trait]
impl WeatherProvider for CannedWeather {
    async fn current(&self, city: &str) -> Result<CurrentWeather> {
        if city == "Atlantis" {
            return Err(WeatherCardError::weather("City not found: Atlantis"));
        }
        Ok(CurrentWeather {
            city: "Lisbon".to_string(),
            reading: WeatherReading::new(24.0, 60.0, 12.0, 10.0),
        })
    }

    async fn daily_forecast(&self, _city: &str) -> Result<Vec<WeatherReading>> {
        Ok((1..=5)
            .map(|day| {
                let mut reading = WeatherReading::new(10.0 + 4.0 * day as f32, 60.0, 12.0, 10.0);
                reading.timestamp = Some(format!("2026-06-0{day} 12:00:00"));
                reading
            })
            .collect())
    }
}

/// Provider that answers slower than the router's deadline
struct StalledWeather;

#[async_trait]
impl WeatherProvider for StalledWeather {
    async fn current(&self, city: &str) -> Result<CurrentWeather> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        CannedWeather.current(city).await
    }

    async fn daily_forecast(&self, city: &str) -> Result<Vec<WeatherReading>> {
        CannedWeather.daily_forecast(city).await
    }
}

fn app_with(weather: Arc<dyn WeatherProvider>, timeout: Duration) -> Router {
    let service = CardService::new(
        weather,
        Arc::new(MemoryCardStore::new()),
        ActivityEvaluator::default(),
    );
    web::app(Arc::new(service), "does-not-exist", timeout)
}

fn app() -> Router {
    app_with(Arc::new(CannedWeather), Duration::from_secs(5))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create(app: &Router, city: &str, activity: &str) -> Value {
    let (status, card) = send(
        app,
        Method::POST,
        "/api/cards",
        Some(json!({ "city": city, "activity_id": activity })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    card
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(), Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], weathercard::VERSION);
}

#[tokio::test]
async fn test_list_activities() {
    let (status, body) = send(&app(), Method::GET, "/api/activities", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            { "id": "running", "name": "Running" },
            { "id": "beach", "name": "Beach" },
            { "id": "picnic", "name": "Picnic" }
        ])
    );
}

#[tokio::test]
async fn test_create_and_list_cards() {
    let app = app();
    let card = create(&app, "lisboa", "beach").await;
    assert_eq!(card["city"], "Lisbon");
    assert_eq!(card["activity_id"], "beach");
    assert_eq!(card["condition"], "Suitable");

    let (status, cards) = send(&app, Method::GET, "/api/cards", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cards.as_array().unwrap().len(), 1);
    assert_eq!(cards[0]["id"], card["id"]);
    assert_eq!(cards[0]["activity_name"], "Beach");
}

#[tokio::test]
async fn test_create_card_errors() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/cards",
        Some(json!({ "activity_id": "beach" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadRequest");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/cards",
        Some(json!({ "city": "Lisbon", "activity_id": "skiing" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Activity not found.");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/cards",
        Some(json!({ "city": "Atlantis", "activity_id": "running" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "BadGateway");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/cards")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh_and_delete_card() {
    let app = app();
    let card = create(&app, "Lisbon", "running").await;
    let uri = format!("/api/cards/{}", card["id"].as_str().unwrap());

    let (status, refreshed) = send(&app, Method::PUT, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(refreshed["id"], card["id"]);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Card not found.");

    let (status, _) = send(&app, Method::PUT, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_card_forecast() {
    let app = app();
    let card = create(&app, "Lisbon", "beach").await;
    let uri = format!("/api/cards/{}/forecast", card["id"].as_str().unwrap());

    let (status, days) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let days = days.as_array().unwrap().clone();
    assert_eq!(days.len(), 5);
    assert_eq!(days[0]["date"], "2026-06-01 12:00:00");
    // 14°C is too cold for the beach, 30°C is fine
    assert_eq!(days[0]["verdict"]["suitable"], false);
    assert_eq!(days[4]["verdict"]["suitable"], true);

    let (status, _) = send(&app, Method::GET, "/api/cards/missing/forecast", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_history_tracks_mutations() {
    let app = app();
    let card = create(&app, "Lisbon", "picnic").await;
    let uri = format!("/api/cards/{}", card["id"].as_str().unwrap());
    send(&app, Method::PUT, &uri, None).await;
    send(&app, Method::DELETE, &uri, None).await;

    let (status, history) = send(&app, Method::GET, "/api/history", None).await;
    assert_eq!(status, StatusCode::OK);
    let ops: Vec<&str> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["operation"].as_str().unwrap())
        .collect();
    assert_eq!(ops, vec!["CREATE", "UPDATE", "DELETE"]);
    assert!(history.as_array().unwrap().iter().all(|h| h["entity"] == "CARD"));
}

#[tokio::test]
async fn test_slow_weather_is_gateway_timeout() {
    let app = app_with(Arc::new(StalledWeather), Duration::from_millis(50));
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/cards",
        Some(json!({ "city": "Lisbon", "activity_id": "running" })),
    )
    .await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);

    let (status, cards) = send(&app, Method::GET, "/api/cards", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(cards.as_array().unwrap().is_empty());
}
