//! Integration tests for WeatherClient using wiremock.
//!
//! Call counts are asserted with `.expect(n)`, which the mock server verifies
//! when it is dropped at the end of each test.

use std::sync::Arc;
use std::time::Duration;

use skycast_weather::{DecodeError, NetworkError, WeatherClient, WeatherError, DEFAULT_TIMEOUT};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-key";

fn payload(name: &str, country: &str, temp: f64, condition: &str) -> serde_json::Value {
    serde_json::json!({
        "coord": {"lon": 2.35, "lat": 48.85},
        "weather": [{"id": 800, "main": condition, "description": "n/a", "icon": "01d"}],
        "main": {"temp": temp, "pressure": 1012, "humidity": 40},
        "sys": {"type": 2, "country": country},
        "name": name,
        "cod": 200
    })
}

fn client_for(server: &MockServer) -> WeatherClient {
    WeatherClient::with_base_url(API_KEY, &server.uri(), DEFAULT_TIMEOUT).unwrap()
}

#[tokio::test]
async fn test_fetch_sends_expected_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "London"))
        .and(query_param("appid", API_KEY))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload("London", "GB", 15.2, "Clouds")))
        .expect(1)
        .mount(&server)
        .await;

    let record = client_for(&server).fetch_weather("London").await.unwrap();

    assert_eq!(record.city, "London");
    assert_eq!(record.country, "GB");
    assert_eq!(record.temperature_celsius, 15.2);
    assert_eq!(record.condition_summary, "Clouds");
}

#[tokio::test]
async fn test_second_fetch_is_served_from_cache() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("q", "Paris"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload("Paris", "FR", 18.0, "Clear")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let first = client.fetch_weather("Paris").await.unwrap();
    let second = client.fetch_weather("Paris").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(client.cached("Paris"), Some(first));
    assert_eq!(client.cache_stats().hits(), 1);
}

#[tokio::test]
async fn test_cache_key_is_exact_input() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload("Paris", "FR", 18.0, "Clear")))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.fetch_weather("Paris").await.unwrap();
    client.fetch_weather("paris").await.unwrap();

    // Keyed by what was typed, not the resolved name
    assert!(client.cached("paris").is_some());
}

#[tokio::test]
async fn test_city_with_spaces_is_encoded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("q", "New York"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload("New York", "US", 9.5, "Rain")))
        .expect(1)
        .mount(&server)
        .await;

    let record = client_for(&server).fetch_weather("New York").await.unwrap();
    assert_eq!(record.city, "New York");
}

#[tokio::test]
async fn test_empty_city_fails_before_network() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.fetch_weather("").await;

    assert!(matches!(result, Err(WeatherError::Encoding(_))));
}

#[tokio::test]
async fn test_not_found_is_network_error_with_provider_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.fetch_weather("Atlantis").await;

    match result {
        Err(WeatherError::Network(NetworkError::Status { status, message })) => {
            assert_eq!(status, 404);
            assert_eq!(message, "city not found");
        }
        other => panic!("expected 404 status error, got {:?}", other),
    }

    // Failures are not cached
    assert!(client.cached("Atlantis").is_none());
    assert!(client.fetch_weather("Atlantis").await.is_err());
}

#[tokio::test]
async fn test_unauthorized_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("nope"))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_weather("Paris").await.unwrap_err();

    assert!(matches!(
        err,
        WeatherError::Network(NetworkError::Status { status: 401, .. })
    ));
    assert!(err.user_message().contains("API key"));
}

#[tokio::test]
async fn test_malformed_body_is_decode_error_and_not_cached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "Paris",
            "main": {"temp": 18.0},
            "weather": [{"main": "Clear"}]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.fetch_weather("Paris").await;

    assert!(matches!(
        result,
        Err(WeatherError::Decode(DecodeError::Malformed(_)))
    ));
    assert!(client.cached("Paris").is_none());
}

#[tokio::test]
async fn test_empty_conditions_is_decode_error() {
    let server = MockServer::start().await;

    let mut body = payload("Paris", "FR", 18.0, "Clear");
    body["weather"] = serde_json::json!([]);
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let result = client_for(&server).fetch_weather("Paris").await;

    assert_eq!(
        result,
        Err(WeatherError::Decode(DecodeError::EmptyConditions))
    );
}

#[tokio::test]
async fn test_timeout_is_network_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(payload("Paris", "FR", 18.0, "Clear"))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client =
        WeatherClient::with_base_url(API_KEY, &server.uri(), Duration::from_millis(50)).unwrap();
    let result = client.fetch_weather("Paris").await;

    assert_eq!(result, Err(WeatherError::Network(NetworkError::Timeout)));
    assert!(client.cached("Paris").is_none());
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Port 9 (discard) is not expected to accept HTTP connections.
    let client =
        WeatherClient::with_base_url(API_KEY, "http://127.0.0.1:9", DEFAULT_TIMEOUT).unwrap();

    let result = client.fetch_weather("Paris").await;

    assert!(matches!(result, Err(WeatherError::Network(_))));
}

#[tokio::test]
async fn test_concurrent_fetches_share_one_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("q", "Tokyo"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(payload("Tokyo", "JP", 25.0, "Clear"))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = Arc::new(client_for(&server));
    let handles: Vec<_> = (0..5)
        .map(|_| {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.fetch_weather("Tokyo").await })
        })
        .collect();

    for handle in handles {
        let record = handle.await.unwrap().unwrap();
        assert_eq!(record.city, "Tokyo");
    }
    assert_eq!(client.cache_stats().misses(), 1);
}

#[tokio::test]
async fn test_transport_error_does_not_expose_api_key() {
    let secret = "SECRET-KEY-123";
    let client =
        WeatherClient::with_base_url(secret, "http://127.0.0.1:9", DEFAULT_TIMEOUT).unwrap();

    let err = client.fetch_weather("Paris").await.unwrap_err();

    assert!(matches!(err, WeatherError::Network(_)));
    assert!(!err.to_string().contains(secret), "leaked key: {}", err);
    assert!(!format!("{:?}", err).contains(secret));
}
