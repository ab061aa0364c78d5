use httpmock::prelude::*;
use nexus_scoreboard::adapters::{WeatherCheck, WeatherClient};
use nexus_scoreboard::domain::ports::WeatherProvider;
use std::time::Duration;

fn client(server: &MockServer) -> WeatherClient {
    WeatherClient::new(server.base_url(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_current_weather_is_parsed() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/data/2.5/weather")
            .query_param("q", "Denver, CO, US")
            .query_param("appid", "good-key")
            .query_param("units", "metric");
        then.status(200).json_body(serde_json::json!({
            "cod": 200,
            "name": "Denver",
            "main": {"temp": 18.4, "humidity": 20},
            "weather": [{"main": "Clear", "description": "clear sky"}]
        }));
    });

    let report = client(&server)
        .current("Denver, CO, US", "good-key", "metric")
        .await
        .unwrap();

    api_mock.assert();
    assert_eq!(report.location, "Denver");
    assert_eq!(report.description, "clear sky");
    assert_eq!(report.temperature_label(), "18°C");
}

#[tokio::test]
async fn test_validate_reports_key_and_city_problems() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/data/2.5/weather")
            .query_param("appid", "bad-key");
        then.status(401)
            .json_body(serde_json::json!({"cod": 401, "message": "Invalid API key"}));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/data/2.5/weather")
            .query_param("q", "Atlantis");
        then.status(404)
            .json_body(serde_json::json!({"cod": "404", "message": "city not found"}));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/data/2.5/weather")
            .query_param("q", "Denver")
            .query_param("appid", "good-key");
        then.status(200).json_body(serde_json::json!({
            "name": "Denver",
            "main": {"temp": 65.0},
            "weather": [{"description": "few clouds"}]
        }));
    });

    let client = client(&server);
    assert_eq!(client.validate("Denver", "bad-key").await, WeatherCheck::InvalidKey);
    assert_eq!(client.validate("Atlantis", "good-key").await, WeatherCheck::CityNotFound);
    assert_eq!(client.validate("Denver", "").await, WeatherCheck::MissingInput);
    assert!(client.validate("Denver", "good-key").await.is_valid());
}
