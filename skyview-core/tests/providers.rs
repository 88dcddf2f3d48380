//! HTTP-level behavior of the provider clients against a mock server.

use skyview_core::{
    Coordinates, FetchError, LocationError, UnitSystem, UvProvider, WeatherProvider,
    locator::{IpLocator, Locator},
    provider::{openmeteo::OpenMeteoUvProvider, openweather::OpenWeatherProvider},
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn current_body(name: &str, temp: f64) -> serde_json::Value {
    serde_json::json!({
        "coord": {"lon": -0.1257, "lat": 51.5085},
        "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}],
        "main": {"temp": temp, "feels_like": temp - 1.5, "humidity": 72, "pressure": 1012},
        "wind": {"speed": 5.7, "deg": 240},
        "dt": 1_718_000_000,
        "sys": {"country": "GB", "sunrise": 1_717_990_000, "sunset": 1_718_049_000},
        "timezone": 3600,
        "name": name,
        "cod": 200
    })
}

fn provider(server: &MockServer) -> OpenWeatherProvider {
    OpenWeatherProvider::new("TEST_KEY".to_string(), &server.uri())
}

#[tokio::test]
async fn current_by_name_passes_key_units_and_fields() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "London"))
        .and(query_param("appid", "TEST_KEY"))
        .and(query_param("units", "imperial"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("London", 55.4)))
        .mount(&server)
        .await;

    let c = provider(&server)
        .current_by_name("London", UnitSystem::Imperial)
        .await
        .unwrap();

    assert_eq!(c.location_name, "London");
    assert_eq!(c.temperature, 55.4);
    assert_eq!(c.feels_like, 55.4 - 1.5);
    assert_eq!(c.humidity_pct, 72);
    assert_eq!(c.wind_speed, 5.7);
    assert_eq!(c.wind_direction_deg, Some(240.0));
    assert_eq!(c.description, "broken clouds");
    assert_eq!(c.timezone_offset_secs, 3600);
    assert_eq!(c.coordinates, Coordinates::new(51.5085, -0.1257));
}

#[tokio::test]
async fn current_by_coordinates_sends_lat_lon() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "51.5085"))
        .and(query_param("lon", "-0.1257"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("London", 13.1)))
        .mount(&server)
        .await;

    let c = provider(&server)
        .current_by_coordinates(Coordinates::new(51.5085, -0.1257), UnitSystem::Metric)
        .await
        .unwrap();

    assert_eq!(c.temperature, 13.1);
}

#[tokio::test]
async fn unknown_city_is_not_found_with_provider_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .mount(&server)
        .await;

    let err = provider(&server)
        .current_by_name("Atlantis", UnitSystem::Metric)
        .await
        .unwrap_err();

    assert_eq!(err, FetchError::NotFound("city not found".to_string()));
}

#[tokio::test]
async fn malformed_body_is_a_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = provider(&server)
        .current_by_name("London", UnitSystem::Metric)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Provider(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn unreachable_host_is_a_network_error() {
    let p = OpenWeatherProvider::new("K".to_string(), "http://127.0.0.1:1");
    let err = p.current_by_name("London", UnitSystem::Metric).await.unwrap_err();
    assert!(matches!(err, FetchError::Network(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn forecast_returns_series_in_requested_units() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "cod": "200",
            "list": [
                {"dt": 1_718_013_600, "main": {"temp": 14.2, "humidity": 70},
                 "weather": [{"description": "light rain"}], "dt_txt": "2024-06-10 10:00:00"},
                {"dt": 1_718_024_400, "main": {"temp": 16.0, "humidity": 64},
                 "weather": [{"description": "few clouds"}], "dt_txt": "2024-06-10 13:00:00"}
            ],
            "city": {"name": "London", "country": "GB"}
        })))
        .mount(&server)
        .await;

    let series = provider(&server)
        .forecast(Coordinates::new(51.5, -0.12), UnitSystem::Metric)
        .await
        .unwrap();

    assert_eq!(series.len(), 2);
    assert_eq!(series[0].temperature, 14.2);
    assert_eq!(series[1].description, "few clouds");
    assert!(series[0].timestamp < series[1].timestamp);
}

#[tokio::test]
async fn air_quality_reads_first_entry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/air_pollution"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "coord": {"lon": -0.12, "lat": 51.5},
            "list": [{"main": {"aqi": 3}, "components": {"co": 201.9}, "dt": 1_718_000_000}]
        })))
        .mount(&server)
        .await;

    let aqi = provider(&server).air_quality(Coordinates::new(51.5, -0.12)).await;
    assert_eq!(aqi.map(|a| a.value()), Some(3));
}

#[tokio::test]
async fn air_quality_failure_is_absent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/air_pollution"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "cod": 401,
            "message": "Invalid API key"
        })))
        .mount(&server)
        .await;

    assert!(provider(&server).air_quality(Coordinates::new(0.0, 0.0)).await.is_none());
}

#[tokio::test]
async fn suggestions_map_geocoding_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", "Lond"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"name": "London", "lat": 51.5, "lon": -0.12, "country": "GB"},
            {"name": "London", "lat": 42.98, "lon": -81.24, "country": "CA", "state": "Ontario"}
        ])))
        .mount(&server)
        .await;

    let suggestions = provider(&server).suggestions("Lond").await;
    let labels: Vec<String> = suggestions.iter().map(ToString::to_string).collect();
    assert_eq!(labels, ["London, GB", "London, CA"]);
}

#[tokio::test]
async fn suggestions_failure_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(provider(&server).suggestions("Lond").await.is_empty());
}

#[tokio::test]
async fn uv_index_comes_from_separate_host() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("current", "uv_index"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "latitude": 51.5,
            "longitude": -0.12,
            "current": {"time": "2024-06-10T12:00", "interval": 900, "uv_index": 6.35}
        })))
        .mount(&server)
        .await;

    let uv = OpenMeteoUvProvider::new(&server.uri())
        .uv_index(Coordinates::new(51.5, -0.12))
        .await;
    assert_eq!(uv.map(|u| u.0), Some(6.35));
}

#[tokio::test]
async fn uv_index_failure_is_absent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": true,
            "reason": "Latitude must be in range of -90 to 90°."
        })))
        .mount(&server)
        .await;

    let uv = OpenMeteoUvProvider::new(&server.uri())
        .uv_index(Coordinates::new(120.0, 0.0))
        .await;
    assert!(uv.is_none());
}

#[tokio::test]
async fn ip_locator_reads_position() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "city": "Lisbon",
            "lat": 38.72,
            "lon": -9.14
        })))
        .mount(&server)
        .await;

    let locator = IpLocator::new(&format!("{}/json", server.uri()));
    assert_eq!(locator.locate().await, Ok(Coordinates::new(38.72, -9.14)));
}

#[tokio::test]
async fn ip_locator_maps_refusal_and_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/denied"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/private"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "fail",
            "message": "private range"
        })))
        .mount(&server)
        .await;

    let denied = IpLocator::new(&format!("{}/denied", server.uri())).locate().await;
    assert_eq!(denied, Err(LocationError::PermissionDenied));

    let private = IpLocator::new(&format!("{}/private", server.uri())).locate().await;
    assert_eq!(private, Err(LocationError::Unavailable("private range".to_string())));
}
