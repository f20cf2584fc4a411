//! WxmClient behavior against a mock WeatherXM Pro API.

use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wxmdash_weather::{new_call_log, CallLogHandle, Coordinate, WxmClient, WxmError};

const API_KEY: &str = "85e7123d-a2aa-41a6-9c03-7e9773d5b942";

async fn client_for(server: &MockServer, log: CallLogHandle) -> WxmClient {
    let base = Url::parse(&format!("{}/", server.uri())).unwrap();
    WxmClient::with_base_url(base, API_KEY, log).unwrap()
}

fn station(id: &str, lat: f64, lon: f64, qod: f64, cell: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": format!("Station {id}"),
        "lat": lat,
        "lon": lon,
        "lastDayQod": qod,
        "cell_index": cell,
    })
}

#[tokio::test]
async fn discovery_filters_low_quality_and_sorts_by_distance() {
    let server = MockServer::start().await;
    let query = Coordinate::new(37.9838, 23.7275);

    // Listed far-first to prove the sort; the 0.5-qod station must vanish.
    let body = json!({
        "stations": [
            station("far", 38.20, 23.90, 1.0, "cell-far"),
            station("near", 37.99, 23.73, 0.95, "cell-near"),
            station("junk", 37.98, 23.72, 0.5, "cell-junk"),
        ]
    });

    Mock::given(method("GET"))
        .and(path("/stations/bounds"))
        .and(header("X-API-Key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let log = new_call_log();
    let client = client_for(&server, log.clone()).await;
    let stations = client.discover_stations(&query).await.unwrap();

    let ids: Vec<&str> = stations.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["near", "far"]);
    assert!(stations.iter().all(|s| s.last_day_qod > 0.9));

    // All four box edges went out as query parameters and were logged.
    let log = log.lock();
    let entry = log.entries().next().unwrap();
    for key in ["min_lat", "min_lon", "max_lat", "max_lon"] {
        assert!(entry.url.contains(key), "missing {key} in {}", entry.url);
        assert!(entry.params.iter().any(|(k, _)| k == key));
    }
}

#[tokio::test]
async fn discovery_sorted_output_is_non_decreasing_by_distance() {
    let server = MockServer::start().await;
    let query = Coordinate::new(37.9838, 23.7275);

    let body = json!({
        "stations": [
            station("a", 38.1, 23.9, 0.95, "c1"),
            station("b", 37.99, 23.73, 0.99, "c2"),
            station("c", 38.25, 23.5, 1.0, "c3"),
            station("d", 37.95, 23.70, 0.92, "c4"),
        ]
    });

    Mock::given(method("GET"))
        .and(path("/stations/bounds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = client_for(&server, new_call_log()).await;
    let stations = client.discover_stations(&query).await.unwrap();

    let distances: Vec<f64> = stations
        .iter()
        .map(|s| wxmdash_weather::haversine_km(&query, &s.coordinate()))
        .collect();
    assert!(distances.windows(2).all(|w| w[0] <= w[1]), "{distances:?}");
}

#[tokio::test]
async fn discovery_empty_station_list_is_no_stations_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/stations/bounds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "stations": [] })))
        .mount(&server)
        .await;

    let client = client_for(&server, new_call_log()).await;
    let err = client
        .discover_stations(&Coordinate::new(37.9838, 23.7275))
        .await
        .unwrap_err();
    assert!(matches!(err, WxmError::NoStations));
}

#[tokio::test]
async fn discovery_all_filtered_out_returns_empty_list() {
    let server = MockServer::start().await;

    let body = json!({ "stations": [station("meh", 37.99, 23.73, 0.9, "c")] });
    Mock::given(method("GET"))
        .and(path("/stations/bounds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = client_for(&server, new_call_log()).await;
    // Exactly 0.9 does not exceed the threshold.
    let stations = client
        .discover_stations(&Coordinate::new(37.9838, 23.7275))
        .await
        .unwrap();
    assert!(stations.is_empty());
}

#[tokio::test]
async fn discovery_non_success_carries_status_and_provider_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/stations/bounds"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid API key" })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, new_call_log()).await;
    let err = client
        .discover_stations(&Coordinate::new(37.9838, 23.7275))
        .await
        .unwrap_err();

    match err {
        WxmError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid API key");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn discovery_invalid_json_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/stations/bounds"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(&server, new_call_log()).await;
    let err = client
        .discover_stations(&Coordinate::new(37.9838, 23.7275))
        .await
        .unwrap_err();
    assert!(matches!(err, WxmError::Parse(_)));
}

#[tokio::test]
async fn latest_observation_normalizes_missing_fields() {
    let server = MockServer::start().await;

    let body = json!({
        "observation": {
            "temperature": 28.4,
            "wind_speed": 2.1,
            "feels_like": 30.2
        }
    });
    Mock::given(method("GET"))
        .and(path("/stations/st-1/latest"))
        .and(header("X-API-Key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = client_for(&server, new_call_log()).await;
    let obs = client.latest_observation("st-1").await.unwrap();

    assert_eq!(obs.temperature, 28.4);
    assert_eq!(obs.wind_speed, 2.1);
    assert_eq!(obs.feels_like, 30.2);
    assert_eq!(obs.humidity, 0.0);
    assert_eq!(obs.uv_index, 0.0);
    assert_eq!(obs.condition, "Unknown");
}

#[tokio::test]
async fn latest_observation_missing_object_is_treated_as_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/stations/st-2/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = client_for(&server, new_call_log()).await;
    let obs = client.latest_observation("st-2").await.unwrap();
    assert_eq!(obs.temperature, 0.0);
    assert_eq!(obs.condition, "Unknown");
}

#[tokio::test]
async fn forecast_returns_typed_points() {
    let server = MockServer::start().await;

    let body = json!([
        {
            "timestamp": "2026-08-29T12:00:00Z",
            "temperature": 27.0,
            "humidity": 55.0,
            "wind_speed": 4.2,
            "wind_direction": 200.0,
            "precipitation": 0.0,
            "pressure": 1011.2,
            "solar_radiation": 710.0
        },
        { "timestamp": "2026-08-29T13:00:00Z" }
    ]);
    Mock::given(method("GET"))
        .and(path("/v1/cells/abc/forecast"))
        .and(header("X-API-Key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = client_for(&server, new_call_log()).await;
    let points = client.cell_forecast("abc").await.unwrap();

    assert_eq!(points.len(), 2);
    assert_eq!(points[0].temperature, 27.0);
    assert_eq!(points[1].temperature, 0.0);
}

#[tokio::test]
async fn forecast_non_success_is_api_error_with_status_text() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/cells/abc/forecast"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(&server, new_call_log()).await;
    let err = client.cell_forecast("abc").await.unwrap_err();

    match err {
        WxmError::Api { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "Service Unavailable");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn every_call_lands_in_the_injected_log_with_status_and_duration() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/stations/st-1/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let log = new_call_log();
    let client = client_for(&server, log.clone()).await;
    client.latest_observation("st-1").await.unwrap();

    let log = log.lock();
    assert_eq!(log.len(), 1);
    let entry = log.entries().next().unwrap();
    assert_eq!(entry.method, "GET");
    assert!(entry.url.contains("/stations/st-1/latest"));
    assert_eq!(entry.status, Some(200));
    assert!(entry.duration.is_some());
}
