//! GeoClient behavior against a mock Nominatim instance.

use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wxmdash_weather::{new_call_log, Coordinate, GeoClient};

async fn client_for(server: &MockServer) -> GeoClient {
    let base = Url::parse(&format!("{}/", server.uri())).unwrap();
    GeoClient::with_base_url(base, "wxmdash-tests/0.1", new_call_log()).unwrap()
}

#[tokio::test]
async fn search_parses_decimal_string_coordinates() {
    let server = MockServer::start().await;

    let body = json!([
        { "display_name": "Athens, Greece", "lat": "37.9838", "lon": "23.7275" },
        { "display_name": "Athens, Georgia, USA", "lat": "33.9519", "lon": "-83.3576" }
    ]);
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("format", "json"))
        .and(query_param("q", "Athens"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let results = client.search("Athens").await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].display_name, "Athens, Greece");
    assert_eq!(results[0].lat, 37.9838);
    assert_eq!(results[0].lon, 23.7275);

    let coord = results[0].coordinate();
    assert_eq!(coord.label.as_deref(), Some("Athens, Greece"));
}

#[tokio::test]
async fn search_drops_hits_with_unparsable_coordinates() {
    let server = MockServer::start().await;

    let body = json!([
        { "display_name": "Good", "lat": "1.0", "lon": "2.0" },
        { "display_name": "Bad", "lat": "not-a-number", "lon": "2.0" }
    ]);
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let results = client.search("anything").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].display_name, "Good");
}

#[tokio::test]
async fn reverse_returns_display_name() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .and(query_param("format", "json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "display_name": "Athens, Greece" })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let name = client.reverse(&Coordinate::new(37.9838, 23.7275)).await;
    assert_eq!(name, "Athens, Greece");
}

#[tokio::test]
async fn reverse_failure_falls_back_to_numeric_label() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let name = client.reverse(&Coordinate::new(37.9838, 23.7275)).await;
    assert_eq!(name, "37.9838, 23.7275");
}

#[tokio::test]
async fn reverse_missing_name_falls_back_to_numeric_label() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let name = client.reverse(&Coordinate::new(-12.05, -77.0428)).await;
    assert_eq!(name, "-12.0500, -77.0428");
}
