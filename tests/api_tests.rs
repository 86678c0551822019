use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use flyaway_recs::{
    config::Config,
    db::{InMemoryPlaceRepository, InMemoryRecommendationStore},
    models::{Place, PlaceId},
    routes::{create_router, AppState},
    services::RecommendationService,
};

const PARIS: &str = "6f1c2b9e-8a43-4d3e-9a57-0c1b2d3e4f50";

struct Harness {
    server: TestServer,
    store: Arc<InMemoryRecommendationStore>,
}

fn test_config(overpass_urls: &[String], knowledge: &MockServer) -> Config {
    envy::from_iter(vec![
        ("OVERPASS_URLS".to_string(), overpass_urls.join(",")),
        (
            "WIKIPEDIA_API_TEMPLATE".to_string(),
            format!("{}/{{lang}}/w/api.php", knowledge.uri()),
        ),
        ("WIKIDATA_API_URL".to_string(), knowledge.uri()),
        ("OVERPASS_TIMEOUT_SECS".to_string(), "2".to_string()),
        ("KNOWLEDGE_TIMEOUT_SECS".to_string(), "2".to_string()),
    ])
    .unwrap()
}

async fn harness(overpass_urls: &[String], knowledge: &MockServer) -> Harness {
    let config = test_config(overpass_urls, knowledge);

    let places = Arc::new(InMemoryPlaceRepository::new());
    places
        .insert(Place {
            id: PARIS.parse::<PlaceId>().unwrap(),
            latitude: 48.8566,
            longitude: 2.3522,
        })
        .await;
    let store = Arc::new(InMemoryRecommendationStore::new(config.cache_ttl()));

    let service = RecommendationService::from_config(
        &config,
        reqwest::Client::new(),
        places,
        store.clone(),
    )
    .unwrap();

    Harness {
        server: TestServer::new(create_router(AppState::new(service))).unwrap(),
        store,
    }
}

fn interpreter_url(server: &MockServer) -> String {
    format!("{}/api/interpreter", server.uri())
}

fn overpass_body(elements: Vec<Value>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "elements": elements }))
}

fn named_node(name: &str) -> Value {
    json!({"type": "node", "id": 1, "lat": 48.86, "lon": 2.33, "tags": {"name": name}})
}

#[tokio::test]
async fn test_health_check() {
    let knowledge = MockServer::start().await;
    let harness = harness(&["http://127.0.0.1:9/api/interpreter".to_string()], &knowledge).await;

    let response = harness.server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({"status": "healthy"}));
}

#[tokio::test]
async fn test_louvre_resolved_via_wikidata_after_failover() {
    let broken = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&broken)
        .await;

    let healthy = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/interpreter"))
        .respond_with(overpass_body(vec![json!({
            "type": "node", "id": 7, "lat": 48.8606, "lon": 2.3376,
            "tags": {"name": "Louvre", "wikidata": "Q19675", "tourism": "museum"}
        })]))
        .expect(1)
        .mount(&healthy)
        .await;

    let knowledge = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki/Special:EntityData/Q19675.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entities": {"Q19675": {"claims": {"P18": [
                {"mainsnak": {"datavalue": {"value": "Louvre Museum Wikimedia Commons.jpg"}}}
            ]}}}
        })))
        .expect(1)
        .mount(&knowledge)
        .await;

    let harness = harness(
        &[interpreter_url(&broken), interpreter_url(&healthy)],
        &knowledge,
    )
    .await;

    let response = harness
        .server
        .get(&format!("/api/v1/recommendations/{}", PARIS))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["available"], true);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    let item = &body["items"][0];
    assert_eq!(item["name"], "Louvre");
    assert_eq!(item["lat"], 48.8606);
    assert_eq!(item["wiki_url"], "https://www.wikidata.org/wiki/Q19675");
    assert_eq!(
        item["image"],
        "https://commons.wikimedia.org/wiki/Special:FilePath/Louvre_Museum_Wikimedia_Commons.jpg"
    );
}

#[tokio::test]
async fn test_default_limit_caps_results_in_source_order() {
    let overpass = MockServer::start().await;
    let elements = (1..=15).map(|i| named_node(&format!("Site {}", i))).collect();
    Mock::given(method("POST"))
        .respond_with(overpass_body(elements))
        .mount(&overpass)
        .await;
    let knowledge = MockServer::start().await;

    let harness = harness(&[interpreter_url(&overpass)], &knowledge).await;

    let body: Value = harness
        .server
        .get(&format!("/api/v1/recommendations/{}", PARIS))
        .await
        .json();

    let names: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 9);
    assert_eq!(names.first(), Some(&"Site 1"));
    assert_eq!(names.last(), Some(&"Site 9"));
}

#[tokio::test]
async fn test_all_endpoints_failing_is_unavailable_and_uncached() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    for server in [&first, &second] {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(server)
            .await;
    }
    let knowledge = MockServer::start().await;

    let harness = harness(&[interpreter_url(&first), interpreter_url(&second)], &knowledge).await;

    let response = harness
        .server
        .get(&format!("/api/v1/recommendations/{}", PARIS))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({"available": false, "items": []})
    );
    assert!(harness.store.is_empty().await);
}

#[tokio::test]
async fn test_unknown_place_makes_no_upstream_calls() {
    let overpass = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(overpass_body(vec![]))
        .expect(0)
        .mount(&overpass)
        .await;
    let knowledge = MockServer::start().await;

    let harness = harness(&[interpreter_url(&overpass)], &knowledge).await;

    let response = harness
        .server
        .get("/api/v1/recommendations/00000000-0000-4000-8000-000000000000")
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({"available": false, "items": []})
    );
}

#[tokio::test]
async fn test_malformed_place_id_is_unavailable_not_an_error() {
    let knowledge = MockServer::start().await;
    let harness = harness(&["http://127.0.0.1:9/api/interpreter".to_string()], &knowledge).await;

    let response = harness.server.get("/api/v1/recommendations/not-a-place").await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({"available": false, "items": []})
    );
}

#[tokio::test]
async fn test_limit_out_of_range_is_rejected() {
    let knowledge = MockServer::start().await;
    let harness = harness(&["http://127.0.0.1:9/api/interpreter".to_string()], &knowledge).await;
    let url = format!("/api/v1/recommendations/{}", PARIS);

    let response = harness.server.get(&url).add_query_param("limit", 0).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = harness.server.get(&url).add_query_param("limit", 51).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["error"].is_string());
}

#[tokio::test]
async fn test_repeat_request_is_served_from_cache() {
    let overpass = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(overpass_body(vec![named_node("Pont Neuf")]))
        .expect(1)
        .mount(&overpass)
        .await;
    let knowledge = MockServer::start().await;

    let harness = harness(&[interpreter_url(&overpass)], &knowledge).await;
    let url = format!("/api/v1/recommendations/{}", PARIS);

    let first: Value = harness.server.get(&url).add_query_param("limit", 3).await.json();
    let second: Value = harness.server.get(&url).add_query_param("limit", 3).await.json();

    assert_eq!(first, second);
    assert_eq!(second["items"][0]["name"], "Pont Neuf");
    assert_eq!(harness.store.len().await, 1);
}

#[tokio::test]
async fn test_empty_result_is_cached() {
    let overpass = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(overpass_body(vec![json!({"type": "way", "id": 3, "tags": {"historic": "ruins"}})]))
        .expect(1)
        .mount(&overpass)
        .await;
    let knowledge = MockServer::start().await;

    let harness = harness(&[interpreter_url(&overpass)], &knowledge).await;
    let url = format!("/api/v1/recommendations/{}", PARIS);

    for _ in 0..2 {
        let body: Value = harness.server.get(&url).await.json();
        assert_eq!(body, json!({"available": false, "items": []}));
    }
    assert_eq!(harness.store.len().await, 1);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let knowledge = MockServer::start().await;
    let harness = harness(&["http://127.0.0.1:9/api/interpreter".to_string()], &knowledge).await;

    let response = harness
        .server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("trip-1234"),
        )
        .await;

    assert_eq!(response.header("x-request-id"), "trip-1234");
}
