//! tower client against a mock server.

use serde_json::json;
use switchyard_core::testing::CallCounter;
use switchyard::prelude::*;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> TowerClient {
    TowerClient::with_config(&HttpConfig::default())
}

#[tokio::test]
async fn test_tower_layers_rewrite_config() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/test"))
        .and(query_param("foo", "bar"))
        .and(header("accept", "application/json"))
        .and(header("x-test", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": 1})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client();
    client.register_request_interceptors([map_config(|config: RequestConfig| {
        config.with_param("foo", "bar").with_header("x-test", "true")
    })]);
    client.register_response_interceptors([map_response(|mut response: ConfigResponse| {
        let next = response.data["value"].as_i64().unwrap_or_default() + 1;
        response.data = json!({"value": next});
        Ok(response)
    })]);

    let config = RequestConfig::new()
        .with_base_url(mock_server.uri())
        .with_header("accept", "application/json")
        .unwrap();
    let response = client.get("/test", Some(config), None).await.unwrap();

    assert_eq!(response.data, json!({"value": 2}));
    assert_eq!(response.config.url, "/test");
}

#[tokio::test]
async fn test_tower_post_sends_json_data() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/items"))
        .and(body_json(json!({"name": "x"})))
        .respond_with(ResponseTemplate::new(201).set_body_string("created"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = client()
        .post(&format!("{}/items", mock_server.uri()), &json!({"name": "x"}), None, None)
        .await
        .unwrap();

    assert_eq!(response.status, 201);
    assert_eq!(response.data, json!("created"));
}

#[tokio::test]
async fn test_tower_failed_response_skips_response_layers() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "missing"})))
        .mount(&mock_server)
        .await;

    let client = client();
    let counter = CallCounter::new();
    client.register_response_interceptors([counter.response_interceptor()]);

    let err = client
        .get(&format!("{}/missing", mock_server.uri()), None, None)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(err.response().unwrap().data, json!({"error": "missing"}));
    assert_eq!(counter.get(), 0);
}
