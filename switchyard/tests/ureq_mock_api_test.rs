//! ureq client against a mock server. The agent runs on the blocking pool, so
//! these tests use the multi-threaded runtime.

use serde_json::json;
use switchyard::prelude::*;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> UreqClient {
    UreqClient::with_config(&HttpConfig::default())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_ureq_interceptor_rewrites_url_and_keeps_builder() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/test/A/B"))
        .and(query_param("page", "2"))
        .and(header("x-test", "true"))
        .and(body_json(json!({"name": "x"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client();
    client.register_request_interceptors([
        map_request(|url: String, request: AgentRequest| {
            Ok(Intercepted::new(format!("{url}/A"), request.set("X-Test", "true")))
        }),
        map_request(|url: String, request: AgentRequest| {
            Ok(Intercepted::new(format!("{url}/B"), request))
        }),
    ]);

    let options = AgentOptions::new().query("page", 2);
    let response = client
        .post(
            &format!("{}/test", mock_server.uri()),
            &json!({"name": "x"}),
            Some(options),
            None,
        )
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.body(), &json!({"ok": true}));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_ureq_form_fields_are_url_encoded() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/form"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("name=x"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client();
    client.register_request_interceptors([map_request(|url: String, request: AgentRequest| {
        Ok(Intercepted::new(url, request.field("name", "x")))
    })]);

    let response = client
        .request("put", &format!("{}/form", mock_server.uri()), None, None, None)
        .await
        .unwrap();
    assert_eq!(response.status(), 204);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_ureq_failed_response_is_intercepted() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "missing"})))
        .mount(&mock_server)
        .await;

    let client = client();
    client.register_response_interceptors([map_response(|mut response: AgentResponse| {
        response.set_header("X-Intercepted", "yes");
        Ok(response)
    })]);

    let err = client
        .get(&format!("{}/missing", mock_server.uri()), None, None)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    let embedded = err.response().unwrap();
    assert_eq!(embedded.header("x-intercepted"), Some("yes"));
    assert_eq!(embedded.body(), &json!({"error": "missing"}));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_ureq_connection_refused_has_no_response() {
    let err = client()
        .get("http://127.0.0.1:1/unreachable", None, None)
        .await
        .unwrap_err();
    assert!(!err.has_response());
    assert!(matches!(err.kind(), HttpError::Transport(_)));
}
