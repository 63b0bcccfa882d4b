use ledgerbus_api::config::{ApiConfig, DeliveryMode};
use reqwest::StatusCode;
use serde_json::{Value, json};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(delivery: DeliveryMode) -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let config = ApiConfig::default().with_delivery(delivery);
        let app = ledgerbus_api::app::build_app(&config)
            .await
            .expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn post_feedback(
    client: &reqwest::Client,
    base_url: &str,
    contents: &str,
    trace_id: Option<&str>,
) -> reqwest::Response {
    let mut req = client
        .post(format!("{}/", base_url))
        .json(&json!({ "contents": contents }));
    if let Some(trace_id) = trace_id {
        req = req.header("x-trace-id", trace_id);
    }
    req.send().await.unwrap()
}

async fn read_stream(client: &reqwest::Client, base_url: &str, path_and_query: &str) -> Value {
    let res = client
        .get(format!("{}/streams/{}", base_url, path_and_query))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    res.json().await.unwrap()
}

async fn applied_eventually(client: &reqwest::Client, base_url: &str, expected: u64) -> Value {
    // Async delivery completes after the response; poll briefly.
    for _ in 0..100 {
        let summary: Value = client
            .get(format!("{}/feedback", base_url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        if summary["applied"] == json!(expected) {
            return summary;
        }

        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    panic!("feedback service did not apply {expected} events within timeout");
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn(DeliveryMode::Sync).await;

    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn feedback_is_created_and_stored_on_both_streams() {
    let srv = TestServer::spawn(DeliveryMode::Sync).await;
    let client = reqwest::Client::new();

    let res = post_feedback(&client, &srv.base_url, "loved it", Some("t-1")).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.headers()["x-trace-id"], "t-1");

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "created");
    assert_eq!(body["data"], json!({ "contents": "loved it" }));
    assert_eq!(body["receipt"]["globalSequenceID"], 1);

    let page = read_stream(&client, &srv.base_url, "PublishedFeedback").await;
    let events = page["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);

    let event = &events[0];
    assert_eq!(event["type"], "SentFeedback");
    assert_eq!(event["sequenceID"], 1);
    assert_eq!(event["metadata"]["traceID"], "t-1");
    assert_eq!(event["metadata"]["originStreamName"], "PublishedFeedback");
    assert_eq!(event["transactionID"], body["receipt"]["transactionID"]);

    let contents: Value = serde_json::from_str(event["body"].as_str().unwrap()).unwrap();
    assert_eq!(contents["contents"], "loved it");

    let event_id = event["eventID"].as_str().unwrap();
    let sub_stream = read_stream(
        &client,
        &srv.base_url,
        &format!("PublishedFeedback-{event_id}"),
    )
    .await;
    assert_eq!(sub_stream["events"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn missing_trace_header_falls_back_to_transaction_id() {
    let srv = TestServer::spawn(DeliveryMode::Sync).await;
    let client = reqwest::Client::new();

    let res = post_feedback(&client, &srv.base_url, "no trace", None).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert!(res.headers().get("x-trace-id").is_none());

    let page = read_stream(&client, &srv.base_url, "PublishedFeedback").await;
    let event = &page["events"][0];
    assert_eq!(event["metadata"]["traceID"], event["transactionID"]);
}

#[tokio::test]
async fn stream_reads_honour_position_and_limit() {
    let srv = TestServer::spawn(DeliveryMode::Sync).await;
    let client = reqwest::Client::new();

    for contents in ["one", "two", "three"] {
        let res = post_feedback(&client, &srv.base_url, contents, None).await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let page = read_stream(&client, &srv.base_url, "PublishedFeedback?position=1&limit=1").await;
    let events = page["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["sequenceID"], 2);
    assert_eq!(page["position"], 1);

    let page = read_stream(&client, &srv.base_url, "PublishedFeedback?limit=-1").await;
    assert_eq!(page["events"].as_array().unwrap().len(), 3);

    let page = read_stream(&client, &srv.base_url, "PublishedFeedback?limit=2").await;
    assert_eq!(page["events"].as_array().unwrap().len(), 2);

    let page = read_stream(&client, &srv.base_url, "PublishedFeedback?position=3&limit=1").await;
    assert!(page["events"].as_array().unwrap().is_empty());

    let page = read_stream(&client, &srv.base_url, "nonexistent?limit=5").await;
    assert_eq!(page["stream"], "nonexistent");
    assert!(page["events"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn sync_delivery_applies_before_response() {
    let srv = TestServer::spawn(DeliveryMode::Sync).await;
    let client = reqwest::Client::new();

    post_feedback(&client, &srv.base_url, "inline", None).await;

    let summary: Value = client
        .get(format!("{}/feedback", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(summary["applied"], 1);
    assert_eq!(summary["last"]["contents"], "inline");
}

#[tokio::test]
async fn async_delivery_applies_eventually() {
    let srv = TestServer::spawn(DeliveryMode::Async).await;
    let client = reqwest::Client::new();

    for contents in ["first", "second"] {
        let res = post_feedback(&client, &srv.base_url, contents, Some("async-trace")).await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let summary = applied_eventually(&client, &srv.base_url, 2).await;
    assert_eq!(summary["stream"], "PublishedFeedback");
    assert_eq!(summary["last"]["contents"], "second");

    let page = read_stream(&client, &srv.base_url, "PublishedFeedback").await;
    assert_eq!(page["events"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn malformed_feedback_is_rejected() {
    let srv = TestServer::spawn(DeliveryMode::Sync).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/", srv.base_url))
        .json(&json!({ "text": "wrong field" }))
        .send()
        .await
        .unwrap();
    assert!(res.status().is_client_error());

    let page = read_stream(&client, &srv.base_url, "PublishedFeedback").await;
    assert!(page["events"].as_array().unwrap().is_empty());
}
