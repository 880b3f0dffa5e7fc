use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use testgen_client::prelude::*;
use testgen_client::{CONNECTION_LOST_LINE, StreamPhase};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sse(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/event-stream")
        .set_body_raw(body.to_string(), "text/event-stream")
}

async fn generator_for(server: &MockServer) -> TestGenerator {
    let backend = HttpBackend::new(ClientConfig::new(server.uri())).expect("backend");
    TestGenerator::new(Arc::new(backend))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn assisted_request_posts_code_and_returns_artifact() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-ai-tests"))
        .and(body_json(json!({"code": "def x(): return 1"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"test_code": "def test_x(): assert True"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut generator = generator_for(&server).await;
    let session = generator
        .submit(GenerationRequest::assisted("def x(): return 1"))
        .await
        .expect("submit");

    assert_eq!(session.artifact(), Some("def test_x(): assert True"));
    assert!(session.logs().is_empty());
    assert!(!session.in_progress());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn automatic_request_streams_logs_and_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-tests"))
        .and(body_json(json!({"code": "def y(): pass"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "abc123"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/generate-tests/stream/abc123"))
        .and(header("accept", "text/event-stream"))
        .respond_with(sse(concat!(
            ": keep-alive\n\n",
            "data: {\"type\": \"log\", \"line\": \"collecting...\"}\n\n",
            "data: {\"type\": \"result\", \"test_code\": \"def test_y(): pass\"}\n\n",
            "data: {\"type\": \"done\"}\n\n",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let mut generator = generator_for(&server).await;
    generator
        .submit(GenerationRequest::automatic("def y(): pass"))
        .await
        .expect("submit");
    let session = generator.run_to_end().await.expect("session");

    assert_eq!(session.logs(), &["collecting...".to_string()]);
    assert_eq!(session.artifact(), Some("def test_y(): pass"));
    assert!(!session.in_progress());
    assert_eq!(session.phase(), StreamPhase::Closed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn error_events_and_garbage_are_logged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-tests"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "t-1"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/generate-tests/stream/t-1"))
        .respond_with(sse(concat!(
            "data: not json\n\n",
            "data: {\"type\": \"error\", \"message\": \"Test file not generated\"}\n\n",
            "data: {\"type\": \"done\"}\n\n",
        )))
        .mount(&server)
        .await;

    let mut generator = generator_for(&server).await;
    generator
        .submit(GenerationRequest::automatic("x = 1"))
        .await
        .expect("submit");
    let session = generator.run_to_end().await.expect("session");

    assert_eq!(
        session.logs(),
        &[
            "not json".to_string(),
            "ERROR: Test file not generated".to_string()
        ]
    );
    assert_eq!(session.artifact(), None);
    assert!(!session.in_progress());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stream_ending_without_done_reports_lost_connection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-tests"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "t-2"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/generate-tests/stream/t-2"))
        .respond_with(sse("data: {\"type\": \"log\", \"line\": \"started\"}\n\n"))
        .mount(&server)
        .await;

    let mut generator = generator_for(&server).await;
    generator
        .submit(GenerationRequest::automatic("x = 1"))
        .await
        .expect("submit");
    let session = generator.run_to_end().await.expect("session");

    assert_eq!(
        session.logs(),
        &["started".to_string(), CONNECTION_LOST_LINE.to_string()]
    );
    assert!(!session.in_progress());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unknown_task_stream_closes_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-tests"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "gone"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/generate-tests/stream/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Unknown task id"})))
        .mount(&server)
        .await;

    let mut generator = generator_for(&server).await;
    let session = generator
        .submit(GenerationRequest::automatic("x = 1"))
        .await
        .expect("launch itself succeeds");

    assert_eq!(session.logs(), &[CONNECTION_LOST_LINE.to_string()]);
    assert!(!session.in_progress());
    assert!(!generator.is_streaming());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn launch_error_body_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-tests"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "No code provided"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut generator = generator_for(&server).await;
    let err = generator
        .submit(GenerationRequest::automatic(""))
        .await
        .expect_err("launch fails");

    assert_eq!(err.status_code(), Some(400));
    assert!(err.message().contains("No code provided"));
    let session = generator.session().expect("session");
    assert!(!session.in_progress());
    assert!(session.logs().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn malformed_launch_response_is_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-ai-tests"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .mount(&server)
        .await;

    let mut generator = generator_for(&server).await;
    let err = generator
        .submit(GenerationRequest::assisted("x"))
        .await
        .expect_err("bad body");
    assert!(matches!(err, ClientError::Protocol { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unreachable_service_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let backend = HttpBackend::new(ClientConfig::new(format!("http://{addr}"))).expect("backend");
    let mut generator = TestGenerator::new(Arc::new(backend));
    let err = generator
        .submit(GenerationRequest::assisted("x"))
        .await
        .expect_err("nothing listening");
    assert!(matches!(err, ClientError::Transport { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slow_assisted_response_is_awaited_by_default() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-ai-tests"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"test_code": "def test_slow(): pass"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let config = ClientConfig::new(server.uri());
    assert_eq!(config.request_timeout, None);
    let mut generator = TestGenerator::new(Arc::new(HttpBackend::new(config).expect("backend")));
    let session = generator
        .submit(GenerationRequest::assisted("def slow(): pass"))
        .await
        .expect("slow response still arrives");
    assert_eq!(session.artifact(), Some("def test_slow(): pass"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn explicit_request_timeout_fails_slow_launch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-tests"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"task_id": "late"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let config = ClientConfig::new(server.uri()).request_timeout(Duration::from_millis(200));
    let mut generator = TestGenerator::new(Arc::new(HttpBackend::new(config).expect("backend")));
    let err = generator
        .submit(GenerationRequest::automatic("x"))
        .await
        .expect_err("timed out");
    assert!(matches!(err, ClientError::Transport { .. }));
    assert!(!generator.session().expect("session").in_progress());
}
