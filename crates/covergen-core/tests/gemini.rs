use covergen_core::{GeminiClient, GenerationError};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClient::new(&format!("{}{}", server.uri(), GENERATE_PATH), "test-key")
}

#[tokio::test]
async fn generate_posts_prompt_with_key_and_returns_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(query_param("key", "test-key"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "contents": [{ "parts": [{ "text": "Write me a letter" }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "Dear Hiring Manager..." }] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = client_for(&server)
        .generate("Write me a letter")
        .await
        .expect("generate ok");
    assert_eq!(text, "Dear Hiring Manager...");
}

#[tokio::test]
async fn generate_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
        .mount(&server)
        .await;

    let err = client_for(&server).generate("prompt").await.unwrap_err();
    match err {
        GenerationError::Status { status, body } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "backend exploded");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn generate_rejects_missing_candidate_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [],
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).generate("prompt").await.unwrap_err();
    assert!(matches!(err, GenerationError::MalformedResponse(_)));
}

#[tokio::test]
async fn generate_rejects_non_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).generate("prompt").await.unwrap_err();
    assert!(matches!(err, GenerationError::MalformedResponse(_)));
}

#[tokio::test]
async fn generate_reports_connection_failure() {
    // Nothing listens on the discard port
    let err = GeminiClient::new("http://127.0.0.1:9/generate", "test-key")
        .generate("prompt")
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Transport(_)));
}

#[tokio::test]
async fn transport_error_does_not_carry_api_key() {
    let err = GeminiClient::new("http://127.0.0.1:9/generate", "SECRET-KEY-123")
        .generate("prompt")
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Transport(_)));
    assert!(!err.to_string().contains("SECRET-KEY-123"), "{}", err);
    assert!(!format!("{:?}", err).contains("SECRET-KEY-123"));
}
