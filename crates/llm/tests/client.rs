//! Request shape and error classification for [`LlmClient`] against a mock
//! completion endpoint.

use assert_matches::assert_matches;
use buildwise_llm::{CompletionProvider, LlmClient, LlmConfig, LlmError};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> LlmClient {
    LlmClient::new(LlmConfig {
        api_key: "test-key".into(),
        api_url: format!("{}/v1/chat/completions", server.uri()),
        timeout_secs: 5,
        ..LlmConfig::default()
    })
    .expect("client builds")
}

#[tokio::test]
async fn complete_sends_chat_request_and_returns_first_choice() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .and(header("Accept", "application/json"))
        .and(body_partial_json(serde_json::json!({
            "model": "deepseek-chat",
            "max_tokens": 1234,
            "temperature": 0.7,
            "top_p": 0.95,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "cmpl-1",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "Risk Score: 42" } },
                { "index": 1, "message": { "role": "assistant", "content": "ignored" } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client(&server).complete("Assess the clinic", 1234).await.unwrap();
    assert_eq!(reply, "Risk Score: 42");

    let received = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["role"], "user");
    assert_eq!(body["messages"][1]["content"], "Assess the clinic");
}

#[tokio::test]
async fn non_success_status_is_reported_with_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let err = client(&server).complete("x", 10).await.unwrap_err();
    assert_matches!(err, LlmError::Status { status: 401, ref body } if body == "invalid api key");
}

#[tokio::test]
async fn zero_choices_is_empty_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })))
        .mount(&server)
        .await;

    let err = client(&server).complete("x", 10).await.unwrap_err();
    assert_matches!(err, LlmError::EmptyResponse);
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = client(&server).complete("x", 10).await.unwrap_err();
    assert_matches!(err, LlmError::Decode(_));
}

#[tokio::test]
async fn trait_object_dispatches_to_client() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({ "max_tokens": 3000 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [ { "message": { "role": "assistant", "content": "Materials: R10 000" } } ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider: Box<dyn CompletionProvider> = Box::new(client(&server));
    let reply = buildwise_llm::prompts::analyze_blueprint(provider.as_ref(), "site.pdf", "")
        .await
        .unwrap();
    assert_eq!(reply, "Materials: R10 000");
}
