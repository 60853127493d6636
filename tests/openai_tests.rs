// OpenAI-compatible endpoint tests
// Author: kelexine (https://github.com/kelexine)

use gemkit::config::ApiConfig;
use gemkit::openai::{
    ChatCompletionsRequest, CompletionMessage, GenerateEmbeddingsRequest, OpenAiModel,
};
use gemkit::GemkitError;
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

fn model(server: &ServerGuard) -> OpenAiModel {
    let config = ApiConfig {
        endpoint: server.url(),
        ..Default::default()
    };
    OpenAiModel::new(&config, "test-key").unwrap()
}

#[tokio::test]
async fn test_completions() {
    let mut server = Server::new_async().await;
    let model = model(&server);

    let mock = server
        .mock("POST", "/v1beta/openai/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(json!({
            "model": "gemini-1.5-flash",
            "messages": [{ "role": "user", "content": "Explain caching" }]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "created": 1717236000,
                "model": "gemini-1.5-flash",
                "choices": [{
                    "index": 0,
                    "message": { "role": "assistant", "content": "It stores things." },
                    "finish_reason": "stop"
                }],
                "usage": { "prompt_tokens": 3, "completion_tokens": 4, "total_tokens": 7 }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let request = ChatCompletionsRequest::new(
        "gemini-1.5-flash",
        vec![CompletionMessage::new("user", "Explain caching")],
    );
    let response = model.completions(&request).await.unwrap();
    mock.assert_async().await;

    assert_eq!(response.choices.len(), 1);
    assert_eq!(
        response.choices[0].message.content.as_deref(),
        Some("It stores things.")
    );
    assert_eq!(response.usage.unwrap().total_tokens, 7);
}

#[tokio::test]
async fn test_embeddings_batch() {
    let mut server = Server::new_async().await;
    let model = model(&server);

    let mock = server
        .mock("POST", "/v1beta/openai/embeddings")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(json!({ "input": ["a", "b"] })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "object": "list",
                "data": [
                    { "object": "embedding", "embedding": [0.1, 0.2], "index": 0 },
                    { "object": "embedding", "embedding": [0.3, 0.4], "index": 1 }
                ],
                "model": "text-embedding-004"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let request = GenerateEmbeddingsRequest::new(
        "text-embedding-004",
        vec!["a".to_string(), "b".to_string()],
    );
    let response = model.embeddings(&request).await.unwrap();
    mock.assert_async().await;

    assert_eq!(response.data.len(), 2);
    assert_eq!(response.data[1].index, 1);
    assert_eq!(response.data[1].embedding, vec![0.3, 0.4]);
}

#[tokio::test]
async fn test_missing_fields_rejected_locally() {
    let mut server = Server::new_async().await;
    let model = model(&server);
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = model
        .completions(&ChatCompletionsRequest::new("gemini-1.5-flash", vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, GemkitError::InvalidArgument(_)));

    let err = model
        .embeddings(&GenerateEmbeddingsRequest::new("", "hello"))
        .await
        .unwrap_err();
    assert!(matches!(err, GemkitError::InvalidArgument(_)));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_status_propagates() {
    let mut server = Server::new_async().await;
    let model = model(&server);
    let _mock = server
        .mock("POST", "/v1beta/openai/embeddings")
        .with_status(401)
        .with_body("API key not valid")
        .create_async()
        .await;

    let err = model
        .embeddings(&GenerateEmbeddingsRequest::new("text-embedding-004", "hello"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));
}
