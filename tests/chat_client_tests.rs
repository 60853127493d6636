// Chat adapter tests: mapping, streaming and cancellation
// Author: kelexine (https://github.com/kelexine)

use futures::StreamExt;
use gemkit::config::{ApiConfig, Credentials};
use gemkit::gemini::GeminiClient;
use gemkit::{ChatClient, ChatFinishReason, ChatMessage, ChatOptions, ChatRole, GeminiChatClient};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use tokio_util::sync::CancellationToken;

const GENERATE_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";
const STREAM_PATH: &str = "/v1beta/models/gemini-1.5-flash:streamGenerateContent";

fn chat_client(server: &ServerGuard) -> GeminiChatClient {
    let config = ApiConfig {
        endpoint: server.url(),
        ..Default::default()
    };
    let client = GeminiClient::new(&config, Credentials::api_key("test-key")).unwrap();
    GeminiChatClient::with_client(client, "gemini-1.5-flash")
}

fn sse_body(texts: &[&str]) -> String {
    texts
        .iter()
        .map(|text| {
            let chunk = json!({
                "candidates": [{
                    "content": { "role": "model", "parts": [{ "text": text }] },
                    "index": 0
                }],
                "responseId": "stream-1"
            });
            format!("data: {}\r\n\r\n", chunk)
        })
        .collect()
}

#[tokio::test]
async fn test_complete_preserves_message_and_candidate_order() {
    let mut server = Server::new_async().await;
    let client = chat_client(&server);

    let mock = server
        .mock("POST", GENERATE_PATH)
        .match_body(Matcher::PartialJson(json!({
            "systemInstruction": { "parts": [{ "text": "You are terse." }] },
            "contents": [
                { "role": "user", "parts": [{ "text": "first" }] },
                { "role": "model", "parts": [{ "text": "second" }] },
                { "role": "user", "parts": [{ "text": "third" }] }
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "candidates": [
                    { "content": { "role": "model", "parts": [{ "text": "A" }] }, "finishReason": "STOP", "index": 0 },
                    { "content": { "role": "model", "parts": [{ "text": "B" }] }, "finishReason": "STOP", "index": 1 }
                ],
                "usageMetadata": { "promptTokenCount": 9, "candidatesTokenCount": 2, "totalTokenCount": 11 },
                "responseId": "resp-42"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let messages = vec![
        ChatMessage::system("You are terse."),
        ChatMessage::user("first"),
        ChatMessage::assistant("second"),
        ChatMessage::user("third"),
    ];
    let completion = client.complete(&messages, None).await.unwrap();
    mock.assert_async().await;

    let texts: Vec<_> = completion.choices.iter().map(|m| m.text_content()).collect();
    assert_eq!(texts, vec!["A", "B"]);
    assert!(completion.choices.iter().all(|m| m.role == ChatRole::Assistant));
    assert_eq!(completion.completion_id.as_deref(), Some("resp-42"));
    assert_eq!(completion.model_id.as_deref(), Some("gemini-1.5-flash"));
    assert_eq!(completion.finish_reason, Some(ChatFinishReason::Stop));
    assert_eq!(completion.usage.unwrap().input_token_count, Some(9));
}

#[tokio::test]
async fn test_options_select_model_and_generation_config() {
    let mut server = Server::new_async().await;
    let client = chat_client(&server);

    let mock = server
        .mock("POST", "/v1beta/models/gemini-1.5-pro:generateContent")
        .match_body(Matcher::PartialJson(json!({
            "generationConfig": { "maxOutputTokens": 64, "stopSequences": ["END"] },
            "cachedContent": "cachedContents/abc123"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"candidates":[]}"#)
        .create_async()
        .await;

    let mut options = ChatOptions {
        model_id: Some("gemini-1.5-pro".to_string()),
        max_output_tokens: Some(64),
        stop_sequences: Some(vec!["END".to_string()]),
        ..Default::default()
    };
    options
        .additional_properties
        .insert("cachedContent".to_string(), json!("abc123"));
    options
        .additional_properties
        .insert("unknownOption".to_string(), json!({ "ignored": true }));

    let completion = client
        .complete(&[ChatMessage::user("hi")], Some(&options))
        .await
        .unwrap();
    mock.assert_async().await;
    assert!(completion.choices.is_empty());
}

#[tokio::test]
async fn test_streaming_is_one_update_per_chunk() {
    let mut server = Server::new_async().await;
    let client = chat_client(&server);

    let chunks = ["The", " quick", " brown", " fox"];
    let mock = server
        .mock("POST", STREAM_PATH)
        .match_query(Matcher::UrlEncoded("alt".into(), "sse".into()))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(sse_body(&chunks))
        .create_async()
        .await;

    let stream = client
        .complete_streaming(&[ChatMessage::user("go")], None, CancellationToken::new())
        .await
        .unwrap();
    let updates: Vec<_> = stream.collect().await;
    mock.assert_async().await;

    assert_eq!(updates.len(), chunks.len());
    let texts: Vec<String> = updates.into_iter().map(|u| u.unwrap().text()).collect();
    assert_eq!(texts, chunks);
}

#[tokio::test]
async fn test_cancel_after_k_updates_stops_delivery() {
    let mut server = Server::new_async().await;
    let client = chat_client(&server);

    let chunks = ["1", "2", "3", "4", "5", "6"];
    let _mock = server
        .mock("POST", STREAM_PATH)
        .match_query(Matcher::UrlEncoded("alt".into(), "sse".into()))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(sse_body(&chunks))
        .create_async()
        .await;

    let cancel = CancellationToken::new();
    let mut stream = client
        .complete_streaming(&[ChatMessage::user("count")], None, cancel.clone())
        .await
        .unwrap();

    let k = 2;
    let mut received = Vec::new();
    while let Some(update) = stream.next().await {
        received.push(update.unwrap().text());
        if received.len() == k {
            cancel.cancel();
        }
    }

    assert_eq!(received, vec!["1", "2"]);
}

#[tokio::test]
async fn test_stream_http_error_fails_before_first_update() {
    let mut server = Server::new_async().await;
    let client = chat_client(&server);

    let _mock = server
        .mock("POST", STREAM_PATH)
        .match_query(Matcher::Any)
        .with_status(429)
        .with_body("Resource has been exhausted")
        .create_async()
        .await;

    let result = client
        .complete_streaming(&[ChatMessage::user("go")], None, CancellationToken::new())
        .await;
    match result {
        Err(err) => assert_eq!(err.status(), Some(429)),
        Ok(_) => panic!("expected request failure"),
    }
}
