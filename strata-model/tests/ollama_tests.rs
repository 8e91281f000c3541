use common::Frame;
use futures::StreamExt;
use serde_json::json;
use std::time::Duration;
use strata_core::ProviderError;
use strata_model::{CompletionRequest, LlmProvider, OllamaClient};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

#[tokio::test]
async fn streams_ndjson_until_done() {
    let server = MockServer::start().await;
    let body = concat!(
        "{\"message\":{\"role\":\"assistant\",\"content\":\"Hello\"},\"done\":false}\n",
        "{\"message\":{\"role\":\"assistant\",\"content\":\" world\"},\"done\":false}\n",
        "{\"message\":{\"role\":\"assistant\",\"content\":\"\"},\"done\":true}\n",
        "{\"message\":{\"role\":\"assistant\",\"content\":\"ignored\"},\"done\":false}\n",
    );
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "model": "llama3.1",
            "stream": true,
            "options": {"num_ctx": 32768, "num_predict": 256}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"))
        .expect(1)
        .mount(&server)
        .await;

    let client = OllamaClient::new(server.uri()).unwrap();
    let request = CompletionRequest::new("sys", "hi", "llama3.1").with_max_tokens(256);
    let chunks: Vec<String> =
        client.generate_stream(request).await.unwrap().map(|c| c.unwrap()).collect().await;

    assert_eq!(chunks, vec!["Hello", " world"]);
}

#[tokio::test]
async fn in_stream_error_ends_the_stream() {
    let server = MockServer::start().await;
    let body = concat!(
        "{\"message\":{\"content\":\"partial\"},\"done\":false}\n",
        "{\"error\":\"unexpected EOF\"}\n",
    );
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"))
        .mount(&server)
        .await;

    let client = OllamaClient::new(server.uri()).unwrap();
    let items: Vec<_> = client
        .generate_stream(CompletionRequest::new("s", "p", "llama3.1"))
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_deref(), Ok("partial"));
    assert!(matches!(&items[1], Err(ProviderError::Other(msg)) if msg.contains("unexpected EOF")));
}

#[tokio::test]
async fn lists_tag_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{"name": "llama3.1:latest"}, {"name": "mistral:7b"}]
        })))
        .mount(&server)
        .await;

    let client = OllamaClient::new(server.uri()).unwrap();
    assert_eq!(client.list_models().await, vec!["llama3.1:latest", "mistral:7b"]);
    assert!(client.test_connection().await.success);
}

#[tokio::test]
async fn unreachable_daemon_reports_how_to_start_it() {
    // Nothing listens on port 9 (discard) in test environments.
    let client = OllamaClient::new("http://127.0.0.1:9").unwrap();

    let status = client.test_connection().await;
    assert!(!status.success);
    assert!(status.message.contains("ollama serve"));
    assert!(client.list_models().await.is_empty());
}

#[tokio::test]
async fn character_split_across_frames_is_reassembled() {
    let body = concat!(
        "{\"message\":{\"content\":\"Risk — high\"},\"done\":false}\n",
        "{\"message\":{\"content\":\"\"},\"done\":true}\n",
    );
    let base = common::serve_frames("application/x-ndjson", common::split_inside(body, '—')).await;
    let client = OllamaClient::new(base).unwrap();

    let chunks: Vec<String> = client
        .generate_stream(CompletionRequest::new("s", "p", "llama3.1"))
        .await
        .unwrap()
        .map(|c| c.unwrap())
        .collect()
        .await;

    assert_eq!(chunks, vec!["Risk — high"]);
}

#[tokio::test]
async fn slow_stream_outlives_the_read_timeout() {
    let gap = Duration::from_millis(150);
    let frames = vec![
        Frame::new("{\"message\":{\"content\":\"a\"},\"done\":false}\n").after(gap),
        Frame::new("{\"message\":{\"content\":\"b\"},\"done\":false}\n").after(gap),
        Frame::new("{\"message\":{\"content\":\"c\"},\"done\":false}\n").after(gap),
        Frame::new("{\"message\":{\"content\":\"\"},\"done\":true}\n").after(gap),
    ];
    let base = common::serve_frames("application/x-ndjson", frames).await;
    // Each gap fits the read timeout; the whole body does not.
    let client = OllamaClient::with_read_timeout(base, Duration::from_millis(400)).unwrap();

    let chunks: Vec<String> = client
        .generate_stream(CompletionRequest::new("s", "p", "llama3.1"))
        .await
        .unwrap()
        .map(|c| c.unwrap())
        .collect()
        .await;

    assert_eq!(chunks, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn stalled_stream_hits_the_read_timeout() {
    let frames = vec![
        Frame::new("{\"message\":{\"content\":\"a\"},\"done\":false}\n"),
        Frame::new("{\"message\":{\"content\":\"\"},\"done\":true}\n").after(Duration::from_secs(2)),
    ];
    let base = common::serve_frames("application/x-ndjson", frames).await;
    let client = OllamaClient::with_read_timeout(base, Duration::from_millis(300)).unwrap();

    let items: Vec<_> = client
        .generate_stream(CompletionRequest::new("s", "p", "llama3.1"))
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(items[0].as_deref(), Ok("a"));
    assert!(matches!(items.last(), Some(Err(ProviderError::Connection(_)))));
}
