//! 推論クライアントの統合テスト（wiremock）

use futures::StreamExt;
use serde_json::json;
use vision_ocr::client::{ChatClient, ChatOptions, ChatRequest, InferenceClient, RecordStream};
use vision_ocr::codec::{self, ImagePayload};
use vision_ocr::error::VisionOcrError;
use vision_ocr::Config;
use vision_ocr_common::{ImageMime, EXTRACTION_PROMPT};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> ChatRequest {
    let payload = ImagePayload::new(b"hello".to_vec(), ImageMime::Png);
    let image = codec::encode(&payload).expect("encode");
    ChatRequest::extraction("llama3.2-vision", image, ChatOptions::default())
}

fn client_for(server: &MockServer) -> ChatClient {
    let config = Config {
        base_url: server.uri(),
        ..Default::default()
    };
    ChatClient::from_config(&config).expect("client")
}

async fn collect_fragments(mut records: RecordStream) -> Vec<String> {
    let mut fragments = Vec::new();
    while let Some(record) = records.next().await {
        let record = record.expect("record");
        if let Some(content) = record.content() {
            fragments.push(content.to_string());
        }
    }
    fragments
}

/// 送信ボディの形
#[tokio::test]
async fn send_posts_streaming_chat_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "model": "llama3.2-vision",
            "stream": true,
            "options": { "temperature": 0.3, "max_tokens": 2048 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"done\":true}\n"))
        .expect(1)
        .mount(&server)
        .await;

    let records = client_for(&server).send(&request()).await.expect("send");
    assert!(collect_fragments(records).await.is_empty());

    let received = server.received_requests().await.expect("recording enabled");
    let body: serde_json::Value = received[0].body_json().expect("json body");
    let message = &body["messages"][0];
    assert_eq!(message["role"], "user");
    assert_eq!(message["content"], EXTRACTION_PROMPT);
    assert_eq!(message["images"], json!(["aGVsbG8="]));
}

/// NDJSONの断片を順に返す
#[tokio::test]
async fn send_yields_fragments_in_order() {
    let server = MockServer::start().await;
    let body = concat!(
        "{\"message\":{\"role\":\"assistant\",\"content\":\"# Receipt\\n\"},\"done\":false}\n",
        "{\"message\":{\"role\":\"assistant\",\"content\":\"Total: 12.00\"},\"done\":false}\n",
        "{\"message\":{\"role\":\"assistant\",\"content\":\"\"},\"done\":true}\n",
    );

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let records = client_for(&server).send(&request()).await.expect("send");
    assert_eq!(collect_fragments(records).await, vec!["# Receipt\n", "Total: 12.00"]);
}

/// 壊れた行・空行は無視
#[tokio::test]
async fn send_skips_malformed_lines() {
    let server = MockServer::start().await;
    let body = "{\"message\":{\"content\":\"A\"}}\n\r\nnot json\n{\"message\":{\"content\":\"B\"}}";

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let records = client_for(&server).send(&request()).await.expect("send");
    assert_eq!(collect_fragments(records).await, vec!["A", "B"]);
}

/// 非2xxはステータスとボディ付きのTransportエラー
#[tokio::test]
async fn send_maps_error_status_to_transport() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not found"))
        .mount(&server)
        .await;

    let result = client_for(&server).send(&request()).await;
    match result {
        Err(VisionOcrError::Transport { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "model not found");
        }
        Err(other) => panic!("Transport を期待: {}", other),
        Ok(_) => panic!("エラーを期待"),
    }
}

/// 接続できない場合はRequestエラー
#[tokio::test]
async fn send_connection_refused() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let client = ChatClient::new(format!("{}/api/chat", uri));
    let result = client.send(&request()).await;
    assert!(matches!(result, Err(VisionOcrError::Request(_))));
}
