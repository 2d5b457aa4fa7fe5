use std::time::Duration;

use futures_util::StreamExt;
use loupe::DEFAULT_HISTORY_LIMIT;
use loupe::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SSE_BODY: &str = concat!(
    "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
    ": keep-alive\n\n",
    "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n",
    "data: [DONE]\n\n",
);

fn gateway_for(server: &MockServer) -> Gateway {
    let config = GatewayConfig::new("sk-test")
        .with_base_url(format!("{}/v1", server.uri()))
        .with_model("test-model")
        .with_retry(RetryPolicy::default().with_delay(Duration::ZERO))
        .with_degraded_word_delay(Duration::ZERO);

    build_gateway(config).expect("gateway should build")
}

#[tokio::test]
async fn streaming_round_trip_produces_wire_frames_and_history() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({"model": "test-model", "stream": true})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(SSE_BODY),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let frames: Vec<String> = gateway
        .chat
        .stream_chat(chat_request("hi").with_timestamp("t-client"))
        .expect("stream should start")
        .map(|event| event.to_sse_frame())
        .collect()
        .await;

    assert_eq!(frames.len(), 5);
    assert_eq!(
        frames[2],
        "data: {\"type\":\"content\",\"content\":\"Hel\"}\n\n"
    );
    assert_eq!(
        frames[3],
        "data: {\"type\":\"content\",\"content\":\"lo\"}\n\n"
    );
    assert!(frames[4].starts_with("data: {\"type\":\"done\""));

    let page = gateway.chat.history(DEFAULT_HISTORY_LIMIT);
    assert_eq!(page.total, 2);
    let body = serde_json::to_value(&page).expect("history serializes");
    assert_eq!(body["messages"][0]["id"], 1);
    assert_eq!(body["messages"][0]["type"], "user");
    assert_eq!(body["messages"][0]["timestamp"], "t-client");
    assert_eq!(body["messages"][0]["hasScreenshot"], false);
    assert_eq!(body["messages"][1]["id"], 0);
    assert_eq!(body["messages"][1]["type"], "bot");
    assert_eq!(body["messages"][1]["content"], "Hello");
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn blocking_auth_failure_degrades_after_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": {"message": "bad key"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let reply = gateway
        .chat
        .send_chat(chat_request("hi"))
        .await
        .expect("degraded replies are still replies");

    assert!(reply.reply.contains("authentication"));
    assert_eq!(reply.status, "success");
    assert_eq!(gateway.log.len(), 2);
}

#[tokio::test]
async fn blocking_overload_is_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "X"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let reply = gateway
        .chat
        .send_chat(screenshot_request("what is this?", vec![0x89, 0x50], "image/png"))
        .await
        .expect("chat should succeed");

    assert_eq!(reply.reply, "X");
    let turns = gateway.log.recent(2);
    assert!(turns[0].has_attachment);
}
