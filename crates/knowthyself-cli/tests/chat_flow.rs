//! Full chat round trip: mocked LangGraph backend, real gateway, real client.

use assert_cmd::cargo::cargo_bin_cmd;
use knowthyself_core::chat::{ChatClient, ChatSession};
use knowthyself_core::langgraph::{LangGraphClient, LangGraphConfig};
use knowthyself_core::types::Sender;
use knowthyself_gateway::{AppState, router};
use predicates::prelude::*;
use serde_json::json;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_backend(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/assistants/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"assistant_id": "asst_1", "name": "knowthyself"}
        ])))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/threads"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"thread_id": "t-new"})),
        )
        .mount(server)
        .await;

    let sse_body = concat!(
        "event: metadata\ndata: {\"run_id\":\"r1\"}\n\n",
        "event: values\ndata: {\"messages\":[",
        "{\"type\":\"human\",\"content\":\"hello\",\"id\":\"m1\"},",
        "{\"type\":\"ai\",\"content\":\"You seem curious.\",\"id\":\"m2\"}",
        "]}\n\n",
    );
    Mock::given(method("POST"))
        .and(path("/threads/t-new/runs/stream"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse_body),
        )
        .mount(server)
        .await;
}

async fn spawn_gateway(server: &MockServer) -> String {
    let backend = LangGraphClient::new(LangGraphConfig {
        base_url: server.uri(),
        api_key: None,
    });
    let state = AppState::new(backend, None);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("http://{addr}")
}

/// Test: a full send adopts the backend thread id and replaces the
/// optimistic message list with the backend's snapshot.
#[tokio::test]
async fn test_chat_round_trip_adopts_thread_and_replaces_messages() {
    let server = MockServer::start().await;
    mount_backend(&server).await;
    let gateway = spawn_gateway(&server).await;

    let client = ChatClient::new(gateway);
    let mut session = ChatSession::new();
    client.send(&mut session, "hello").await.unwrap();

    assert_eq!(session.thread_id(), Some("t-new"));
    assert!(!session.is_loading());

    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender, Sender::User);
    assert_eq!(messages[0].content, "hello");
    assert_eq!(messages[1].sender, Sender::Assistant);
    assert_eq!(messages[1].content, "You seem curious.");
}

/// Test: the `send` command talks to a live gateway and prints the
/// assistant reply plus the adopted thread id.
#[test]
fn test_send_command_prints_reply() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (server, gateway) = rt.block_on(async {
        let server = MockServer::start().await;
        mount_backend(&server).await;
        let gateway = spawn_gateway(&server).await;
        (server, gateway)
    });

    let dir = tempdir().unwrap();
    cargo_bin_cmd!("knowthyself")
        .env("KNOWTHYSELF_HOME", dir.path())
        .env("KNOWTHYSELF_GATEWAY_URL", &gateway)
        .args(["send", "hello", "--show-thread"])
        .assert()
        .success()
        .stdout(predicate::str::contains("You seem curious."))
        .stdout(predicate::str::contains("thread: t-new"));

    drop(server);
    drop(rt);
}
