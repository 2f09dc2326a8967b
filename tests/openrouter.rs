//! End-to-end tests of the reply fetcher against a mock OpenRouter server.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use streak::chat::{ChatConfig, ChatSession, Renderer};
use streak::fetcher::{NETWORK_FALLBACK, UNEXPECTED_FALLBACK};
use streak::{
    Conversation, KnownModel, Message, OpenRouter, Outcome, ReplyFetcher, RequestConfig,
    RetryPolicy,
};

fn config(credential: Option<&str>) -> RequestConfig {
    RequestConfig::new(
        credential.map(str::to_string),
        KnownModel::DeepSeekR1ZeroFree,
        0.5,
        2,
    )
    .expect("valid config")
}

fn client(server: &MockServer) -> OpenRouter {
    OpenRouter::with_options(Some(&format!("{}/api/v1", server.uri())), None)
        .expect("client builds")
}

fn completion(content: &str) -> Value {
    json!({
        "id": "gen-123",
        "model": "deepseek/deepseek-r1-zero:free",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn success_sends_headers_and_history() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-or-test"))
        .and(header("content-type", "application/json"))
        .and(header("http-referer", "https://fitness-tracker.streamlit.app"))
        .and(header("x-title", "Streak Fitness Tracker"))
        .and(body_partial_json(json!({
            "model": "deepseek/deepseek-r1-zero:free",
            "temperature": 0.5
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "- Warm up first\n- Then 3 sets of squats",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = ReplyFetcher::new(client(&server));
    let mut conversation = Conversation::new();
    conversation.append(Message::user("How do I start squatting?"));

    let reply = fetcher
        .fetch_reply(conversation.snapshot(), &config(Some("sk-or-test")))
        .await;

    assert_eq!(reply.outcome(), &Outcome::Success);
    assert_eq!(reply.text(), "- Warm up first - Then 3 sets of squats");

    let requests = server.received_requests().await.expect("recording enabled");
    let body: Value = serde_json::from_slice(&requests[0].body).expect("json body");
    let messages = body["messages"].as_array().expect("messages array");
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0]["role"], "system");
    assert!(
        messages[0]["content"]
            .as_str()
            .expect("system text")
            .contains("Current date:")
    );
    assert_eq!(messages[1]["role"], "assistant");
    assert_eq!(messages[2], json!({"role": "user", "content": "How do I start squatting?"}));
}

#[tokio::test]
async fn missing_credential_never_reaches_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = ReplyFetcher::new(client(&server));
    let reply = fetcher
        .fetch_reply(Conversation::new().snapshot(), &config(None))
        .await;

    assert_eq!(reply.outcome(), &Outcome::MissingCredential);
    assert!(reply.to_message().is_none());
}

#[tokio::test]
async fn server_error_is_a_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "message": "upstream exploded", "code": 500 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = ReplyFetcher::new(client(&server));
    let reply = fetcher
        .fetch_reply(Conversation::new().snapshot(), &config(Some("sk-or-test")))
        .await;

    match reply.outcome() {
        Outcome::NetworkError { message } => assert!(message.contains("upstream exploded")),
        other => panic!("expected a network error, got {other:?}"),
    }
    assert_eq!(reply.text(), NETWORK_FALLBACK);
}

#[tokio::test]
async fn unauthorized_is_a_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string(""))
        .mount(&server)
        .await;

    let fetcher = ReplyFetcher::new(client(&server));
    let reply = fetcher
        .fetch_reply(Conversation::new().snapshot(), &config(Some("sk-or-bad")))
        .await;

    match reply.outcome() {
        Outcome::NetworkError { message } => assert!(message.contains("401")),
        other => panic!("expected a network error, got {other:?}"),
    }
}

#[tokio::test]
async fn body_without_choices_is_unexpected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let fetcher = ReplyFetcher::new(client(&server));
    let reply = fetcher
        .fetch_reply(Conversation::new().snapshot(), &config(Some("sk-or-test")))
        .await;

    assert!(matches!(reply.outcome(), Outcome::UnexpectedError { .. }));
    assert_eq!(reply.text(), UNEXPECTED_FALLBACK);
}

#[tokio::test]
async fn empty_choices_is_unexpected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let fetcher = ReplyFetcher::new(client(&server));
    let reply = fetcher
        .fetch_reply(Conversation::new().snapshot(), &config(Some("sk-or-test")))
        .await;

    assert!(matches!(reply.outcome(), Outcome::UnexpectedError { .. }));
}

#[tokio::test]
async fn slow_server_times_out_as_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("too late"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = OpenRouter::with_options(
        Some(&format!("{}/api/v1", server.uri())),
        Some(Duration::from_millis(200)),
    )
    .expect("client builds");
    let fetcher = ReplyFetcher::new(client);
    let reply = fetcher
        .fetch_reply(Conversation::new().snapshot(), &config(Some("sk-or-test")))
        .await;

    assert!(matches!(reply.outcome(), Outcome::NetworkError { .. }));
    assert_eq!(reply.text(), NETWORK_FALLBACK);
}

#[tokio::test]
async fn refused_connection_is_a_network_error() {
    let client = OpenRouter::with_options(Some("http://127.0.0.1:1/api/v1"), None)
        .expect("client builds");
    let fetcher = ReplyFetcher::new(client);
    let reply = fetcher
        .fetch_reply(Conversation::new().snapshot(), &config(Some("sk-or-test")))
        .await;

    assert!(matches!(reply.outcome(), Outcome::NetworkError { .. }));
}

#[tokio::test]
async fn retry_transient_resends_after_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Rest up today")))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = ReplyFetcher::new(client(&server))
        .with_retry_policy(RetryPolicy::RetryTransient)
        .with_retry_backoff(Duration::ZERO);
    let reply = fetcher
        .fetch_reply(Conversation::new().snapshot(), &config(Some("sk-or-test")))
        .await;

    assert_eq!(reply.outcome(), &Outcome::Success);
    assert_eq!(reply.text(), "Rest up today");
}

/// Discards everything it is asked to show.
struct QuietRenderer;

impl Renderer for QuietRenderer {
    fn print_message(&mut self, _: &Message) {}
    fn start_reply(&mut self) {}
    fn print_chunk(&mut self, _: &str, _: bool) {}
    fn finish_reply(&mut self) {}
    fn print_error(&mut self, _: &str) {}
    fn print_info(&mut self, _: &str) {}
    fn print_interrupted(&mut self) {}
}

#[tokio::test]
async fn session_turns_grow_the_conversation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Nice work!")))
        .expect(2)
        .mount(&server)
        .await;

    let config = ChatConfig::new()
        .with_credential(Some("sk-or-test".to_string()))
        .with_base_url(Some(format!("{}/api/v1", server.uri())))
        .with_chunk_delay(Duration::ZERO);
    let mut session = ChatSession::new(config).expect("session builds");
    let interrupted = Arc::new(AtomicBool::new(false));

    for input in ["Ran 5k today", "What next?"] {
        let outcome = session
            .submit(input, &mut QuietRenderer, interrupted.clone())
            .await;
        assert_eq!(outcome, Outcome::Success);
    }

    assert_eq!(session.message_count(), 5);
    assert_eq!(
        session.conversation().last(),
        Some(&Message::assistant("Nice work!"))
    );

    let requests = server.received_requests().await.expect("recording enabled");
    let second: Value = serde_json::from_slice(&requests[1].body).expect("json body");
    // system + greeting + user + assistant + user
    assert_eq!(second["messages"].as_array().map(Vec::len), Some(5));
}
