use super::common::{UNREACHABLE, debug_settings_for, settings_for};
use mcp_bridge::bridge::ConnectionSettings;
use mcp_bridge::bridge::OutboundWorker;
use mcp_bridge::bridge::queue::payload_channel;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

async fn forward_all(settings: &ConnectionSettings, input: &[u8]) -> Vec<Vec<u8>> {
    let worker = OutboundWorker::new(settings).unwrap();
    let (tx, mut rx) = payload_channel(32);

    worker.run(input, tx, CancellationToken::new()).await;

    let mut out = Vec::new();
    while let Some(payload) = rx.recv().await {
        out.push(payload);
    }
    out
}

fn parse(payload: &[u8]) -> Value {
    serde_json::from_slice(payload).unwrap()
}

#[tokio::test]
async fn test_response_body_forwarded_verbatim() {
    let server = MockServer::start().await;
    let request = r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#;
    let reply = r#"{"jsonrpc":"2.0","id":1,"result":{"ok":true}}"#;

    Mock::given(method("POST"))
        .and(path("/mcp"))
        .and(header("content-type", "application/json"))
        .and(body_string(request))
        .respond_with(ResponseTemplate::new(200).set_body_raw(reply, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let input = format!("{}\n", request);
    let out = forward_all(&settings_for(&server.uri()), input.as_bytes()).await;

    assert_eq!(out, vec![reply.as_bytes().to_vec()]);
}

#[tokio::test]
async fn test_crlf_line_posts_without_carriage_return() {
    let server = MockServer::start().await;
    let request = r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#;

    Mock::given(method("POST"))
        .and(path("/mcp"))
        .and(body_string(request))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let input = format!("{}\r\n", request);
    let out = forward_all(&settings_for(&server.uri()), input.as_bytes()).await;
    assert_eq!(out.len(), 1);
}

#[tokio::test]
async fn test_unreachable_server_yields_internal_error() {
    let input = b"{\"jsonrpc\":\"2.0\",\"id\":3,\"method\":\"ping\"}\n";
    let out = forward_all(&settings_for(UNREACHABLE), input).await;

    assert_eq!(out.len(), 1);
    let envelope = parse(&out[0]);
    assert_eq!(envelope["jsonrpc"], "2.0");
    assert_eq!(envelope["error"]["code"], -32603);
    assert_eq!(envelope["id"], Value::Null);
    let message = envelope["error"]["message"].as_str().unwrap();
    assert!(message.starts_with("post request: "), "{}", message);
}

#[tokio::test]
async fn test_non_success_status_yields_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mcp"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let out = forward_all(&settings_for(&server.uri()), b"{\"id\":4}\n").await;

    assert_eq!(out.len(), 1);
    let envelope = parse(&out[0]);
    assert_eq!(envelope["error"]["code"], -32603);
    assert_eq!(envelope["error"]["message"], "server error: status 500: boom");
    assert_eq!(envelope["id"], Value::Null);
}

#[tokio::test]
async fn test_empty_lines_are_not_posted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let out = forward_all(&settings_for(&server.uri()), b"\n\r\n\n").await;
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_responses_follow_input_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mcp"))
        .respond_with(|req: &Request| {
            let body: Value = serde_json::from_slice(&req.body).unwrap();
            ResponseTemplate::new(200)
                .set_body_json(json!({"jsonrpc": "2.0", "id": body["id"], "result": {}}))
        })
        .expect(3)
        .mount(&server)
        .await;

    let input = b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"a\"}\n\
                  {\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"b\"}\n\
                  {\"jsonrpc\":\"2.0\",\"id\":3,\"method\":\"c\"}\n";
    let out = forward_all(&settings_for(&server.uri()), input).await;

    let ids: Vec<Value> = out.iter().map(|p| parse(p)["id"].clone()).collect();
    assert_eq!(ids, vec![json!(1), json!(2), json!(3)]);
}

#[tokio::test]
async fn test_worker_continues_after_failed_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"id":6}"#, "application/json"))
        .mount(&server)
        .await;

    let out = forward_all(&settings_for(&server.uri()), b"{\"id\":5}\n{\"id\":6}\n").await;

    assert_eq!(out.len(), 2);
    assert_eq!(parse(&out[0])["error"]["message"], "server error: status 503: busy");
    assert_eq!(out[1], br#"{"id":6}"#.to_vec());
}

#[tokio::test]
async fn test_oversized_line_stops_worker() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let mut settings = settings_for(&server.uri());
    settings.max_line_bytes = 16;
    let mut input = b"{\"id\":1}\n".to_vec();
    input.extend(std::iter::repeat_n(b'x', 64));
    input.extend(b"\n{\"id\":2}\n");

    let out = forward_all(&settings, &input).await;
    assert_eq!(out.len(), 1);
}

#[tokio::test]
async fn test_profile_header_only_in_debug_mode() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("x-profile", "dev"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    forward_all(&debug_settings_for(&server.uri(), "dev"), b"{\"id\":1}\n").await;

    let mut quiet = debug_settings_for(&server.uri(), "dev");
    quiet.debug = false;
    forward_all(&quiet, b"{\"id\":2}\n").await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].headers.get("x-profile").is_none());
}

#[tokio::test]
async fn test_cancelled_worker_returns() {
    let worker = OutboundWorker::new(&settings_for(UNREACHABLE)).unwrap();
    let (tx, _rx) = payload_channel(1);
    let cancel = CancellationToken::new();
    cancel.cancel();

    // The duplex end is never written to, so only cancellation can end the read.
    let (_keep, input) = tokio::io::duplex(64);
    let input = tokio::io::BufReader::new(input);
    tokio::time::timeout(super::common::WAIT, worker.run(input, tx, cancel))
        .await
        .unwrap();
}
