use super::common::{UNREACHABLE, WAIT, debug_settings_for, settings_for};
use mcp_bridge::bridge::InboundWorker;
use mcp_bridge::bridge::queue::payload_channel;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SSE_BODY: &str = "event: endpoint\n\
                        data: {\"url\":\"/mcp\"}\n\
                        \n\
                        data: {\"jsonrpc\":\"2.0\",\"id\":7,\"result\":{}}\n\
                        \n";

fn sse_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/event-stream")
}

#[tokio::test]
async fn test_reconnects_after_failure_and_forwards_results_only() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sse"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sse"))
        .and(header("accept", "text/event-stream"))
        .respond_with(sse_response(SSE_BODY))
        .mount(&server)
        .await;

    let worker = InboundWorker::new(&settings_for(&server.uri())).unwrap();
    let (tx, mut rx) = payload_channel(32);
    let cancel = CancellationToken::new();
    let handle = tokio::spawn({
        let cancel = cancel.clone();
        async move { worker.run(tx, cancel).await }
    });

    let payload = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(payload, br#"{"jsonrpc":"2.0","id":7,"result":{}}"#.to_vec());

    cancel.cancel();
    timeout(WAIT, handle).await.unwrap().unwrap();

    // The endpoint advertisement never reaches the queue.
    while let Ok(payload) = rx.try_recv() {
        assert_ne!(payload, br#"{"url":"/mcp"}"#.to_vec());
    }
    let requests = server.received_requests().await.unwrap();
    assert!(requests.len() >= 2);
}

#[tokio::test]
async fn test_multiline_data_is_concatenated() {
    let server = MockServer::start().await;
    let body = "data: {\"jsonrpc\":\"2.0\",\n\
                data:  \"id\":8,\"error\":{\"code\":1,\"message\":\"x\"}}\n\
                \n";
    Mock::given(method("GET"))
        .respond_with(sse_response(body))
        .mount(&server)
        .await;

    let worker = InboundWorker::new(&settings_for(&server.uri())).unwrap();
    let (tx, mut rx) = payload_channel(32);
    let cancel = CancellationToken::new();
    let handle = tokio::spawn({
        let cancel = cancel.clone();
        async move { worker.run(tx, cancel).await }
    });

    let payload = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(
        payload,
        br#"{"jsonrpc":"2.0","id":8,"error":{"code":1,"message":"x"}}"#.to_vec()
    );

    cancel.cancel();
    timeout(WAIT, handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_profile_header_sent_in_debug_mode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("x-profile", "dev"))
        .respond_with(sse_response(SSE_BODY))
        .mount(&server)
        .await;

    let worker = InboundWorker::new(&debug_settings_for(&server.uri(), "dev")).unwrap();
    let (tx, mut rx) = payload_channel(32);
    let cancel = CancellationToken::new();
    let handle = tokio::spawn({
        let cancel = cancel.clone();
        async move { worker.run(tx, cancel).await }
    });

    assert!(timeout(WAIT, rx.recv()).await.unwrap().is_some());

    cancel.cancel();
    timeout(WAIT, handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_cancel_interrupts_reconnect_delay() {
    let mut settings = settings_for(UNREACHABLE);
    settings.reconnect_delay = Duration::from_secs(60);

    let worker = InboundWorker::new(&settings).unwrap();
    let (tx, _rx) = payload_channel(1);
    let cancel = CancellationToken::new();
    let handle = tokio::spawn({
        let cancel = cancel.clone();
        async move { worker.run(tx, cancel).await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    let started = Instant::now();
    cancel.cancel();
    timeout(WAIT, handle).await.unwrap().unwrap();
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_stops_when_queue_closed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(sse_response(SSE_BODY))
        .mount(&server)
        .await;

    let worker = InboundWorker::new(&settings_for(&server.uri())).unwrap();
    let (tx, rx) = payload_channel(1);
    drop(rx);

    timeout(WAIT, worker.run(tx, CancellationToken::new()))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_clean_stream_end_reconnects_without_delay() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sse"))
        .respond_with(sse_response(SSE_BODY))
        .mount(&server)
        .await;

    let mut settings = settings_for(&server.uri());
    settings.reconnect_delay = Duration::from_secs(2);

    let worker = InboundWorker::new(&settings).unwrap();
    let (tx, mut rx) = payload_channel(32);
    let cancel = CancellationToken::new();
    let handle = tokio::spawn({
        let cancel = cancel.clone();
        async move { worker.run(tx, cancel).await }
    });

    // Keep the queue drained so the worker never blocks on a full queue.
    let drain = tokio::spawn(async move { while rx.recv().await.is_some() {} });

    let started = Instant::now();
    let mut gets = 0;
    while started.elapsed() < Duration::from_millis(1500) {
        gets = server.received_requests().await.unwrap().len();
        if gets >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    cancel.cancel();
    timeout(WAIT, handle).await.unwrap().unwrap();
    drain.await.unwrap();

    assert!(gets >= 2, "expected an immediate reconnect, saw {} GETs", gets);
}
