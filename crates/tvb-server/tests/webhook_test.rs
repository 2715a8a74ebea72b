//! Webhook end-to-end tests.
//!
//! Drives the axum router with `oneshot` requests:
//! - Real HTTP dispatch against a local mock exchange
//! - Rejection paths with a recording mock dispatcher
//! - Liveness and metrics routes

mod integration;
use integration::common::mock_exchange::MockExchange;

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use tvb_executor::{
    sign, DynDispatcher, ExchangeConfig, ExchangeCredentials, HttpDispatcher, MockDispatcher,
    OperatingMode, RelayConfig, SignalRelay, SignatureEncoding,
};
use tvb_server::{create_router, AppState, ServerConfig};

const BRIDGE_SECRET: &str = "S";
const API_SECRET: &str = "api-secret";

fn credentials() -> ExchangeCredentials {
    ExchangeCredentials::new(
        Some("api-key".to_string()),
        Some(API_SECRET.to_string()),
        Some("passphrase".to_string()),
    )
}

fn router(config: RelayConfig, credentials: ExchangeCredentials, dispatcher: DynDispatcher) -> Router {
    let relay = SignalRelay::new(config, Some(BRIDGE_SECRET), credentials, dispatcher);
    create_router(AppState::new(Arc::new(relay), &ServerConfig::default()))
}

fn mock_router(dispatcher: Arc<MockDispatcher>) -> Router {
    router(RelayConfig::default(), credentials(), dispatcher)
}

fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

fn buy_signal() -> Value {
    json!({
        "secret": BRIDGE_SECRET,
        "timestamp": now_secs(),
        "action": "buy",
        "order": { "amount": 0.01 },
        "tv_instrument": "BITGET:BTCUSDTPERP"
    })
}

async fn post_hook(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/hook")
        .header("content-type", "text/plain")
        .body(body.into())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn live_config(base_url: String) -> RelayConfig {
    RelayConfig {
        exchange: ExchangeConfig {
            base_url,
            ..ExchangeConfig::default()
        },
        ..RelayConfig::default()
    }
}

#[tokio::test]
async fn test_end_to_end_buy_reaches_exchange() {
    let exchange = MockExchange::start().await;
    let dispatcher = Arc::new(HttpDispatcher::new(Duration::from_secs(5)).unwrap());
    let app = router(live_config(exchange.base_url()), credentials(), dispatcher);

    let (status, body) = post_hook(app, buy_signal().to_string()).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["ok"], true);
    assert_eq!(body["bitget"]["code"], "00000");
    assert_eq!(body["orderSent"]["symbol"], "BTCUSDT");
    assert_eq!(body["orderSent"]["side"], "buy");
    assert_eq!(body["orderSent"]["tradeSide"], "open");
    assert_eq!(body["orderSent"]["size"], "0.01");
    assert_eq!(body["orderSent"]["orderType"], "market");

    let received = exchange.received().await;
    assert_eq!(received.len(), 1);
    let order = &received[0];
    assert_eq!(order.headers["access-key"], "api-key");
    assert_eq!(order.headers["access-passphrase"], "passphrase");
    assert_eq!(order.headers["content-type"], "application/json");
    assert_eq!(order.headers["locale"], "en-US");

    // The signature verifies against exactly the bytes the exchange received.
    let timestamp = order.headers["access-timestamp"].to_str().unwrap();
    let expected = sign(
        "POST",
        "/api/v2/mix/order/place-order",
        timestamp,
        &order.body,
        API_SECRET.as_bytes(),
        SignatureEncoding::Base64,
    )
    .unwrap();
    assert_eq!(order.headers["access-sign"], expected.as_str());

    let sent: Value = serde_json::from_str(&order.body).unwrap();
    assert_eq!(sent, body["orderSent"]);

    exchange.shutdown().await;
}

#[tokio::test]
async fn test_exchange_rejection_is_relayed() {
    let exchange = MockExchange::start().await;
    exchange
        .reply_with(400, r#"{"code":"40762","msg":"The order amount exceeds the balance"}"#)
        .await;
    let dispatcher = Arc::new(HttpDispatcher::new(Duration::from_secs(5)).unwrap());
    let app = router(live_config(exchange.base_url()), credentials(), dispatcher);

    let (status, body) = post_hook(app, buy_signal().to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "upstream_error");
    assert_eq!(body["bitget"]["code"], "40762");
    assert_eq!(body["orderSent"]["symbol"], "BTCUSDT");
    assert_eq!(exchange.received().await.len(), 1);

    exchange.shutdown().await;
}

#[tokio::test]
async fn test_unreachable_exchange_is_bad_gateway() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dispatcher = Arc::new(HttpDispatcher::new(Duration::from_secs(2)).unwrap());
    let app = router(live_config(format!("http://{addr}")), credentials(), dispatcher);

    let (status, body) = post_hook(app, buy_signal().to_string()).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "upstream_error");
    assert!(body["details"]["message"].as_str().is_some());
    assert_eq!(body["orderSent"]["symbol"], "BTCUSDT");
}

#[tokio::test]
async fn test_invalid_amount_rejected_without_dispatch() {
    let dispatcher = Arc::new(MockDispatcher::new());
    let mut signal = buy_signal();
    signal["order"]["amount"] = json!(-5);

    let (status, body) = post_hook(mock_router(dispatcher.clone()), signal.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_amount");
    assert_eq!(dispatcher.request_count(), 0);
}

#[tokio::test]
async fn test_invalid_action_rejected() {
    let dispatcher = Arc::new(MockDispatcher::new());
    let mut signal = buy_signal();
    signal["action"] = json!("hodl");

    let (status, body) = post_hook(mock_router(dispatcher.clone()), signal.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_action");
    assert_eq!(body["details"]["action"], "hodl");
    assert_eq!(dispatcher.request_count(), 0);
}

#[tokio::test]
async fn test_wrong_secret_is_forbidden() {
    let dispatcher = Arc::new(MockDispatcher::new());
    let mut signal = buy_signal();
    signal["secret"] = json!("not-the-secret");

    let (status, body) = post_hook(mock_router(dispatcher.clone()), signal.to_string()).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({"ok": false, "error": "unauthorized"}));
    assert_eq!(dispatcher.request_count(), 0);
}

#[tokio::test]
async fn test_unparseable_body_is_forbidden() {
    let dispatcher = Arc::new(MockDispatcher::new());
    let (status, body) = post_hook(mock_router(dispatcher.clone()), "not json at all").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "unauthorized");
    assert_eq!(dispatcher.request_count(), 0);
}

#[tokio::test]
async fn test_stale_signal_rejected() {
    let dispatcher = Arc::new(MockDispatcher::new());
    let mut signal = buy_signal();
    signal["timestamp"] = json!(now_secs() - 3_600);

    let (status, body) = post_hook(mock_router(dispatcher.clone()), signal.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "stale_or_future_signal");
    assert_eq!(body["details"]["maxLag"], 600.0);
    assert_eq!(dispatcher.request_count(), 0);
}

#[tokio::test]
async fn test_millisecond_timestamp_accepted() {
    let dispatcher = Arc::new(MockDispatcher::new());
    let mut signal = buy_signal();
    signal["timestamp"] = json!(chrono::Utc::now().timestamp_millis());

    let (status, _) = post_hook(mock_router(dispatcher.clone()), signal.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(dispatcher.request_count(), 1);
}

#[tokio::test]
async fn test_missing_bridge_secret_is_server_error() {
    let dispatcher: DynDispatcher = Arc::new(MockDispatcher::new());
    let relay = SignalRelay::new(RelayConfig::default(), None, credentials(), dispatcher);
    let app = create_router(AppState::new(Arc::new(relay), &ServerConfig::default()));

    let (status, body) = post_hook(app, buy_signal().to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "bridge_secret_not_set");
}

#[tokio::test]
async fn test_missing_exchange_credentials_is_server_error() {
    let dispatcher = Arc::new(MockDispatcher::new());
    let app = router(
        RelayConfig::default(),
        ExchangeCredentials::default(),
        dispatcher.clone(),
    );

    let (status, body) = post_hook(app, buy_signal().to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "exchange_env_not_set");
    assert_eq!(dispatcher.request_count(), 0);
}

#[tokio::test]
async fn test_dry_run_returns_signed_request() {
    let dispatcher = Arc::new(MockDispatcher::new());
    let config = RelayConfig {
        mode: OperatingMode::DryRun,
        ..RelayConfig::default()
    };
    let app = router(config, credentials(), dispatcher.clone());

    let (status, body) = post_hook(app, buy_signal().to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dryRun"], true);
    assert_eq!(body["signed"]["method"], "POST");
    assert!(!body["signed"]["signature"].as_str().unwrap().is_empty());
    let text = body.to_string();
    assert!(!text.contains(API_SECRET));
    assert!(!text.contains("api-key"));
    assert_eq!(dispatcher.request_count(), 0);
}

#[tokio::test]
async fn test_exit_signal_skipped_when_close_disabled() {
    let dispatcher = Arc::new(MockDispatcher::new());
    let mut config = RelayConfig::default();
    config.order.close_on_exit = false;
    let app = router(config, credentials(), dispatcher.clone());

    let mut signal = buy_signal();
    signal["action"] = json!("sell");
    signal["market_position"] = json!("flat");

    let (status, body) = post_hook(app, signal.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["skipped"], true);
    assert_eq!(dispatcher.request_count(), 0);
}

#[tokio::test]
async fn test_liveness_routes() {
    let dispatcher = Arc::new(MockDispatcher::new());
    for uri in ["/", "/health"] {
        let (status, text) = get_text(mock_router(dispatcher.clone()), uri).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!text.is_empty());
    }
}

#[tokio::test]
async fn test_metrics_route_exposes_counters() {
    let dispatcher = Arc::new(MockDispatcher::new());
    let app = mock_router(dispatcher);
    let (status, _) = post_hook(app.clone(), buy_signal().to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, text) = get_text(app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("tvb_signals_total"));
    assert!(text.contains("tvb_orders_dispatched_total"));
}
