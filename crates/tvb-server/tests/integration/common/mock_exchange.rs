//! Mock Bitget REST endpoint for integration tests.
//!
//! Accepts `POST /api/v2/mix/order/place-order`, records headers and the raw
//! body, and answers with a configurable status and body.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};

/// One request as seen by the exchange.
#[derive(Debug, Clone)]
pub struct ReceivedOrder {
    pub headers: HeaderMap,
    pub body: String,
}

#[derive(Clone)]
struct MockState {
    received: Arc<Mutex<Vec<ReceivedOrder>>>,
    reply: Arc<Mutex<(u16, String)>>,
}

/// A mock exchange server for testing.
pub struct MockExchange {
    addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    state: MockState,
}

impl MockExchange {
    /// Start on an available port, answering `200 {"code":"00000"}`.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = MockState {
            received: Arc::new(Mutex::new(Vec::new())),
            reply: Arc::new(Mutex::new((
                200,
                r#"{"code":"00000","msg":"success","data":{"orderId":"1001"}}"#.to_string(),
            ))),
        };
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let app = Router::new()
            .route("/api/v2/mix/order/place-order", post(place_order))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx,
            state,
        }
    }

    /// Base URL to use as `exchange.base_url`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Change the canned reply.
    pub async fn reply_with(&self, status: u16, body: &str) {
        *self.state.reply.lock().await = (status, body.to_string());
    }

    /// All orders received so far.
    pub async fn received(&self) -> Vec<ReceivedOrder> {
        self.state.received.lock().await.clone()
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
    }
}

async fn place_order(
    State(state): State<MockState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    state.received.lock().await.push(ReceivedOrder {
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    });
    let (status, body) = state.reply.lock().await.clone();
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        body,
    )
}
