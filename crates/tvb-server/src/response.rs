//! Webhook JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::{json, Map, Value};
use tvb_auth::AuthError;
use tvb_core::{CoreError, NormalizedOrder};
use tvb_executor::{RelayError, RelayOutcome};

/// Response for a successfully handled signal.
pub fn outcome_response(outcome: &RelayOutcome) -> Response {
    let body = match outcome {
        RelayOutcome::Sent { order, response } => json!({
            "ok": true,
            "bitget": upstream_body(&response.body),
            "orderSent": order_value(order),
        }),
        RelayOutcome::DryRun { order, signed } => json!({
            "ok": true,
            "dryRun": true,
            "orderSent": order_value(order),
            "signed": signed,
        }),
        RelayOutcome::Skipped { action, reason } => json!({
            "ok": true,
            "skipped": true,
            "action": action.as_str(),
            "reason": reason,
        }),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Response for a failed signal. Never carries secret values.
pub fn error_response(err: &RelayError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut body = Map::new();
    body.insert("ok".into(), Value::Bool(false));
    body.insert("error".into(), Value::String(err.code().to_string()));

    if let Some(details) = error_details(err) {
        body.insert("details".into(), details);
    }
    if let RelayError::Upstream { body: upstream, .. } = err {
        body.insert("bitget".into(), upstream_body(upstream));
    }
    if let Some(order) = err.order() {
        body.insert("orderSent".into(), order_value(order));
    }

    (status, Json(Value::Object(body))).into_response()
}

fn error_details(err: &RelayError) -> Option<Value> {
    match err {
        RelayError::Auth(AuthError::StaleOrFutureSignal {
            now_secs,
            ts_secs,
            max_lag_secs,
        }) => Some(json!({
            "now": now_secs,
            "ts": ts_secs,
            "maxLag": max_lag_secs,
        })),
        RelayError::Auth(_) => None,
        RelayError::Core(CoreError::InvalidAction(raw)) => Some(json!({
            "message": err.to_string(),
            "action": raw,
        })),
        RelayError::Core(_) => Some(json!({ "message": err.to_string() })),
        RelayError::ExchangeNotConfigured { missing } => Some(json!({ "missing": missing })),
        RelayError::Upstream { status, .. } => Some(json!({ "status": status })),
        RelayError::Transport { message, .. } => Some(json!({ "message": message })),
        RelayError::Internal(_) => None,
    }
}

/// Exchange body as JSON when it parses, as a string otherwise.
fn upstream_body(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

fn order_value(order: &NormalizedOrder) -> Value {
    serde_json::to_value(order).unwrap_or(Value::Null)
}
