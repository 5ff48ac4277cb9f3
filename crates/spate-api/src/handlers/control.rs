//! /ws handler — the browser control channel.
//!
//! A deliberately tiny text protocol: `p…` answers `p` (latency probe),
//! `s<id>` answers that session's meter as JSON. Anything else, including
//! binary frames, answers the single-letter error reply rather than closing,
//! so one bad frame does not kill a measurement run.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use spate_services::SessionRegistry;

use super::ApiState;

const PING_REPLY: &str = "p";
const ERROR_REPLY: &str = "e";

pub async fn handle_control(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(state): State<ApiState>,
) -> Response {
    let origin = headers.get(header::ORIGIN).and_then(|v| v.to_str().ok());
    let host = headers.get(header::HOST).and_then(|v| v.to_str().ok());

    if !origin_allowed(origin, host) {
        tracing::warn!(?origin, ?host, "control channel origin rejected");
        return (StatusCode::FORBIDDEN, "origin not allowed").into_response();
    }

    ws.on_upgrade(move |socket| control_loop(socket, state.registry))
}

async fn control_loop(mut socket: WebSocket, registry: Arc<SessionRegistry>) {
    while let Some(Ok(frame)) = socket.recv().await {
        let reply = match frame {
            Message::Text(text) => text_reply(&registry, text.as_str()),
            Message::Binary(_) => ERROR_REPLY.to_string(),
            Message::Close(_) => break,
            // The transport answers pings on its own; pongs carry no request.
            Message::Ping(_) | Message::Pong(_) => continue,
        };
        if socket.send(Message::Text(reply.into())).await.is_err() {
            break;
        }
    }
}

/// Dispatch one text frame by its first byte.
fn text_reply(registry: &SessionRegistry, text: &str) -> String {
    match text.as_bytes().first() {
        Some(b'p') => PING_REPLY.to_string(),
        Some(b's') => registry
            .resolve(&text[1..], false)
            .and_then(|meter| serde_json::to_string(&meter.snapshot()).ok())
            .unwrap_or_else(|| ERROR_REPLY.to_string()),
        _ => ERROR_REPLY.to_string(),
    }
}

/// Same-origin check: the Origin header must name exactly this host,
/// whichever of http/https the page came over. No Origin, no upgrade.
fn origin_allowed(origin: Option<&str>, host: Option<&str>) -> bool {
    let (Some(origin), Some(host)) = (origin, host) else {
        return false;
    };
    origin
        .strip_prefix("http://")
        .or_else(|| origin.strip_prefix("https://"))
        .is_some_and(|origin_host| origin_host.eq_ignore_ascii_case(host))
}
