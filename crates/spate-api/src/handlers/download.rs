//! /download handler — streams metered pseudorandom bytes to the caller.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::stream;
use rand::RngCore;

use spate_core::meter::{Direction, SessionMeter};

use super::ApiState;

pub async fn handle_download(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    // Validation first: a bad byte count must not create the session.
    let Some(requested) = requested_bytes(&params) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let Some(meter) = state.registry.resolve(&session_id, true) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let total = requested.min(state.stream.download_max_bytes);
    tracing::info!(session_id = %session_id, bytes = total, "download request");

    let body = if total == 0 {
        Body::empty()
    } else {
        // One buffer per request, sliced repeatedly. Random content keeps
        // the stream larger than any compression window on the path. At
        // least one byte, or the iterator below could never make progress.
        let buffer_len = state.stream.download_buffer_bytes.max(1).min(total as usize);
        Body::from_stream(stream::iter(metered_chunks(
            random_chunk(buffer_len),
            total,
            meter,
        )))
    };

    (
        [
            (
                header::CACHE_CONTROL,
                "no-cache, no-store, must-revalidate",
            ),
            (header::CONTENT_TYPE, "application/octet-stream"),
        ],
        body,
    )
        .into_response()
}

/// Parse the `bytes` query parameter the way clients send it: a signed
/// integer, with negatives clamped to zero. Missing or non-numeric is `None`
/// and rejects the request.
fn requested_bytes(params: &HashMap<String, String>) -> Option<u64> {
    let parsed = params.get("bytes")?.parse::<i64>().ok()?;
    Some(parsed.max(0) as u64)
}

/// A buffer of `len` pseudorandom bytes.
fn random_chunk(len: usize) -> Bytes {
    let mut buf = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut buf);
    Bytes::from(buf)
}

/// Slices of `buffer` adding up to exactly `total` bytes, metering each one
/// as it is yielded.
///
/// hyper pulls the next chunk only once the socket has drained the previous
/// one, so the meter tracks delivery pace rather than generation pace. When
/// the client goes away the stream is dropped and the counters simply stop
/// where delivery stopped.
fn metered_chunks(
    buffer: Bytes,
    total: u64,
    meter: Arc<SessionMeter>,
) -> impl Iterator<Item = Result<Bytes, Infallible>> {
    let mut remaining = total;
    let mut started = false;
    std::iter::from_fn(move || {
        if remaining == 0 {
            return None;
        }
        if !started {
            meter.record_transfer_start(Direction::Download);
            started = true;
        }
        let take = remaining.min(buffer.len() as u64) as usize;
        let chunk = buffer.slice(..take);
        meter.record_chunk(Direction::Download, take as u64);
        remaining -= take as u64;
        Some(Ok(chunk))
    })
}
