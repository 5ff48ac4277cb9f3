//! /upload handler — drains and meters whatever the client sends.

use std::io;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures::TryStreamExt;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::io::StreamReader;

use spate_core::meter::{Direction, SessionMeter};

use super::ApiState;

pub async fn handle_upload(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
    body: Body,
) -> Response {
    let Some(meter) = state.registry.resolve(&session_id, true) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    tracing::info!(session_id = %session_id, "upload request");

    let reader = StreamReader::new(body.into_data_stream().map_err(io::Error::other));
    let drained = drain(reader, &meter, state.stream.upload_chunk_bytes).await;
    tracing::debug!(session_id = %session_id, bytes = drained, "upload drained");

    // Ack unconditionally: a half-sent body still measured something.
    "ok".into_response()
}

/// Read `reader` to completion in `chunk_size` pieces, metering every chunk.
///
/// The payload itself is thrown away; only its size and timing matter. An
/// error mid-body (client hung up) just ends the drain, keeping whatever
/// was counted so far.
async fn drain<R>(mut reader: R, meter: &SessionMeter, chunk_size: usize) -> u64
where
    R: AsyncRead + Unpin,
{
    let mut buffer = vec![0u8; chunk_size];
    let mut total = 0u64;
    let mut started = false;

    loop {
        match reader.read(&mut buffer).await {
            Ok(0) => break,
            Ok(n) => {
                if !started {
                    meter.record_transfer_start(Direction::Upload);
                    started = true;
                }
                meter.record_chunk(Direction::Upload, n as u64);
                total += n as u64;
            }
            Err(_) => break,
        }
    }
    total
}
