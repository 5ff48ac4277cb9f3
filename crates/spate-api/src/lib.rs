pub mod handlers;

use std::net::SocketAddr;

use anyhow::Context;
use axum::routing::{delete, get, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

pub use handlers::ApiState;

/// Build the measurement route table over shared daemon state.
///
/// Split out of [`serve`] so the daemon can bolt extra routes on (the
/// embedded UI) and tests can serve it from an ephemeral port.
pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/download/{session_id}", get(handlers::handle_download))
        .route(
            "/upload/{session_id}",
            put(handlers::handle_upload).post(handlers::handle_upload),
        )
        .route("/status/{session_id}", get(handlers::handle_status))
        .route("/clear/{session_id}", delete(handlers::handle_clear))
        .route("/ping/{session_id}", get(handlers::handle_ping))
        .route("/ws", get(handlers::handle_control))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "API listening");
    axum::serve(listener, app).await?;
    Ok(())
}
