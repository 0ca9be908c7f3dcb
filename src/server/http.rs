//! HTTP transport.
//!
//! Routes:
//! - `GET /health`
//! - `GET /lookup?target=...` (no client context)
//! - `POST /lookup` with a JSON request body (empty body = inferred target)
//!
//! Anything else is a JSON 404.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;

use crate::config::{ERROR_ROUTE_NOT_FOUND, HEADER_X_FORWARDED_FOR};
use crate::protocol::{self, LookupRequest, RequestHandler, RequestSource};

/// Shared state for the HTTP routes.
#[derive(Clone)]
struct HttpState {
    handler: RequestHandler,
    permits: Arc<Semaphore>,
}

#[derive(Debug, Default, Deserialize)]
struct LookupQuery {
    #[serde(default)]
    target: String,
}

/// Builds the router; requests beyond `max_in_flight` wait for a slot.
pub fn router(handler: RequestHandler, max_in_flight: usize) -> Router {
    let state = HttpState {
        handler,
        permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
    };
    Router::new()
        .route("/health", get(health_handler))
        .route("/lookup", get(lookup_query_handler).post(lookup_body_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

/// Serves HTTP until `shutdown` completes, then drains open requests.
pub async fn serve_http<F>(
    listener: TcpListener,
    handler: RequestHandler,
    max_in_flight: usize,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(handler, max_in_flight);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;
    Ok(())
}

async fn health_handler(
    State(state): State<HttpState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    dispatch(&state, LookupRequest::health(), peer, &headers).await
}

async fn lookup_query_handler(
    State(state): State<HttpState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Query(query): Query<LookupQuery>,
) -> Response {
    dispatch(&state, LookupRequest::lookup(query.target), peer, &headers).await
}

async fn lookup_body_handler(
    State(state): State<HttpState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Ok(_permit) = state.permits.acquire().await else {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    };
    let source = request_source(peer, &headers);
    let response = state.handler.handle_payload(&body, &source).await;
    into_http(response)
}

async fn not_found_handler() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"ok": false, "error": ERROR_ROUTE_NOT_FOUND})),
    )
        .into_response()
}

async fn dispatch(
    state: &HttpState,
    request: LookupRequest,
    peer: SocketAddr,
    headers: &HeaderMap,
) -> Response {
    let Ok(_permit) = state.permits.acquire().await else {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    };
    let source = request_source(peer, headers);
    into_http(state.handler.handle_request(request, &source).await)
}

fn request_source(peer: SocketAddr, headers: &HeaderMap) -> RequestSource {
    let forwarded = headers
        .get(HEADER_X_FORWARDED_FOR)
        .and_then(|value| value.to_str().ok());
    RequestSource::forwarded(peer.ip().to_canonical().to_string(), forwarded)
}

fn into_http(response: protocol::Response) -> Response {
    let status = StatusCode::from_u16(response.status_code()).unwrap_or(StatusCode::BAD_REQUEST);
    (status, Json(response)).into_response()
}
