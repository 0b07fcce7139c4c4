use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{
    LatencyUnit,
    catch_panic::CatchPanicLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::handlers;
use crate::middleware::{handle_panic, make_request_span, method_not_allowed, not_found};
use crate::state::AppState;

/// Router の構築
///
/// レイヤーは後に追加したものが外側になる。TraceLayer を最外にして
/// パニック由来の 500 も記録する。
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(make_request_span)
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/otp", post(handlers::generate_otp))
        .route("/qr-secret", post(handlers::qr_secret))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(trace_layer)
        .with_state(state)
}
