#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use liverelay_bridge::app_state::AppState;
use liverelay_bridge::config;
use liverelay_bridge::dispatch::{DispatchTable, Dispatcher, EventHandler, SeenUnknownCmds};
use liverelay_bridge::obs::BridgeMetrics;
use liverelay_bridge::ops;

struct Noop;
impl EventHandler for Noop {}

fn state() -> AppState {
    let cfg = config::load_from_str("version: 1\n").unwrap();
    let metrics = Arc::new(BridgeMetrics::default());
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::new(DispatchTable::builtin().unwrap()),
        Arc::new(SeenUnknownCmds::new()),
        Arc::new(Noop),
        Arc::clone(&metrics),
    ));
    AppState::from_parts(cfg, dispatcher, metrics)
}

#[tokio::test]
async fn readyz_flips_to_503_when_draining() {
    let st = state();
    let ready = ops::readyz(State(st.clone())).await.into_response();
    assert_eq!(ready.status(), StatusCode::OK);

    st.metrics().set_draining();
    let draining = ops::readyz(State(st)).await.into_response();
    assert_eq!(draining.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn healthz_is_always_ok() {
    assert_eq!(ops::healthz().await.into_response().status(), StatusCode::OK);
}

#[tokio::test]
async fn metrics_is_prometheus_text() {
    let st = state();
    st.metrics().events.inc(&[("kind", "danmaku"), ("outcome", "handled")]);

    let resp = ops::metrics(State(st)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let ct = resp.headers().get(axum::http::header::CONTENT_TYPE).unwrap();
    assert!(ct.to_str().unwrap().starts_with("text/plain"));
}

#[test]
fn session_ids_are_unique() {
    let st = state();
    let a = st.next_session_id();
    let b = st.next_session_id();
    assert_ne!(a, b);
}
