//! WebSocket ingest handler.
//!
//! Responsibilities:
//! - Upgrade HTTP -> WS for `/v1/ingest?room=<id>`
//! - One tracing span and one `RoomCtx` per session
//! - Decode-once, then dispatch in arrival order (one record at a time)
//! - Lifecycle: pong on ping, stop on close or socket error
//!
//! A bad frame never ends the session: it is logged and skipped.

use axum::{
    extract::{ws::Message, ws::WebSocket, ws::WebSocketUpgrade, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::app_state::AppState;
use crate::context::RoomCtx;
use crate::transport::codec::{decode, Inbound};

#[derive(Debug, Deserialize)]
pub struct IngestQuery {
    pub room: u64,
}

pub async fn ws_ingest(
    State(app): State<AppState>,
    ws: WebSocketUpgrade,
    Query(q): Query<IngestQuery>,
) -> Response {
    if app.metrics().is_draining() {
        return (StatusCode::SERVICE_UNAVAILABLE, "draining").into_response();
    }

    let ctx = RoomCtx::new(q.room, app.next_session_id());
    let span = info_span!("ingest", room_id = ctx.room_id(), session = %ctx.session_id());
    ws.on_upgrade(move |socket| run_session(app, ctx, socket).instrument(span))
}

async fn run_session(app: AppState, ctx: RoomCtx, socket: WebSocket) {
    let metrics = app.metrics();
    let dispatcher = app.dispatcher();
    let max_frame_bytes = app.cfg().ingest.max_frame_bytes;

    metrics.ingest_sessions_active.inc(&[]);
    info!("ingest session opened");

    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut records: u64 = 0;

    while let Some(incoming) = ws_rx.next().await {
        let msg = match incoming {
            Ok(msg) => msg,
            Err(e) => {
                debug!(error = %e, "socket read failed");
                break;
            }
        };

        match decode(msg, max_frame_bytes) {
            Ok(Inbound::Event { raw, .. }) => {
                records += 1;
                dispatcher.dispatch(&ctx, &raw).await;
            }
            Ok(Inbound::Binary { bytes_len }) => {
                debug!(bytes_len, "ignoring binary frame");
            }
            Ok(Inbound::Ping(payload)) => {
                if ws_tx.send(Message::Pong(payload)).await.is_err() {
                    break;
                }
            }
            Ok(Inbound::Pong(_)) => {}
            Ok(Inbound::Close) => break,
            Err(e) => {
                warn!(code = e.code().as_str(), error = %e, "skipping undecodable frame");
            }
        }
    }

    metrics.ingest_sessions_active.dec(&[]);
    info!(records, "ingest session closed");
}
