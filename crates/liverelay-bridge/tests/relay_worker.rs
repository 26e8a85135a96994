#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use serde_json::json;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

use liverelay_bridge::avatar::{AvatarResolver, ImageFetch, ProfileLookup};
use liverelay_bridge::context::RoomCtx;
use liverelay_bridge::dispatch::{DispatchOutcome, DispatchTable, Dispatcher, SeenUnknownCmds};
use liverelay_bridge::obs::BridgeMetrics;
use liverelay_bridge::relay::{spawn_relay, RelayJob, RelaySender, TcpConnector};
use liverelay_bridge::services::RelayHandler;
use liverelay_core::error::{RelayError, Result};
use liverelay_core::protocol::event::RawEvent;
use liverelay_core::protocol::frame::{try_decode_frame, RelayPayload, DEFAULT_MAX_FRAME_BYTES};
use liverelay_core::protocol::models::EventKind;

struct Offline;

#[async_trait]
impl ProfileLookup for Offline {
    async fn avatar_url(&self, uid: i64) -> Result<String> {
        Err(RelayError::ProfileLookup(format!("offline ({uid})")))
    }
}

#[async_trait]
impl ImageFetch for Offline {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        Err(RelayError::ImageFetch(format!("offline ({url})")))
    }
}

fn offline_resolver(dir: &tempfile::TempDir, metrics: &Arc<BridgeMetrics>) -> Arc<AvatarResolver> {
    Arc::new(AvatarResolver::new(
        dir.path(),
        "0.png",
        Arc::new(Offline),
        Arc::new(Offline),
        Arc::clone(metrics),
    ))
}

fn job(uid: i64, msg: &str) -> RelayJob {
    RelayJob {
        room_id: 1,
        uid,
        uname: format!("user{uid}"),
        msg: msg.into(),
    }
}

async fn accept_frames(listener: TcpListener, n: usize) -> Vec<RelayPayload> {
    let (mut stream, _) = listener.accept().await.unwrap();
    let mut buf = BytesMut::new();
    let mut out = Vec::new();
    while out.len() < n {
        while let Some(p) = try_decode_frame(&mut buf, DEFAULT_MAX_FRAME_BYTES).unwrap() {
            out.push(p);
        }
        if out.len() < n {
            assert!(stream.read_buf(&mut buf).await.unwrap() > 0, "relay closed early");
        }
    }
    out
}

#[tokio::test]
async fn jobs_are_relayed_in_enqueue_order_with_fallback_face() {
    let dir = tempfile::tempdir().unwrap();
    let metrics = Arc::new(BridgeMetrics::default());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let reader = tokio::spawn(accept_frames(listener, 5));

    let sender = RelaySender::new(TcpConnector::new(addr), Duration::from_secs(1), DEFAULT_MAX_FRAME_BYTES);
    let rt = spawn_relay(16, sender, offline_resolver(&dir, &metrics), Arc::clone(&metrics));

    for i in 1..=5 {
        rt.handle.enqueue(job(i, &format!("msg {i}"))).unwrap();
    }

    let got = reader.await.unwrap();
    let fallback = dir.path().join("0.png").to_string_lossy().into_owned();
    let uids: Vec<i64> = got.iter().map(|p| p.uid).collect();
    assert_eq!(uids, vec![1, 2, 3, 4, 5]);
    assert!(got.iter().all(|p| p.face_path == fallback));
    assert_eq!(got[2].msg, "msg 3");
    assert_eq!(got[2].uname, "user3");

    rt.shutdown(Duration::from_secs(1)).await;
    assert_eq!(metrics.relay_frames.get(&[("result", "ok")]), 5);
}

#[tokio::test]
async fn shutdown_drains_buffered_jobs_then_rejects_new_ones() {
    let dir = tempfile::tempdir().unwrap();
    let metrics = Arc::new(BridgeMetrics::default());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let reader = tokio::spawn(accept_frames(listener, 3));

    let sender = RelaySender::new(TcpConnector::new(addr), Duration::from_secs(1), DEFAULT_MAX_FRAME_BYTES);
    let rt = spawn_relay(16, sender, offline_resolver(&dir, &metrics), Arc::clone(&metrics));
    let late = rt.handle.clone();

    for i in 1..=3 {
        rt.handle.enqueue(job(i, "bye")).unwrap();
    }
    rt.shutdown(Duration::from_secs(2)).await;

    let got = reader.await.unwrap();
    assert_eq!(got.iter().map(|p| p.uid).collect::<Vec<_>>(), vec![1, 2, 3]);

    let err = late.enqueue(job(4, "too late")).expect_err("must fail");
    assert_eq!(err.code().as_str(), "RELAY_UNAVAILABLE");
    assert_eq!(metrics.relay_queue_dropped.get(&[("reason", "closed")]), 1);
}

#[tokio::test]
async fn unreachable_relay_drops_messages_and_keeps_running() {
    let dir = tempfile::tempdir().unwrap();
    let metrics = Arc::new(BridgeMetrics::default());

    // Reserve a port, then free it so connects are refused.
    let addr = {
        let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
        l.local_addr().unwrap()
    };

    let sender = RelaySender::new(TcpConnector::new(addr), Duration::from_millis(500), DEFAULT_MAX_FRAME_BYTES);
    let rt = spawn_relay(16, sender, offline_resolver(&dir, &metrics), Arc::clone(&metrics));
    for i in 1..=2 {
        rt.handle.enqueue(job(i, "into the void")).unwrap();
    }
    rt.shutdown(Duration::from_secs(3)).await;

    assert_eq!(metrics.relay_frames.get(&[("result", "error")]), 2);
    assert_eq!(metrics.relay_errors.get(&[("code", "RELAY_CONNECT")]), 2);
}

#[tokio::test]
async fn versioned_chat_event_reaches_socket_as_exact_frame() {
    let dir = tempfile::tempdir().unwrap();
    let metrics = Arc::new(BridgeMetrics::default());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let reader = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut header = [0u8; 4];
        stream.read_exact(&mut header).await.unwrap();
        let mut body = vec![0u8; u32::from_le_bytes(header) as usize];
        stream.read_exact(&mut body).await.unwrap();
        String::from_utf8(body).unwrap()
    });

    let sender = RelaySender::new(TcpConnector::new(addr), Duration::from_secs(1), DEFAULT_MAX_FRAME_BYTES);
    let rt = spawn_relay(16, sender, offline_resolver(&dir, &metrics), Arc::clone(&metrics));
    let dispatcher = Dispatcher::new(
        Arc::new(DispatchTable::builtin().unwrap()),
        Arc::new(SeenUnknownCmds::new()),
        Arc::new(RelayHandler::new(rt.handle.clone())),
        Arc::clone(&metrics),
    );

    let raw = RawEvent::from_value(json!({
        "cmd": "DANMU_MSG:4:0:2:2:2:0",
        "info": [[0, 1, 25, 16777215, 1700000000123_i64], "hello", [12345, "alice", 0, 0, 0, 10000, 1, ""], [], [0, 0, 9868950, ">50000", 0]]
    }))
    .unwrap();
    let out = dispatcher.dispatch(&RoomCtx::new(21396545, "s-e2e"), &raw).await;
    assert_eq!(out, DispatchOutcome::Handled(EventKind::Danmaku));

    let body = reader.await.unwrap();
    let face = dir.path().join("0.png").to_string_lossy().into_owned();
    let expected = format!(
        r#"{{"uid":12345,"uname":"alice","msg":"hello","face_path":{}}}"#,
        serde_json::to_string(&face).unwrap()
    );
    assert_eq!(body, expected);

    rt.shutdown(Duration::from_secs(1)).await;
}
