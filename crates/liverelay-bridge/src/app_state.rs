//! Shared application state for the ingest server.
//!
//! `AppState::build` turns a validated config into the running pipeline:
//! dispatch table, avatar resolver, relay worker and the dispatcher that ties
//! them together. Startup errors are returned, never panicked on.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use liverelay_core::error::{RelayError, Result};

use crate::avatar::{http, AvatarResolver, HttpImageFetch, HttpProfileLookup};
use crate::config::BridgeConfig;
use crate::dispatch::{DispatchTable, Dispatcher, SeenUnknownCmds};
use crate::obs::BridgeMetrics;
use crate::relay::{spawn_relay, RelayRuntime, RelaySender, TcpConnector};
use crate::services::RelayHandler;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: BridgeConfig,
    dispatcher: Arc<Dispatcher>,
    metrics: Arc<BridgeMetrics>,
    session_seq: AtomicU64,
}

impl AppState {
    /// Wire an already-built dispatcher. Used by `build` and by tests that
    /// supply their own handler.
    pub fn from_parts(cfg: BridgeConfig, dispatcher: Arc<Dispatcher>, metrics: Arc<BridgeMetrics>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                dispatcher,
                metrics,
                session_seq: AtomicU64::new(0),
            }),
        }
    }

    /// Build the full pipeline and spawn the relay worker on the current
    /// runtime. The returned `RelayRuntime` is what drains the relay on
    /// shutdown.
    pub async fn build(mut cfg: BridgeConfig) -> Result<(Self, RelayRuntime)> {
        cfg.validate()?;

        let metrics = Arc::new(BridgeMetrics::default());

        // 1) Routing table, fatal on inconsistency.
        let table = Arc::new(DispatchTable::with_extra_ignored(&cfg.dispatch.extra_ignored_cmds)?);
        tracing::info!(tags = table.len(), "dispatch table built");

        // 2) Avatar cache. Paths handed downstream must be absolute.
        cfg.avatar.dir = absolutize(&cfg.avatar.dir)?;
        let client = http::build_client(cfg.avatar.request_timeout())?;
        let resolver = Arc::new(AvatarResolver::new(
            cfg.avatar.dir.clone(),
            &cfg.avatar.fallback_file,
            Arc::new(HttpProfileLookup::new(client.clone(), cfg.avatar.profile_url.clone())),
            Arc::new(HttpImageFetch::new(client)),
            Arc::clone(&metrics),
        ));
        resolver.prepare().await?;

        // 3) Relay worker. The connection is opened lazily on the first message.
        let sender = RelaySender::new(
            TcpConnector::new(cfg.relay.socket_addr()?),
            cfg.relay.connect_timeout(),
            cfg.relay.max_frame_bytes,
        );
        let relay = spawn_relay(cfg.relay.queue_capacity, sender, resolver, Arc::clone(&metrics));

        // 4) Dispatcher with the relay-backed handler.
        let dispatcher = Arc::new(Dispatcher::new(
            table,
            Arc::new(SeenUnknownCmds::new()),
            Arc::new(RelayHandler::new(relay.handle.clone())),
            Arc::clone(&metrics),
        ));

        Ok((Self::from_parts(cfg, dispatcher, metrics), relay))
    }

    pub fn cfg(&self) -> &BridgeConfig {
        &self.inner.cfg
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.inner.dispatcher)
    }

    pub fn metrics(&self) -> Arc<BridgeMetrics> {
        Arc::clone(&self.inner.metrics)
    }

    /// Process-unique id for a new ingest session.
    pub fn next_session_id(&self) -> String {
        let n = self.inner.session_seq.fetch_add(1, Ordering::Relaxed);
        format!("s{n}")
    }
}

fn absolutize(dir: &Path) -> Result<PathBuf> {
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }
    let cwd = std::env::current_dir()
        .map_err(|e| RelayError::BadConfig(format!("cannot resolve avatar.dir: {e}")))?;
    Ok(cwd.join(dir))
}
