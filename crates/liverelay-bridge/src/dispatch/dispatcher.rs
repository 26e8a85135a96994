use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use liverelay_core::error::{RelayError, Result};
use liverelay_core::protocol::event::{canonical_cmd, RawEvent};
use liverelay_core::protocol::models::{
    adapt, DanmakuMessage, EventKind, GiftMessage, GuardBuyMessage, HeartbeatMessage,
    SuperChatDeleteMessage, SuperChatMessage, TypedMessage,
};

use crate::context::RoomCtx;
use crate::dispatch::table::{DispatchTable, Route};
use crate::dispatch::unknown::SeenUnknownCmds;
use crate::obs::BridgeMetrics;

/// Per-kind callbacks. Every method defaults to a no-op so implementors only
/// override the kinds they care about.
///
/// Callbacks run inline on the ingest path; anything slow must be handed off
/// rather than awaited.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn on_heartbeat(&self, _ctx: &RoomCtx, _msg: HeartbeatMessage) -> Result<()> {
        Ok(())
    }

    async fn on_danmaku(&self, _ctx: &RoomCtx, _msg: DanmakuMessage) -> Result<()> {
        Ok(())
    }

    async fn on_gift(&self, _ctx: &RoomCtx, _msg: GiftMessage) -> Result<()> {
        Ok(())
    }

    async fn on_guard_buy(&self, _ctx: &RoomCtx, _msg: GuardBuyMessage) -> Result<()> {
        Ok(())
    }

    async fn on_super_chat(&self, _ctx: &RoomCtx, _msg: SuperChatMessage) -> Result<()> {
        Ok(())
    }

    async fn on_super_chat_delete(&self, _ctx: &RoomCtx, _msg: SuperChatDeleteMessage) -> Result<()> {
        Ok(())
    }
}

/// Result of dispatching one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Adapted and delivered to the handler.
    Handled(EventKind),
    /// Tag is on the ignore list.
    Ignored,
    /// Tag is not in the table. `reported` is true for the one dispatch that
    /// logged it.
    Unknown { reported: bool },
    /// Payload did not fit the model for its tag.
    Malformed(EventKind),
    /// The handler returned an error.
    Failed(EventKind),
}

impl DispatchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchOutcome::Handled(_) => "handled",
            DispatchOutcome::Ignored => "ignored",
            DispatchOutcome::Unknown { .. } => "unknown",
            DispatchOutcome::Malformed(_) => "malformed",
            DispatchOutcome::Failed(_) => "failed",
        }
    }

    fn kind_label(&self) -> &'static str {
        match self {
            DispatchOutcome::Handled(k) | DispatchOutcome::Malformed(k) | DispatchOutcome::Failed(k) => {
                k.as_str()
            }
            DispatchOutcome::Ignored => "ignored",
            DispatchOutcome::Unknown { .. } => "unknown",
        }
    }
}

/// Routes raw records to the event handler through the dispatch table.
pub struct Dispatcher {
    table: Arc<DispatchTable>,
    unknown: Arc<SeenUnknownCmds>,
    handler: Arc<dyn EventHandler>,
    metrics: Arc<BridgeMetrics>,
}

impl Dispatcher {
    pub fn new(
        table: Arc<DispatchTable>,
        unknown: Arc<SeenUnknownCmds>,
        handler: Arc<dyn EventHandler>,
        metrics: Arc<BridgeMetrics>,
    ) -> Self {
        Self {
            table,
            unknown,
            handler,
            metrics,
        }
    }

    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    /// Dispatch one record. Never fails: every problem is local to the record
    /// and reported through logs and the returned outcome.
    pub async fn dispatch(&self, ctx: &RoomCtx, raw: &RawEvent) -> DispatchOutcome {
        let cmd = canonical_cmd(raw.cmd());

        let outcome = match self.table.lookup(cmd) {
            None => {
                let reported = self.unknown.first_sight(cmd);
                if reported {
                    warn!(room_id = ctx.room_id(), cmd = %cmd, raw = %raw, "unknown cmd");
                }
                DispatchOutcome::Unknown { reported }
            }
            Some(Route::Ignore) => DispatchOutcome::Ignored,
            Some(Route::Handle(kind)) => match adapt(kind, raw) {
                Ok(msg) => match self.deliver(ctx, msg).await {
                    Ok(()) => DispatchOutcome::Handled(kind),
                    // Queue drops are already counted per message; keep them out of warn.
                    Err(e @ RelayError::RelayUnavailable(_)) => {
                        debug!(room_id = ctx.room_id(), cmd = %cmd, error = %e, "relay unavailable, message dropped");
                        DispatchOutcome::Failed(kind)
                    }
                    Err(e) => {
                        warn!(room_id = ctx.room_id(), cmd = %cmd, code = e.code().as_str(), error = %e, "event handler failed");
                        DispatchOutcome::Failed(kind)
                    }
                },
                Err(e) => {
                    warn!(room_id = ctx.room_id(), cmd = %cmd, error = %e, "dropping malformed event");
                    debug!(room_id = ctx.room_id(), raw = %raw, "malformed event body");
                    DispatchOutcome::Malformed(kind)
                }
            },
        };

        self.metrics
            .events
            .inc(&[("kind", outcome.kind_label()), ("outcome", outcome.as_str())]);
        outcome
    }

    async fn deliver(&self, ctx: &RoomCtx, msg: TypedMessage) -> Result<()> {
        let h = &self.handler;
        match msg {
            TypedMessage::Heartbeat(m) => h.on_heartbeat(ctx, m).await,
            TypedMessage::Danmaku(m) => h.on_danmaku(ctx, m).await,
            TypedMessage::Gift(m) => h.on_gift(ctx, m).await,
            TypedMessage::GuardBuy(m) => h.on_guard_buy(ctx, m).await,
            TypedMessage::SuperChat(m) => h.on_super_chat(ctx, m).await,
            TypedMessage::SuperChatDelete(m) => h.on_super_chat_delete(ctx, m).await,
        }
    }
}
