use async_trait::async_trait;
use tracing::info;

use liverelay_core::error::Result;
use liverelay_core::protocol::models::{
    DanmakuMessage, GiftMessage, GuardBuyMessage, HeartbeatMessage, SuperChatDeleteMessage,
    SuperChatMessage,
};

use crate::context::RoomCtx;
use crate::dispatch::EventHandler;
use crate::relay::{RelayHandle, RelayJob};

/// Logs every typed event and forwards chat messages to the relay queue.
pub struct RelayHandler {
    relay: RelayHandle,
}

impl RelayHandler {
    pub fn new(relay: RelayHandle) -> Self {
        Self { relay }
    }
}

#[async_trait]
impl EventHandler for RelayHandler {
    async fn on_heartbeat(&self, ctx: &RoomCtx, msg: HeartbeatMessage) -> Result<()> {
        info!(room_id = ctx.room_id(), popularity = msg.popularity, "heartbeat");
        Ok(())
    }

    async fn on_danmaku(&self, ctx: &RoomCtx, msg: DanmakuMessage) -> Result<()> {
        info!(room_id = ctx.room_id(), uid = msg.uid, uname = %msg.username, text = %msg.text, "danmaku");
        self.relay.enqueue(RelayJob {
            room_id: ctx.room_id(),
            uid: msg.uid,
            uname: msg.username,
            msg: msg.text,
        })
    }

    async fn on_gift(&self, ctx: &RoomCtx, msg: GiftMessage) -> Result<()> {
        info!(
            room_id = ctx.room_id(),
            uname = %msg.username,
            gift = %msg.gift_name,
            count = msg.count,
            coin_type = %msg.coin_type,
            total_coin = msg.total_coin,
            "gift"
        );
        Ok(())
    }

    async fn on_guard_buy(&self, ctx: &RoomCtx, msg: GuardBuyMessage) -> Result<()> {
        info!(room_id = ctx.room_id(), uname = %msg.username, gift = %msg.gift_name, "guard purchase");
        Ok(())
    }

    async fn on_super_chat(&self, ctx: &RoomCtx, msg: SuperChatMessage) -> Result<()> {
        info!(
            room_id = ctx.room_id(),
            uid = msg.uid,
            uname = %msg.username,
            price = msg.price,
            text = %msg.text,
            "super chat"
        );
        Ok(())
    }

    async fn on_super_chat_delete(&self, ctx: &RoomCtx, msg: SuperChatDeleteMessage) -> Result<()> {
        info!(room_id = ctx.room_id(), ids = ?msg.ids, "super chat deleted");
        Ok(())
    }
}
