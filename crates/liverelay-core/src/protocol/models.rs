//! Typed live-room messages and their conversions from raw payloads.
//!
//! Conversions are pure: no I/O, no logging. A missing required key or a
//! value of the wrong shape yields `RelayError::MalformedPayload` for that
//! one event. Keys beyond the ones modelled here are ignored.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{RelayError, Result};
use crate::protocol::event::{json_kind, RawEvent};

/// Event kinds the pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Heartbeat,
    Danmaku,
    Gift,
    GuardBuy,
    SuperChat,
    SuperChatDelete,
}

impl EventKind {
    /// Short label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Heartbeat => "heartbeat",
            EventKind::Danmaku => "danmaku",
            EventKind::Gift => "gift",
            EventKind::GuardBuy => "guard_buy",
            EventKind::SuperChat => "super_chat",
            EventKind::SuperChatDelete => "super_chat_delete",
        }
    }
}

/// Closed set of typed messages.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedMessage {
    Heartbeat(HeartbeatMessage),
    Danmaku(DanmakuMessage),
    Gift(GiftMessage),
    GuardBuy(GuardBuyMessage),
    SuperChat(SuperChatMessage),
    SuperChatDelete(SuperChatDeleteMessage),
}

impl TypedMessage {
    pub fn kind(&self) -> EventKind {
        match self {
            TypedMessage::Heartbeat(_) => EventKind::Heartbeat,
            TypedMessage::Danmaku(_) => EventKind::Danmaku,
            TypedMessage::Gift(_) => EventKind::Gift,
            TypedMessage::GuardBuy(_) => EventKind::GuardBuy,
            TypedMessage::SuperChat(_) => EventKind::SuperChat,
            TypedMessage::SuperChatDelete(_) => EventKind::SuperChatDelete,
        }
    }
}

/// Build the typed message for an already-classified record.
pub fn adapt(kind: EventKind, raw: &RawEvent) -> Result<TypedMessage> {
    let msg = match kind {
        EventKind::Heartbeat => TypedMessage::Heartbeat(from_data(raw)?),
        EventKind::Danmaku => TypedMessage::Danmaku(DanmakuMessage::from_info(raw.info()?)?),
        EventKind::Gift => TypedMessage::Gift(from_data(raw)?),
        EventKind::GuardBuy => TypedMessage::GuardBuy(from_data(raw)?),
        EventKind::SuperChat => TypedMessage::SuperChat(from_data(raw)?),
        EventKind::SuperChatDelete => TypedMessage::SuperChatDelete(from_data(raw)?),
    };
    Ok(msg)
}

fn from_data<'a, T: Deserialize<'a>>(raw: &'a RawEvent) -> Result<T> {
    T::deserialize(raw.data()?)
        .map_err(|e| RelayError::malformed(format!("{}: {e}", raw.cmd())))
}

/// Room popularity heartbeat.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HeartbeatMessage {
    pub popularity: i64,
}

/// Chat message.
#[derive(Debug, Clone, PartialEq)]
pub struct DanmakuMessage {
    pub uid: i64,
    pub username: String,
    pub text: String,
}

impl DanmakuMessage {
    /// Convert the positional `info` array of a chat event.
    ///
    /// `info[1]` is the text and `info[2]` starts with `[uid, uname]`.
    pub fn from_info(info: &Value) -> Result<Self> {
        let info = info.as_array().ok_or_else(|| {
            RelayError::malformed(format!("info must be an array, got {}", json_kind(info)))
        })?;

        let text = str_at(info, 1, "info[1]")?.to_string();
        let user = array_at(info, 2, "info[2]")?;
        let uid = int_at(user, 0, "info[2][0]")?;
        let username = str_at(user, 1, "info[2][1]")?.to_string();

        Ok(Self {
            uid,
            username,
            text,
        })
    }
}

fn array_at<'a>(arr: &'a [Value], idx: usize, what: &str) -> Result<&'a [Value]> {
    match arr.get(idx) {
        Some(Value::Array(a)) => Ok(a),
        Some(other) => Err(RelayError::malformed(format!(
            "{what} must be an array, got {}",
            json_kind(other)
        ))),
        None => Err(RelayError::malformed(format!("{what} missing"))),
    }
}

fn str_at<'a>(arr: &'a [Value], idx: usize, what: &str) -> Result<&'a str> {
    match arr.get(idx) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(RelayError::malformed(format!(
            "{what} must be a string, got {}",
            json_kind(other)
        ))),
        None => Err(RelayError::malformed(format!("{what} missing"))),
    }
}

fn int_at(arr: &[Value], idx: usize, what: &str) -> Result<i64> {
    match arr.get(idx) {
        Some(v) => v.as_i64().ok_or_else(|| {
            RelayError::malformed(format!("{what} must be an integer, got {}", json_kind(v)))
        }),
        None => Err(RelayError::malformed(format!("{what} missing"))),
    }
}

/// Gift sent in the room.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GiftMessage {
    #[serde(rename = "uname")]
    pub username: String,
    #[serde(rename = "giftName")]
    pub gift_name: String,
    #[serde(rename = "num")]
    pub count: i64,
    /// `"gold"` or `"silver"`.
    pub coin_type: String,
    pub total_coin: i64,
}

/// Paid membership purchase.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GuardBuyMessage {
    pub username: String,
    pub gift_name: String,
}

/// Highlighted paid chat message.
#[derive(Debug, Clone, PartialEq)]
pub struct SuperChatMessage {
    pub uid: i64,
    pub username: String,
    pub text: String,
    pub price: f64,
}

#[derive(Deserialize)]
struct SuperChatWire {
    uid: i64,
    price: f64,
    message: String,
    user_info: SuperChatUser,
}

#[derive(Deserialize)]
struct SuperChatUser {
    uname: String,
}

impl<'de> Deserialize<'de> for SuperChatMessage {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let w = SuperChatWire::deserialize(d)?;
        Ok(Self {
            uid: w.uid,
            username: w.user_info.uname,
            text: w.message,
            price: w.price,
        })
    }
}

/// Removal of previously shown super chats.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SuperChatDeleteMessage {
    pub ids: Vec<i64>,
}
