//! Raw event -> typed message vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use liverelay_core::protocol::event::{canonical_cmd, RawEvent};
use liverelay_core::protocol::models::{adapt, EventKind, TypedMessage};

use vector_loader::{load, EventVector};

fn kind(name: &str) -> EventKind {
    match name {
        "heartbeat" => EventKind::Heartbeat,
        "danmaku" => EventKind::Danmaku,
        "gift" => EventKind::Gift,
        "guard_buy" => EventKind::GuardBuy,
        "super_chat" => EventKind::SuperChat,
        "super_chat_delete" => EventKind::SuperChatDelete,
        other => panic!("unknown kind in vector: {other}"),
    }
}

#[test]
fn event_vectors() {
    let files = [
        "event_danmu_msg_v4.json",
        "event_send_gift.json",
        "event_super_chat.json",
        "event_gift_missing_num.json",
        "event_danmu_info_not_array.json",
    ];

    for f in files {
        let v: EventVector = load(f);
        let raw = RawEvent::from_value(v.event).unwrap();
        let k = kind(&v.kind);
        assert_eq!(k.as_str(), v.kind, "vector={}", v.description);

        let res = adapt(k, &raw);
        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.code().as_str(), err.code, "vector={}", v.description);
            continue;
        }

        let msg = res.expect("expected ok message");
        assert_eq!(msg.kind(), k, "vector={}", v.description);
        let ex = v.expect.expect("missing expect block");

        match msg {
            TypedMessage::Danmaku(m) => {
                assert_eq!(m.uid, ex["uid"].as_i64().unwrap(), "vector={}", v.description);
                assert_eq!(m.username, ex["username"].as_str().unwrap(), "vector={}", v.description);
                assert_eq!(m.text, ex["text"].as_str().unwrap(), "vector={}", v.description);
            }
            TypedMessage::Gift(g) => {
                assert_eq!(g.username, ex["username"].as_str().unwrap(), "vector={}", v.description);
                assert_eq!(g.gift_name, ex["gift_name"].as_str().unwrap(), "vector={}", v.description);
                assert_eq!(g.count, ex["count"].as_i64().unwrap(), "vector={}", v.description);
                assert_eq!(g.coin_type, ex["coin_type"].as_str().unwrap(), "vector={}", v.description);
                assert_eq!(g.total_coin, ex["total_coin"].as_i64().unwrap(), "vector={}", v.description);
            }
            TypedMessage::SuperChat(sc) => {
                assert_eq!(sc.uid, ex["uid"].as_i64().unwrap(), "vector={}", v.description);
                assert_eq!(sc.username, ex["username"].as_str().unwrap(), "vector={}", v.description);
                assert_eq!(sc.text, ex["text"].as_str().unwrap(), "vector={}", v.description);
                assert_eq!(sc.price, ex["price"].as_f64().unwrap(), "vector={}", v.description);
            }
            other => panic!("no assertions for {other:?}"),
        }
    }
}

#[test]
fn versioned_tags_share_canonical_form() {
    let v: EventVector = load("event_danmu_msg_v4.json");
    let raw = RawEvent::from_value(v.event).unwrap();
    assert_eq!(raw.cmd(), "DANMU_MSG:4:0:2:2:2:0");
    assert_eq!(canonical_cmd(raw.cmd()), canonical_cmd("DANMU_MSG"));
}
