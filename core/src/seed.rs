use chrono::{Duration, NaiveDate};
use serde_json::{json, Value};

const SELF_ID: &str = "user1";
const PARTNER_ID: &str = "user2";
const PARTNER_NAME: &str = "Partner";

/// Telegram-shaped single-chat export for demos and tests.
pub fn demo_export(message_count: usize, messages_per_day: usize) -> Value {
    let per_day = messages_per_day.max(1) as i64;
    let base = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .unwrap_or_default();

    let mut messages = Vec::with_capacity(message_count);
    for idx in 0..message_count as i64 {
        let id = idx + 1;
        let ts = base + Duration::days(idx / per_day) + Duration::minutes(idx % per_day);
        let date = ts.format("%Y-%m-%dT%H:%M:%S").to_string();

        if id % 25 == 0 {
            let reason = if id % 50 == 0 { "missed" } else { "hangup" };
            messages.push(json!({
                "id": id,
                "type": "service",
                "date": date,
                "actor": PARTNER_NAME,
                "actor_id": PARTNER_ID,
                "action": "phone_call",
                "discard_reason": reason,
                "duration_seconds": 30 + id,
            }));
            continue;
        }

        let (from, from_id, text) = if idx % 2 == 0 {
            ("You", SELF_ID, format!("Demo message {}", id))
        } else {
            (PARTNER_NAME, PARTNER_ID, format!("Reply {}", id))
        };
        let mut msg = json!({
            "id": id,
            "type": "message",
            "date": date,
            "from": from,
            "from_id": from_id,
            "text": text,
        });
        if id % 10 == 0 {
            msg["reply_to_message_id"] = json!(id / 10);
        }
        if id % 4 == 0 {
            msg["reactions"] = json!([{"type": "emoji", "emoji": "👍", "count": 1 + id % 3}]);
        }
        messages.push(msg);
    }

    json!({
        "name": PARTNER_NAME,
        "type": "personal_chat",
        "id": 1,
        "user": {"id": SELF_ID},
        "messages": messages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_has_requested_count() {
        let export = demo_export(30, 10);
        let messages = export["messages"].as_array().expect("messages");
        assert_eq!(messages.len(), 30);
        assert_eq!(messages[24]["action"], "phone_call");
        assert_eq!(messages[9]["reply_to_message_id"], 1);
        assert_eq!(messages[10]["date"], "2024-01-02T09:00:00");
    }
}
