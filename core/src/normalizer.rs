use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::models::{
    CallInfo, Chat, DiscardReason, Media, Message, MessageKind, ParticipantId, Reaction, SpanStyle, TextContent,
    TextSpan,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfIdentity {
    pub participant_id: Option<ParticipantId>,
    pub display_name: String,
}

#[derive(Debug, Clone)]
pub struct NormalizedExport {
    pub chat: Chat,
    pub self_identity: SelfIdentity,
}

pub fn normalize_export(root: &Value, default_name: &str) -> Result<NormalizedExport, CoreError> {
    let chat_obj = select_chat(root).ok_or(CoreError::NoMessagesFound)?;

    let display_name = non_empty_str(chat_obj.get("name"))
        .or_else(|| non_empty_str(root.get("name")))
        .unwrap_or(default_name)
        .to_string();

    let messages: Vec<Message> = chat_obj
        .get("messages")
        .and_then(Value::as_array)
        .map(|raw| raw.iter().map(normalize_message).collect())
        .unwrap_or_default();

    let participant_id = chat_obj
        .get("user")
        .and_then(|user| user.get("id"))
        .filter(|id| is_truthy(id))
        .and_then(participant_id)
        .or_else(|| messages.first().and_then(|m| m.author_id.clone()));

    Ok(NormalizedExport {
        chat: Chat {
            display_name: display_name.clone(),
            messages,
        },
        self_identity: SelfIdentity {
            participant_id,
            display_name,
        },
    })
}

fn select_chat(root: &Value) -> Option<&Value> {
    if root.get("messages").map(Value::is_array).unwrap_or(false) {
        return Some(root);
    }
    root.get("chats")
        .and_then(|chats| chats.get("list"))
        .and_then(Value::as_array)
        .and_then(|list| list.first())
}

pub fn normalize_message(raw: &Value) -> Message {
    let empty = Map::new();
    let obj = raw.as_object().unwrap_or(&empty);

    let action = non_empty_str(obj.get("action")).map(str::to_string);
    let kind = if action.as_deref() == Some("phone_call") {
        MessageKind::PhoneCall
    } else if obj.get("type").and_then(Value::as_str) == Some("service") {
        MessageKind::Service
    } else {
        MessageKind::Regular
    };

    let author_name = pick_str(obj, &["from", "actor"]).map(str::to_string);
    let author_id = pick_value(obj, &["from_id", "actor_id"]).and_then(participant_id);

    let call = if kind == MessageKind::PhoneCall {
        Some(CallInfo {
            discard_reason: obj.get("discard_reason").and_then(Value::as_str).map(|reason| match reason {
                "hangup" => DiscardReason::Hangup,
                "missed" => DiscardReason::Missed,
                other => DiscardReason::Other(other.to_string()),
            }),
            duration_seconds: obj.get("duration_seconds").and_then(non_negative_int),
        })
    } else {
        None
    };

    Message {
        id: obj.get("id").and_then(message_id),
        kind,
        author_name,
        author_id,
        timestamp: parse_timestamp(obj.get("date"), obj.get("date_unixtime")),
        edited: obj.get("edited").map(is_edited).unwrap_or(false),
        text: obj.get("text").and_then(parse_text),
        media: parse_media(obj),
        reactions: obj
            .get("reactions")
            .and_then(Value::as_array)
            .map(|list| list.iter().filter_map(parse_reaction).collect())
            .unwrap_or_default(),
        reply_to_id: obj.get("reply_to_message_id").and_then(message_id),
        action,
        call,
    }
}

pub fn parse_timestamp(date: Option<&Value>, unix: Option<&Value>) -> Option<NaiveDateTime> {
    date.and_then(Value::as_str)
        .and_then(parse_date_str)
        .or_else(|| unix.and_then(parse_unix))
}

fn parse_date_str(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn parse_unix(raw: &Value) -> Option<NaiveDateTime> {
    let secs = match raw {
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        Value::Number(n) => n.as_i64()?,
        _ => return None,
    };
    DateTime::from_timestamp(secs, 0).map(|dt| dt.with_timezone(&Local).naive_local())
}

fn parse_text(raw: &Value) -> Option<TextContent> {
    match raw {
        Value::String(s) if !s.is_empty() => Some(TextContent::Plain(s.clone())),
        Value::Array(parts) if !parts.is_empty() => {
            Some(TextContent::Spans(parts.iter().filter_map(parse_span).collect()))
        }
        _ => None,
    }
}

fn parse_span(raw: &Value) -> Option<TextSpan> {
    match raw {
        Value::String(s) => Some(TextSpan::Plain(s.clone())),
        Value::Object(part) => {
            let text = part.get("text").and_then(Value::as_str).unwrap_or("").to_string();
            let href = non_empty_str(part.get("href")).map(str::to_string);
            let style = match part.get("type").and_then(Value::as_str) {
                Some("bold") => SpanStyle::Bold,
                Some("italic") => SpanStyle::Italic,
                Some("strikethrough") => SpanStyle::Strikethrough,
                Some("link") | Some("text_link") => SpanStyle::Link {
                    href: href.unwrap_or_else(|| text.clone()),
                },
                _ => return Some(TextSpan::Plain(text)),
            };
            Some(TextSpan::Styled { style, text })
        }
        _ => None,
    }
}

fn parse_media(obj: &Map<String, Value>) -> Option<Media> {
    let file = non_empty_str(obj.get("file")).map(str::to_string);
    let media_type = obj.get("media_type").and_then(Value::as_str).unwrap_or("");
    if let Some(path) = file.clone() {
        match media_type {
            "sticker" => return Some(Media::Sticker { path }),
            "voice_message" => return Some(Media::Voice { path }),
            "video_message" => return Some(Media::Video { path }),
            _ => {}
        }
    }
    if let Some(path) = non_empty_str(obj.get("photo")) {
        return Some(Media::Photo { path: path.to_string() });
    }
    file.map(|path| Media::File {
        path,
        file_name: non_empty_str(obj.get("file_name")).map(str::to_string),
    })
}

fn parse_reaction(raw: &Value) -> Option<Reaction> {
    match raw.get("type").and_then(Value::as_str) {
        None | Some("emoji") => {}
        Some(_) => return None,
    }
    let emoji = non_empty_str(raw.get("emoji"))?;
    let count = raw.get("count")?.as_u64()?;
    Some(Reaction {
        emoji: emoji.to_string(),
        count,
    })
}

fn message_id(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn participant_id(raw: &Value) -> Option<ParticipantId> {
    match raw {
        Value::String(s) if !s.is_empty() => Some(ParticipantId(s.clone())),
        Value::Number(n) => Some(ParticipantId(n.to_string())),
        _ => None,
    }
}

fn non_negative_int(raw: &Value) -> Option<u64> {
    raw.as_u64()
        .or_else(|| raw.as_f64().filter(|v| *v >= 0.0).map(|v| v as u64))
}

fn is_edited(raw: &Value) -> bool {
    match raw {
        Value::Bool(b) => *b,
        Value::String(s) => !s.trim().is_empty(),
        _ => false,
    }
}

fn is_truthy(raw: &Value) -> bool {
    match raw {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn non_empty_str(raw: Option<&Value>) -> Option<&str> {
    raw.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn pick_str<'a>(obj: &'a Map<String, Value>, preferred: &[&str]) -> Option<&'a str> {
    preferred.iter().find_map(|key| non_empty_str(obj.get(*key)))
}

fn pick_value<'a>(obj: &'a Map<String, Value>, preferred: &[&str]) -> Option<&'a Value> {
    preferred
        .iter()
        .find_map(|key| obj.get(*key).filter(|v| !v.is_null()))
}
