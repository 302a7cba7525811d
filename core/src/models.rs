use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Regular,
    Service,
    PhoneCall,
}

/// Opaque participant identifier. Export ids show up as strings (`"user123"`)
/// or bare numbers; both are kept in their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantId(pub String);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TextContent {
    Plain(String),
    Spans(Vec<TextSpan>),
}

impl TextContent {
    pub fn flatten(&self) -> String {
        match self {
            TextContent::Plain(text) => text.clone(),
            TextContent::Spans(spans) => spans.iter().map(TextSpan::text).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSpan {
    Plain(String),
    Styled { style: SpanStyle, text: String },
}

impl TextSpan {
    pub fn text(&self) -> &str {
        match self {
            TextSpan::Plain(text) => text,
            TextSpan::Styled { text, .. } => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanStyle {
    Bold,
    Italic,
    Strikethrough,
    Link { href: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Media {
    Photo { path: String },
    Sticker { path: String },
    Voice { path: String },
    Video { path: String },
    File { path: String, file_name: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub emoji: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscardReason {
    Hangup,
    Missed,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallInfo {
    pub discard_reason: Option<DiscardReason>,
    pub duration_seconds: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Option<i64>,
    pub kind: MessageKind,
    pub author_name: Option<String>,
    pub author_id: Option<ParticipantId>,
    pub timestamp: Option<NaiveDateTime>,
    pub edited: bool,
    pub text: Option<TextContent>,
    pub media: Option<Media>,
    pub reactions: Vec<Reaction>,
    pub reply_to_id: Option<i64>,
    pub action: Option<String>,
    pub call: Option<CallInfo>,
}

impl Default for Message {
    fn default() -> Self {
        Self {
            id: None,
            kind: MessageKind::Regular,
            author_name: None,
            author_id: None,
            timestamp: None,
            edited: false,
            text: None,
            media: None,
            reactions: Vec::new(),
            reply_to_id: None,
            action: None,
            call: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub display_name: String,
    pub messages: Vec<Message>,
}
