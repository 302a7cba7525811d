use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::{SelfPolicy, ViewerConfig};
use crate::index::MessageIndex;
use crate::models::{Message, MessageKind};
use crate::normalizer::SelfIdentity;
use crate::pagination::PaginationState;
use crate::segmenter::{segment_by_day, Segment};

#[path = "render/call.rs"]
mod call;
#[path = "render/markup.rs"]
mod markup;

pub use call::{call_label, CallTone};
pub use markup::{escape_html, format_day, format_timestamp};

pub const REPLY_PREFIX: &str = "Reply to";
pub const REPLY_PLACEHOLDER: &str = "(original message)";
const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Mine,
    Theirs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum BlockVariant {
    Message { side: Side },
    Service,
    Call { side: Side, tone: CallTone },
}

impl BlockVariant {
    pub fn css_class(&self) -> String {
        match self {
            BlockVariant::Message { side: Side::Mine } => "msg-self".to_string(),
            BlockVariant::Message { side: Side::Theirs } => "msg-other".to_string(),
            BlockVariant::Service => "msg-service".to_string(),
            BlockVariant::Call { side, tone } => {
                let side = match side {
                    Side::Mine => "msg-self",
                    Side::Theirs => "msg-other",
                };
                format!("msg-call {} {}", side, tone.css_class())
            }
        }
    }
}

/// Structured reply pointer; the host wires the click to navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyReference {
    pub parent_id: i64,
    pub resolved: bool,
    pub author: Option<String>,
    pub snippet: Option<String>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedBlock {
    pub message_id: Option<i64>,
    pub anchor: Option<String>,
    pub variant: BlockVariant,
    pub reply: Option<ReplyReference>,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "item", rename_all = "snake_case")]
pub enum PageItem {
    DaySeparator { date: NaiveDate, label: String },
    Block(RenderedBlock),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedPage {
    pub chat_name: String,
    pub pagination: PaginationState,
    pub items: Vec<PageItem>,
}

impl RenderedPage {
    pub fn blocks(&self) -> impl Iterator<Item = &RenderedBlock> {
        self.items.iter().filter_map(|item| match item {
            PageItem::Block(block) => Some(block),
            PageItem::DaySeparator { .. } => None,
        })
    }

    pub fn find_block(&self, message_id: i64) -> Option<&RenderedBlock> {
        self.blocks().find(|b| b.message_id == Some(message_id))
    }
}

/// Read-only view over one load used while rendering.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub messages: &'a [Message],
    pub index: &'a MessageIndex,
    pub identity: &'a SelfIdentity,
    pub config: &'a ViewerConfig,
}

pub fn anchor_for(message_id: i64) -> String {
    format!("msg-{}", message_id)
}

pub fn is_self(identity: &SelfIdentity, policy: SelfPolicy, msg: &Message) -> bool {
    match policy {
        SelfPolicy::ParticipantId => match (&identity.participant_id, &msg.author_id) {
            (Some(own), Some(author)) => own == author,
            _ => false,
        },
        // the name-matching author is the other side
        SelfPolicy::DisplayName => msg.author_name.as_deref() != Some(identity.display_name.as_str()),
    }
}

pub fn classify(msg: &Message, identity: &SelfIdentity, policy: SelfPolicy) -> BlockVariant {
    let side = if is_self(identity, policy, msg) {
        Side::Mine
    } else {
        Side::Theirs
    };
    match msg.kind {
        MessageKind::PhoneCall => BlockVariant::Call {
            side,
            tone: call_label(msg.call.as_ref()).1,
        },
        MessageKind::Service => BlockVariant::Service,
        MessageKind::Regular => BlockVariant::Message { side },
    }
}

/// Flattened, trimmed text clipped to `max_chars` code points.
pub fn short_text(msg: &Message, max_chars: usize) -> String {
    let flat = msg.text.as_ref().map(|t| t.flatten()).unwrap_or_default();
    let trimmed = flat.trim();
    if trimmed.chars().count() > max_chars {
        let mut clipped: String = trimmed.chars().take(max_chars).collect();
        clipped.push_str(ELLIPSIS);
        clipped
    } else {
        trimmed.to_string()
    }
}

pub fn reply_reference(parent_id: i64, ctx: &RenderContext<'_>) -> ReplyReference {
    match ctx.index.get(ctx.messages, parent_id) {
        Some(parent) => {
            let author = parent.author_name.clone().unwrap_or_default();
            let snippet = short_text(parent, ctx.config.snippet_chars);
            ReplyReference {
                parent_id,
                resolved: true,
                label: format!("{} {}: \u{201c}{}\u{201d}", REPLY_PREFIX, author, snippet),
                author: Some(author),
                snippet: Some(snippet),
            }
        }
        None => ReplyReference {
            parent_id,
            resolved: false,
            author: None,
            snippet: None,
            label: format!("{} {}", REPLY_PREFIX, REPLY_PLACEHOLDER),
        },
    }
}

pub fn render_message(msg: &Message, ctx: &RenderContext<'_>) -> RenderedBlock {
    let variant = classify(msg, ctx.identity, ctx.config.self_policy);
    let anchor = msg.id.map(anchor_for);
    let header = render_header(msg, ctx.config);

    let (body, footer, reply) = match variant {
        BlockVariant::Call { .. } => {
            let (label, _) = call_label(msg.call.as_ref());
            let body = format!(
                r#"<div class="message-body"><p class="call-label">{}</p></div>"#,
                escape_html(&label)
            );
            (body, String::new(), None)
        }
        BlockVariant::Service => {
            let reply = msg.reply_to_id.map(|id| reply_reference(id, ctx));
            (render_service_body(msg), render_footer(msg, reply.as_ref()), reply)
        }
        BlockVariant::Message { .. } => {
            let reply = msg.reply_to_id.map(|id| reply_reference(id, ctx));
            (render_body(msg), render_footer(msg, reply.as_ref()), reply)
        }
    };

    let id_attr = anchor
        .as_ref()
        .map(|a| format!(r#" id="{}""#, a))
        .unwrap_or_default();
    let html = format!(
        r#"<div{} class="{}">{}{}{}</div>"#,
        id_attr,
        variant.css_class(),
        header,
        body,
        footer
    );

    RenderedBlock {
        message_id: msg.id,
        anchor,
        variant,
        reply,
        html,
    }
}

pub fn render_page(page: &[Message], pagination: PaginationState, chat_name: &str, ctx: &RenderContext<'_>) -> RenderedPage {
    let items = segment_by_day(page)
        .into_iter()
        .map(|segment| match segment {
            Segment::DaySeparator(date) => PageItem::DaySeparator {
                label: format_day(&date, &ctx.config.day_format),
                date,
            },
            Segment::Message(msg) => PageItem::Block(render_message(msg, ctx)),
        })
        .collect();
    RenderedPage {
        chat_name: chat_name.to_string(),
        pagination,
        items,
    }
}

fn render_header(msg: &Message, config: &ViewerConfig) -> String {
    let author = msg.author_name.as_deref().unwrap_or("");
    let date = msg
        .timestamp
        .map(|ts| format_timestamp(&ts, &config.timestamp_format))
        .unwrap_or_default();
    if author.is_empty() && date.is_empty() {
        return String::new();
    }
    let mut out = String::from(r#"<div class="message-header">"#);
    if !author.is_empty() {
        out.push_str(&format!(r#"<span class="author">{}</span>"#, escape_html(author)));
    }
    if !date.is_empty() {
        out.push_str(&format!(r#"<span class="date">{}</span>"#, escape_html(&date)));
    }
    if msg.edited {
        out.push_str(r#"<span class="edited">(edited)</span>"#);
    }
    out.push_str("</div>");
    out
}

fn render_body(msg: &Message) -> String {
    let mut out = String::from(r#"<div class="message-body">"#);
    if let Some(text) = &msg.text {
        out.push_str(&markup::render_text(text));
    }
    if let Some(media) = &msg.media {
        out.push_str(&markup::render_media(media));
    }
    out.push_str("</div>");
    out
}

fn render_service_body(msg: &Message) -> String {
    let mut out = String::from(r#"<div class="message-body">"#);
    match (&msg.text, &msg.action) {
        (Some(text), _) => out.push_str(&markup::render_text(text)),
        (None, Some(action)) => out.push_str(&format!(
            r#"<p class="service-action">{}</p>"#,
            escape_html(&action.replace('_', " "))
        )),
        (None, None) => {}
    }
    if let Some(media) = &msg.media {
        out.push_str(&markup::render_media(media));
    }
    out.push_str("</div>");
    out
}

fn render_footer(msg: &Message, reply: Option<&ReplyReference>) -> String {
    if msg.reactions.is_empty() && reply.is_none() {
        return String::new();
    }
    let mut out = String::from(r#"<div class="message-footer">"#);
    for reaction in &msg.reactions {
        out.push_str(&markup::render_reaction(reaction));
    }
    if let Some(reply) = reply {
        let class = if reply.resolved {
            "reply-btn"
        } else {
            "reply-btn reply-missing"
        };
        out.push_str(&format!(
            r#"<button type="button" class="{}" data-reply-to="{}">{}</button>"#,
            class,
            reply.parent_id,
            escape_html(&reply.label)
        ));
    }
    out.push_str("</div>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CallInfo, DiscardReason, Media, ParticipantId, Reaction, TextContent};

    fn identity(id: Option<&str>, name: &str) -> SelfIdentity {
        SelfIdentity {
            participant_id: id.map(|v| ParticipantId(v.to_string())),
            display_name: name.to_string(),
        }
    }

    fn text_msg(id: i64, author: &str, author_id: &str, text: &str) -> Message {
        Message {
            id: Some(id),
            author_name: Some(author.to_string()),
            author_id: Some(ParticipantId(author_id.to_string())),
            text: Some(TextContent::Plain(text.to_string())),
            ..Message::default()
        }
    }

    #[test]
    fn participant_policy_matches_ids() {
        let ident = identity(Some("user1"), "Bob");
        let mine = text_msg(1, "Me", "user1", "hi");
        let theirs = text_msg(2, "Bob", "user2", "yo");
        assert!(is_self(&ident, SelfPolicy::ParticipantId, &mine));
        assert!(!is_self(&ident, SelfPolicy::ParticipantId, &theirs));
        let nobody = identity(None, "Bob");
        assert!(!is_self(&nobody, SelfPolicy::ParticipantId, &mine));
    }

    #[test]
    fn display_name_policy_treats_chat_name_as_other() {
        let ident = identity(None, "Bob");
        let mine = text_msg(1, "Me", "user1", "hi");
        let theirs = text_msg(2, "Bob", "user2", "yo");
        assert!(is_self(&ident, SelfPolicy::DisplayName, &mine));
        assert!(!is_self(&ident, SelfPolicy::DisplayName, &theirs));
    }

    #[test]
    fn call_and_service_take_priority() {
        let ident = identity(Some("user1"), "Bob");
        let call = Message {
            id: Some(3),
            kind: MessageKind::PhoneCall,
            author_id: Some(ParticipantId("user1".to_string())),
            call: Some(CallInfo {
                discard_reason: Some(DiscardReason::Missed),
                duration_seconds: None,
            }),
            ..Message::default()
        };
        assert_eq!(
            classify(&call, &ident, SelfPolicy::ParticipantId),
            BlockVariant::Call {
                side: Side::Mine,
                tone: CallTone::Negative
            }
        );
        let service = Message {
            kind: MessageKind::Service,
            author_id: Some(ParticipantId("user1".to_string())),
            ..Message::default()
        };
        assert_eq!(classify(&service, &ident, SelfPolicy::ParticipantId), BlockVariant::Service);
    }

    #[test]
    fn snippet_truncates_on_code_points() {
        let exact = "a".repeat(40);
        let over = "b".repeat(41);
        let msg_exact = text_msg(1, "A", "u", &exact);
        let msg_over = text_msg(2, "A", "u", &over);
        assert_eq!(short_text(&msg_exact, 40), exact);
        assert_eq!(short_text(&msg_over, 40), format!("{}...", "b".repeat(40)));

        let cyrillic = "я".repeat(41);
        let clipped = short_text(&text_msg(3, "A", "u", &cyrillic), 40);
        assert_eq!(clipped.chars().count(), 43);
    }

    #[test]
    fn snippet_trims_whitespace() {
        let msg = text_msg(1, "A", "u", "   hello  ");
        assert_eq!(short_text(&msg, 40), "hello");
    }

    #[test]
    fn message_block_markup() {
        let messages = vec![
            text_msg(1, "Bob", "user2", "first <b>"),
            Message {
                reply_to_id: Some(1),
                reactions: vec![Reaction {
                    emoji: "👍".to_string(),
                    count: 3,
                }],
                ..text_msg(2, "Me", "user1", "second")
            },
            Message {
                reply_to_id: Some(99),
                ..text_msg(3, "Me", "user1", "third")
            },
        ];
        let index = MessageIndex::build(&messages);
        let ident = identity(Some("user1"), "Bob");
        let config = ViewerConfig::default();
        let ctx = RenderContext {
            messages: &messages,
            index: &index,
            identity: &ident,
            config: &config,
        };

        let first = render_message(&messages[0], &ctx);
        assert!(first.html.starts_with(r#"<div id="msg-1" class="msg-other">"#));
        assert!(first.html.contains("first &lt;b&gt;"));
        assert!(first.reply.is_none());

        let second = render_message(&messages[1], &ctx);
        assert_eq!(second.variant, BlockVariant::Message { side: Side::Mine });
        let reply = second.reply.clone().expect("reply");
        assert!(reply.resolved);
        assert_eq!(reply.label, "Reply to Bob: \u{201c}first <b>\u{201d}");
        assert!(second.html.contains(r#"data-reply-to="1""#));
        assert!(second.html.contains("first &lt;b&gt;"));
        assert!(second.html.contains("👍 3"));

        let third = render_message(&messages[2], &ctx);
        let dangling = third.reply.expect("reply");
        assert!(!dangling.resolved);
        assert_eq!(dangling.label, "Reply to (original message)");
        assert!(third.html.contains("reply-missing"));
    }

    #[test]
    fn call_block_is_distinct() {
        let messages = vec![Message {
            id: Some(7),
            kind: MessageKind::PhoneCall,
            author_name: Some("Bob".to_string()),
            author_id: Some(ParticipantId("user2".to_string())),
            call: Some(CallInfo {
                discard_reason: Some(DiscardReason::Hangup),
                duration_seconds: Some(12),
            }),
            reply_to_id: Some(1),
            ..Message::default()
        }];
        let index = MessageIndex::build(&messages);
        let ident = identity(Some("user1"), "Bob");
        let config = ViewerConfig::default();
        let ctx = RenderContext {
            messages: &messages,
            index: &index,
            identity: &ident,
            config: &config,
        };
        let block = render_message(&messages[0], &ctx);
        assert!(block.html.contains("msg-call msg-other call-positive"));
        assert!(block.html.contains("Incoming (12 sec)"));
        assert!(block.reply.is_none());
    }

    #[test]
    fn service_without_text_shows_action() {
        let messages = vec![Message {
            id: Some(4),
            kind: MessageKind::Service,
            author_name: Some("Bob".to_string()),
            action: Some("pin_message".to_string()),
            ..Message::default()
        }];
        let index = MessageIndex::build(&messages);
        let ident = identity(None, "Bob");
        let config = ViewerConfig::default();
        let ctx = RenderContext {
            messages: &messages,
            index: &index,
            identity: &ident,
            config: &config,
        };
        let block = render_message(&messages[0], &ctx);
        assert!(block.html.contains(r#"class="msg-service""#));
        assert!(block.html.contains("pin message"));
    }

    #[test]
    fn service_keeps_media_reactions_and_reply() {
        let messages = vec![
            text_msg(1, "Bob", "user2", "new photo soon"),
            Message {
                id: Some(2),
                kind: MessageKind::Service,
                author_name: Some("Bob".to_string()),
                action: Some("edit_group_photo".to_string()),
                media: Some(Media::Photo {
                    path: "photos/photo_1.jpg".to_string(),
                }),
                reactions: vec![Reaction {
                    emoji: "🔥".to_string(),
                    count: 2,
                }],
                reply_to_id: Some(1),
                ..Message::default()
            },
        ];
        let index = MessageIndex::build(&messages);
        let ident = identity(Some("user1"), "Bob");
        let config = ViewerConfig::default();
        let ctx = RenderContext {
            messages: &messages,
            index: &index,
            identity: &ident,
            config: &config,
        };
        let block = render_message(&messages[1], &ctx);
        assert_eq!(block.variant, BlockVariant::Service);
        assert!(block.html.contains("edit group photo"));
        assert!(block.html.contains(r#"src="photos/photo_1.jpg""#));
        assert!(block.html.contains("🔥 2"));
        assert!(block.html.contains(r#"data-reply-to="1""#));
        assert!(block.reply.expect("reply").resolved);
    }

    #[test]
    fn missing_id_has_no_anchor() {
        let messages = vec![Message::default()];
        let index = MessageIndex::build(&messages);
        let ident = identity(None, "Bob");
        let config = ViewerConfig::default();
        let ctx = RenderContext {
            messages: &messages,
            index: &index,
            identity: &ident,
            config: &config,
        };
        let block = render_message(&messages[0], &ctx);
        assert!(block.anchor.is_none());
        assert!(block.html.starts_with(r#"<div class="msg-other">"#));
    }
}
