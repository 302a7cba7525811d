use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::render::{anchor_for, RenderedPage};

/// Block placement handed to the host's scroll call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollAlign {
    Center,
}

/// What the host should do when a reply control is activated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyJump {
    pub anchor: String,
    pub align: ScrollAlign,
    pub smooth: bool,
    pub highlight: Duration,
}

/// `None` when the parent is not part of the displayed page; the control is
/// then a no-op.
pub fn locate_reply(page: &RenderedPage, parent_id: i64, highlight_ms: u64) -> Option<ReplyJump> {
    page.find_block(parent_id)?;
    Some(ReplyJump {
        anchor: anchor_for(parent_id),
        align: ScrollAlign::Center,
        smooth: true,
        highlight: Duration::from_millis(highlight_ms),
    })
}
