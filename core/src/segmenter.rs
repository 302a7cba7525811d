use chrono::NaiveDate;

use crate::models::Message;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment<'a> {
    DaySeparator(NaiveDate),
    Message(&'a Message),
}

/// Interleave a separator before each message whose calendar day differs from
/// the last dated message seen. Undated messages neither emit nor reset.
pub fn segment_by_day(messages: &[Message]) -> Vec<Segment<'_>> {
    let mut out = Vec::with_capacity(messages.len() + 8);
    let mut last_day: Option<NaiveDate> = None;
    for msg in messages {
        if let Some(day) = msg.timestamp.map(|ts| ts.date()) {
            if last_day != Some(day) {
                out.push(Segment::DaySeparator(day));
                last_day = Some(day);
            }
        }
        out.push(Segment::Message(msg));
    }
    out
}
