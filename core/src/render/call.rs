use serde::{Deserialize, Serialize};

use crate::models::{CallInfo, DiscardReason};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallTone {
    Positive,
    Negative,
    Neutral,
}

impl CallTone {
    pub fn css_class(&self) -> &'static str {
        match self {
            CallTone::Positive => "call-positive",
            CallTone::Negative => "call-negative",
            CallTone::Neutral => "call-neutral",
        }
    }
}

pub fn call_label(info: Option<&CallInfo>) -> (String, CallTone) {
    let reason = info.and_then(|i| i.discard_reason.as_ref());
    let duration = info.and_then(|i| i.duration_seconds);
    match (reason, duration) {
        (Some(DiscardReason::Hangup), Some(secs)) => (format!("Incoming ({} sec)", secs), CallTone::Positive),
        (Some(DiscardReason::Missed), _) => ("Cancelled".to_string(), CallTone::Negative),
        _ => ("Call".to_string(), CallTone::Neutral),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(reason: Option<DiscardReason>, duration: Option<u64>) -> CallInfo {
        CallInfo {
            discard_reason: reason,
            duration_seconds: duration,
        }
    }

    #[test]
    fn hangup_with_duration_is_incoming() {
        let (label, tone) = call_label(Some(&info(Some(DiscardReason::Hangup), Some(42))));
        assert_eq!(label, "Incoming (42 sec)");
        assert_eq!(tone, CallTone::Positive);
    }

    #[test]
    fn missed_is_cancelled() {
        let (label, tone) = call_label(Some(&info(Some(DiscardReason::Missed), Some(0))));
        assert_eq!(label, "Cancelled");
        assert_eq!(tone, CallTone::Negative);
    }

    #[test]
    fn everything_else_is_generic() {
        assert_eq!(call_label(None), ("Call".to_string(), CallTone::Neutral));
        assert_eq!(
            call_label(Some(&info(Some(DiscardReason::Hangup), None))).1,
            CallTone::Neutral
        );
        assert_eq!(
            call_label(Some(&info(Some(DiscardReason::Other("busy".to_string())), Some(3)))).0,
            "Call"
        );
    }
}
