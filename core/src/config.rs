use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const DEFAULT_PAGE_CAPACITY: usize = 200;
pub const DEFAULT_HIGHLIGHT_MS: u64 = 1500;
pub const DEFAULT_SNIPPET_CHARS: usize = 40;
pub const DEFAULT_CHAT_NAME: &str = "Telegram Chat";

/// How a message is attributed to the exporting user or to the other side.
///
/// `ParticipantId` compares the author id against the self id captured at
/// load time (`user.id`, else the first message's `from_id`). `DisplayName`
/// treats the author whose name equals the chat's display name as the other
/// participant and everyone else as self.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfPolicy {
    ParticipantId,
    DisplayName,
}

impl SelfPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "participant_id" | "id" => Some(SelfPolicy::ParticipantId),
            "display_name" | "name" => Some(SelfPolicy::DisplayName),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    pub page_capacity: usize,
    pub highlight_ms: u64,
    pub snippet_chars: usize,
    pub self_policy: SelfPolicy,
    pub default_chat_name: String,
    pub timestamp_format: String,
    pub day_format: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            page_capacity: DEFAULT_PAGE_CAPACITY,
            highlight_ms: DEFAULT_HIGHLIGHT_MS,
            snippet_chars: DEFAULT_SNIPPET_CHARS,
            self_policy: SelfPolicy::ParticipantId,
            default_chat_name: DEFAULT_CHAT_NAME.to_string(),
            timestamp_format: "%d.%m.%Y, %H:%M".to_string(),
            day_format: "%d.%m.%Y".to_string(),
            log_dir: None,
        }
    }
}

impl ViewerConfig {
    /// Load overrides from `EXPORT_VIEW_*` environment variables. Values that
    /// fail to parse keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            page_capacity: env_parse("EXPORT_VIEW_PAGE_SIZE").unwrap_or(defaults.page_capacity),
            highlight_ms: env_parse("EXPORT_VIEW_HIGHLIGHT_MS").unwrap_or(defaults.highlight_ms),
            snippet_chars: env_parse("EXPORT_VIEW_SNIPPET_CHARS").unwrap_or(defaults.snippet_chars),
            self_policy: env::var("EXPORT_VIEW_SELF_POLICY")
                .ok()
                .and_then(|v| SelfPolicy::parse(&v))
                .unwrap_or(defaults.self_policy),
            default_chat_name: env::var("EXPORT_VIEW_DEFAULT_NAME").unwrap_or(defaults.default_chat_name),
            timestamp_format: env::var("EXPORT_VIEW_TIMESTAMP_FORMAT").unwrap_or(defaults.timestamp_format),
            day_format: env::var("EXPORT_VIEW_DAY_FORMAT").unwrap_or(defaults.day_format),
            log_dir: env::var("EXPORT_VIEW_LOG_DIR").ok().map(PathBuf::from),
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.page_capacity == 0 {
            return Err(CoreError::InvalidArgument("page capacity must be positive".to_string()));
        }
        if self.snippet_chars == 0 {
            return Err(CoreError::InvalidArgument("snippet length must be positive".to_string()));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = ViewerConfig::default();
        assert_eq!(config.page_capacity, 200);
        assert_eq!(config.snippet_chars, 40);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_capacity_rejected() {
        let config = ViewerConfig {
            page_capacity: 0,
            ..ViewerConfig::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::InvalidArgument(_))));
    }

    #[test]
    fn policy_parse_accepts_aliases() {
        assert_eq!(SelfPolicy::parse("name"), Some(SelfPolicy::DisplayName));
        assert_eq!(SelfPolicy::parse(" Participant_Id "), Some(SelfPolicy::ParticipantId));
        assert_eq!(SelfPolicy::parse("both"), None);
    }
}
