use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::ViewerConfig;
use crate::decode::{decode_bytes, DecodeResponse};
use crate::diagnostics;
use crate::error::CoreError;
use crate::index::MessageIndex;
use crate::models::{Chat, Message};
use crate::navigation::{locate_reply, ReplyJump};
use crate::normalizer::{normalize_export, SelfIdentity};
use crate::pagination::{page_slice, PaginationState};
use crate::render::{render_page, RenderContext, RenderedPage};

/// Everything derived from one successful load.
#[derive(Debug, Clone)]
pub struct LoadedChat {
    pub load_id: String,
    pub source_hash: String,
    pub chat: Chat,
    pub index: MessageIndex,
    pub self_identity: SelfIdentity,
    pub pagination: PaginationState,
}

impl LoadedChat {
    pub fn resolve(&self, message_id: i64) -> Option<&Message> {
        self.index.get(&self.chat.messages, message_id)
    }
}

pub struct Session {
    config: ViewerConfig,
    loaded: Option<LoadedChat>,
}

pub fn source_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

impl Session {
    pub fn new(config: ViewerConfig) -> Result<Self, CoreError> {
        config.validate()?;
        Ok(Self { config, loaded: None })
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn loaded(&self) -> Option<&LoadedChat> {
        self.loaded.as_ref()
    }

    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<&LoadedChat, CoreError> {
        let hash = source_hash(bytes);
        self.apply_decoded(hash, decode_bytes(bytes))
    }

    /// Replace the loaded chat with the decoded export. On any failure the
    /// previous chat stays as it was.
    pub fn apply_decoded(&mut self, source_hash: String, response: DecodeResponse) -> Result<&LoadedChat, CoreError> {
        let loaded = match self.build(source_hash, response) {
            Ok(loaded) => loaded,
            Err(err) => {
                diagnostics::maybe_log(self.config.log_dir.as_deref(), "load_error", &err.to_string());
                return Err(err);
            }
        };
        diagnostics::maybe_log(
            self.config.log_dir.as_deref(),
            "load_ok",
            &format!(
                "load={} messages={} pages={} source={}",
                loaded.load_id,
                loaded.chat.messages.len(),
                loaded.pagination.total_pages,
                &loaded.source_hash[..loaded.source_hash.len().min(12)]
            ),
        );
        Ok(&*self.loaded.insert(loaded))
    }

    fn build(&self, source_hash: String, response: DecodeResponse) -> Result<LoadedChat, CoreError> {
        let root = response.into_result()?;
        let export = normalize_export(&root, &self.config.default_chat_name)?;
        let index = MessageIndex::build(&export.chat.messages);
        let pagination = PaginationState::new(export.chat.messages.len(), self.config.page_capacity);
        Ok(LoadedChat {
            load_id: Uuid::new_v4().to_string(),
            source_hash,
            chat: export.chat,
            index,
            self_identity: export.self_identity,
            pagination,
        })
    }

    pub fn pagination(&self) -> Option<PaginationState> {
        self.loaded.as_ref().map(|l| l.pagination)
    }

    pub fn next_page(&mut self) -> Result<PaginationState, CoreError> {
        self.navigate(|state| state.advance(1))
    }

    pub fn previous_page(&mut self) -> Result<PaginationState, CoreError> {
        self.navigate(|state| state.advance(-1))
    }

    pub fn go_to_page(&mut self, page: usize) -> Result<PaginationState, CoreError> {
        self.navigate(|state| state.go_to(page))
    }

    fn navigate<F>(&mut self, step: F) -> Result<PaginationState, CoreError>
    where
        F: FnOnce(PaginationState) -> PaginationState,
    {
        let loaded = self.loaded.as_mut().ok_or_else(not_loaded)?;
        loaded.pagination = step(loaded.pagination);
        Ok(loaded.pagination)
    }

    pub fn current_page_messages(&self) -> Result<&[Message], CoreError> {
        let loaded = self.loaded.as_ref().ok_or_else(not_loaded)?;
        Ok(page_slice(
            &loaded.chat.messages,
            loaded.pagination.current_page,
            self.config.page_capacity,
        ))
    }

    pub fn render_current_page(&self) -> Result<RenderedPage, CoreError> {
        let loaded = self.loaded.as_ref().ok_or_else(not_loaded)?;
        let ctx = RenderContext {
            messages: &loaded.chat.messages,
            index: &loaded.index,
            identity: &loaded.self_identity,
            config: &self.config,
        };
        let page = self.current_page_messages()?;
        Ok(render_page(page, loaded.pagination, &loaded.chat.display_name, &ctx))
    }

    pub fn locate_reply(&self, page: &RenderedPage, parent_id: i64) -> Option<ReplyJump> {
        locate_reply(page, parent_id, self.config.highlight_ms)
    }
}

fn not_loaded() -> CoreError {
    CoreError::InvalidArgument("no chat loaded".to_string())
}
