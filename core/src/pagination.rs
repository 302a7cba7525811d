use serde::{Deserialize, Serialize};

use crate::models::Message;

pub fn compute_total_pages(count: usize, capacity: usize) -> usize {
    let capacity = capacity.max(1);
    count.div_ceil(capacity).max(1)
}

/// Half-open range `[start, end)` of the page, clamped to `count`.
pub fn page_bounds(count: usize, page: usize, capacity: usize) -> (usize, usize) {
    let capacity = capacity.max(1);
    let page = page.min(compute_total_pages(count, capacity) - 1);
    let start = page.saturating_mul(capacity).min(count);
    let end = start.saturating_add(capacity).min(count);
    (start, end)
}

pub fn page_slice(messages: &[Message], page: usize, capacity: usize) -> &[Message] {
    let (start, end) = page_bounds(messages.len(), page, capacity);
    &messages[start..end]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    pub current_page: usize,
    pub total_pages: usize,
}

impl PaginationState {
    pub fn new(count: usize, capacity: usize) -> Self {
        Self {
            current_page: 0,
            total_pages: compute_total_pages(count, capacity),
        }
    }

    pub fn advance(self, delta: i64) -> Self {
        let last = self.total_pages.saturating_sub(1) as i64;
        let target = (self.current_page as i64).saturating_add(delta).clamp(0, last);
        Self {
            current_page: target as usize,
            ..self
        }
    }

    pub fn go_to(self, page: usize) -> Self {
        Self {
            current_page: page.min(self.total_pages.saturating_sub(1)),
            ..self
        }
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 0
    }

    pub fn has_next(&self) -> bool {
        self.current_page + 1 < self.total_pages
    }
}
