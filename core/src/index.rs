use std::collections::HashMap;

use crate::models::Message;

/// id -> position in the chat's message list. Later duplicates win.
#[derive(Debug, Clone, Default)]
pub struct MessageIndex {
    positions: HashMap<i64, usize>,
}

impl MessageIndex {
    pub fn build(messages: &[Message]) -> Self {
        let mut positions = HashMap::with_capacity(messages.len());
        for (pos, msg) in messages.iter().enumerate() {
            if let Some(id) = msg.id {
                positions.insert(id, pos);
            }
        }
        Self { positions }
    }

    pub fn get<'a>(&self, messages: &'a [Message], id: i64) -> Option<&'a Message> {
        self.positions.get(&id).and_then(|pos| messages.get(*pos))
    }

    pub fn position(&self, id: i64) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
