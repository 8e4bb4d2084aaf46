use std::collections::HashSet;

use parking_lot::RwLock;
use tracing::debug;

/// 需要转投的原生消息号集合
///
/// 锁只在查询或插入的那一下持有, 不会跨过转发调用.
#[derive(Debug, Default)]
pub struct NotificationRegistry {
    watched: RwLock<HashSet<u32>>,
}

impl NotificationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `id` 之前没登记过时返回 `true`
    pub fn watch(&self, id: u32) -> bool {
        let inserted = self.watched.write().insert(id);
        if inserted {
            debug!(id, "watching native message");
        }
        inserted
    }

    pub fn is_watched(&self, id: u32) -> bool {
        self.watched.read().contains(&id)
    }

    pub fn len(&self) -> usize {
        self.watched.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
