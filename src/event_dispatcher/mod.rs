//! 事件出口: 把消息循环线程上匹配到的消息, 转投到订阅方的执行上下文上
//!
//! 订阅者回调永远不会在消息循环线程上执行.

mod context;

pub use context::{ContextKind, DispatchContext, Job};

use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use parking_lot::RwLock;
use tracing::{error, trace};

use crate::event_model::{MessageReceived, NativeMessage};

pub type Handler = Arc<dyn Fn(&MessageReceived) + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// "收到消息" 回调的多播列表
#[derive(Default)]
pub struct Subscribers {
    next_id: AtomicU64,
    handlers: RwLock<Vec<(SubscriptionId, Handler)>>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&MessageReceived) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.write().push((id, Arc::new(handler)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        handlers.len() != before
    }

    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 按订阅顺序调用所有回调. panic 的回调记一条日志后跳过, 后面的照常执行
    pub fn publish(&self, event: &MessageReceived) {
        // 快照之后立即放锁, 回调里可以再订阅/退订
        let snapshot: Vec<(SubscriptionId, Handler)> = self.handlers.read().clone();
        for (id, handler) in snapshot {
            if panic::catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
                error!(
                    subscription = ?id,
                    message = event.message().id,
                    "message handler panicked"
                );
            }
        }
    }
}

/// 把原始消息转投到捕获的 [`DispatchContext`] 上
#[derive(Clone)]
pub struct EventDispatcher {
    context: DispatchContext,
    subscribers: Arc<Subscribers>,
}

impl EventDispatcher {
    pub fn new(context: DispatchContext, subscribers: Arc<Subscribers>) -> Self {
        Self {
            context,
            subscribers,
        }
    }

    pub fn context(&self) -> &DispatchContext {
        &self.context
    }

    pub fn subscribers(&self) -> &Arc<Subscribers> {
        &self.subscribers
    }

    /// 排进队列就返回, 不等回调执行
    pub fn redeliver(&self, message: NativeMessage) {
        trace!(id = message.id, "redelivering message");
        let subscribers = Arc::clone(&self.subscribers);
        self.context.post(Box::new(move || {
            subscribers.publish(&MessageReceived::new(message));
        }));
    }
}
