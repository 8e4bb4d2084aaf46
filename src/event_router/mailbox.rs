//! 跨平台的消息端点: 每个端点是一个进程内信箱, 句柄是进程内唯一的整数

use std::{
    collections::HashMap,
    sync::{
        LazyLock,
        atomic::{AtomicUsize, Ordering},
    },
};

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::debug;

use super::Route;
use crate::{
    error::{BridgeError, Result},
    event_model::{EndpointHandle, NativeMessage},
};

static NEXT_HANDLE: AtomicUsize = AtomicUsize::new(1);
static MAILBOXES: LazyLock<RwLock<HashMap<usize, mpsc::UnboundedSender<NativeMessage>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

pub(super) struct Endpoint {
    handle: EndpointHandle,
    inbox: mpsc::UnboundedReceiver<NativeMessage>,
}

/// 必须在之后跑循环的那个线程上调用
pub(super) fn create_endpoint() -> Result<Endpoint> {
    let handle = EndpointHandle(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed));
    let (sender, inbox) = mpsc::unbounded_channel();
    MAILBOXES.write().insert(handle.0, sender);
    debug!(?handle, "mailbox endpoint created");
    Ok(Endpoint { handle, inbox })
}

impl Endpoint {
    pub(super) fn handle(&self) -> EndpointHandle {
        self.handle
    }

    /// 阻塞到端点被 [`close_endpoint`] 关闭为止
    pub(super) fn run(mut self, route: Route) {
        while let Some(message) = self.inbox.blocking_recv() {
            route(message);
        }
        debug!(handle = ?self.handle, "mailbox loop finished");
    }
}

/// 从表里摘掉发送端, 已排队的消息处理完之后 `run` 返回
pub(super) fn close_endpoint(endpoint: EndpointHandle) {
    if MAILBOXES.write().remove(&endpoint.0).is_none() {
        debug!(?endpoint, "mailbox already closed");
    }
}

pub(super) fn post_message(endpoint: EndpointHandle, id: u32, wparam: usize, lparam: isize) -> Result<()> {
    let mailboxes = MAILBOXES.read();
    let sender = mailboxes
        .get(&endpoint.0)
        .ok_or(BridgeError::InvalidArgument("unknown message endpoint"))?;
    sender
        .send(NativeMessage {
            endpoint,
            id,
            wparam,
            lparam,
        })
        .map_err(|_| BridgeError::Endpoint(format!("endpoint {} is closed", endpoint.0)))
}
