//! 数位板消息的内部路由
//!
//! 一个常驻后台线程跑原生消息循环, 对每条消息查一次 [`NotificationRegistry`],
//! 命中的交给 [`EventDispatcher`] 转投到订阅方的上下文. 进程级单例由
//! [`MessageEvents::global`] 惰性创建, 之后伴随整个进程, 不会被销毁或重建.
//! 用 [`MessageEvents::start`] 单独起的实例在 drop 时关闭端点, 循环线程随之退出.

mod registry;

#[cfg(not(windows))]
mod mailbox;
#[cfg(not(windows))]
use mailbox as backend;

#[cfg(windows)]
mod win32;
#[cfg(windows)]
use win32 as backend;

pub use registry::NotificationRegistry;

use std::{
    sync::{Arc, OnceLock, mpsc},
    thread::{self, ThreadId},
};

use parking_lot::Mutex;
use tracing::{debug, info, trace};

use crate::{
    config::PumpConfig,
    error::{BridgeError, Result},
    event_dispatcher::{DispatchContext, EventDispatcher, Subscribers, SubscriptionId},
    event_model::{EndpointHandle, MessageReceived, NativeMessage},
};

/// 端点收到的每条消息都会交给它
pub(crate) type Route = Box<dyn Fn(NativeMessage) + Send + 'static>;

static GLOBAL: OnceLock<MessageEvents> = OnceLock::new();
static GLOBAL_INIT: Mutex<()> = Mutex::new(());

/// 一个运行中的消息循环, 以及它查询的登记表和转投用的分发器
pub struct MessageEvents {
    endpoint: EndpointHandle,
    loop_thread: ThreadId,
    registry: Arc<NotificationRegistry>,
    dispatcher: EventDispatcher,
}

fn route(registry: &NotificationRegistry, dispatcher: &EventDispatcher, message: NativeMessage) {
    // is_watched 返回时读锁已经释放
    if registry.is_watched(message.id) {
        dispatcher.redeliver(message);
    } else {
        trace!(id = message.id, "message not watched");
    }
}

impl MessageEvents {
    /// 起一个消息循环线程, 阻塞到它的端点建好为止
    ///
    /// 命中的消息在 `context` 上转投. 线程或端点创建失败在这里返回, 循环不会重启.
    pub fn start(config: &PumpConfig, context: DispatchContext) -> Result<Self> {
        let registry = Arc::new(NotificationRegistry::new());
        let dispatcher = EventDispatcher::new(context, Arc::new(Subscribers::new()));

        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<EndpointHandle>>(1);
        let loop_registry = Arc::clone(&registry);
        let loop_dispatcher = dispatcher.clone();

        let join = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || {
                let endpoint = match backend::create_endpoint() {
                    Ok(endpoint) => endpoint,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(endpoint.handle()));
                endpoint.run(Box::new(move |message| {
                    route(&loop_registry, &loop_dispatcher, message)
                }));
            })
            .map_err(BridgeError::PumpSpawn)?;

        let endpoint = ready_rx.recv().map_err(|_| {
            BridgeError::Endpoint("message loop exited before reporting its endpoint".into())
        })??;

        info!(?endpoint, thread = %config.thread_name, "message loop running");
        Ok(Self {
            endpoint,
            loop_thread: join.thread().id(),
            registry,
            dispatcher,
        })
    }

    /// 进程级实例, 第一次使用时按默认配置启动
    pub fn global() -> Result<&'static Self> {
        Self::global_with(&PumpConfig::default())
    }

    /// 同 [`MessageEvents::global`], `config` 只对真正启动循环的那次调用有效
    ///
    /// 分发上下文从第一个调用方捕获: 它在 tokio 运行时里就用那个运行时, 否则单独开
    /// 一个分发线程. 启动失败时实例保持未设置, 之后的调用可以再试.
    pub fn global_with(config: &PumpConfig) -> Result<&'static Self> {
        if let Some(events) = GLOBAL.get() {
            return Ok(events);
        }
        let _guard = GLOBAL_INIT.lock();
        if let Some(events) = GLOBAL.get() {
            return Ok(events);
        }
        let context = DispatchContext::current(&config.dispatch_thread_name)?;
        let events = Self::start(config, context)?;
        Ok(GLOBAL.get_or_init(|| events))
    }

    pub fn endpoint(&self) -> EndpointHandle {
        self.endpoint
    }

    /// 跑原生循环的线程
    pub fn loop_thread(&self) -> ThreadId {
        self.loop_thread
    }

    pub fn context(&self) -> &DispatchContext {
        self.dispatcher.context()
    }

    pub fn registry(&self) -> &NotificationRegistry {
        &self.registry
    }

    /// 从现在起转投这个消息号, 重复调用无副作用
    pub fn watch(&self, id: u32) {
        self.registry.watch(id);
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&MessageReceived) + Send + Sync + 'static,
    {
        self.dispatcher.subscribers().subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.dispatcher.subscribers().unsubscribe(id)
    }

    /// 往本循环自己的端点投一条原生消息
    pub fn post(&self, id: u32, wparam: usize, lparam: isize) -> Result<()> {
        post_message(self.endpoint, id, wparam, lparam)
    }
}

impl Drop for MessageEvents {
    fn drop(&mut self) {
        backend::close_endpoint(self.endpoint);
        debug!(endpoint = ?self.endpoint, "message loop endpoint closed");
    }
}

/// 往 `endpoint` 投一条原生消息, 不等它被处理
pub fn post_message(endpoint: EndpointHandle, id: u32, wparam: usize, lparam: isize) -> Result<()> {
    backend::post_message(endpoint, id, wparam, lparam)
}

/// 在进程级循环上登记 `id`
pub fn watch_message(id: u32) -> Result<()> {
    MessageEvents::global()?.watch(id);
    Ok(())
}

/// 进程级循环的端点句柄, 交给驱动用
pub fn endpoint() -> Result<EndpointHandle> {
    Ok(MessageEvents::global()?.endpoint())
}

pub fn on_message_received<F>(handler: F) -> Result<SubscriptionId>
where
    F: Fn(&MessageReceived) + Send + Sync + 'static,
{
    Ok(MessageEvents::global()?.subscribe(handler))
}
