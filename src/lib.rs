/// 数位板事件对外分发: 把消息转投到订阅方的执行上下文
pub mod event_dispatcher;

/// 驱动调用约定与全局信息/数据包查询
pub mod tablet_driver;

/// 原生消息循环与消息号登记
pub mod event_router;

/// 驱动记录布局与消息模型
pub mod event_model;

/// 驱动内存的分配, 释放与按布局读出
pub mod foreign;

pub mod config;
pub mod error;
pub mod logging;

pub use config::BridgeConfig;
pub use error::{BridgeError, Result};
pub use event_dispatcher::{DispatchContext, SubscriptionId};
pub use event_model::{EndpointHandle, MessageReceived, NativeMessage, WintabMessage};
pub use event_router::{MessageEvents, endpoint, on_message_received, post_message, watch_message};
pub use foreign::{ForeignRegion, Record};

// 两条数据路径:
// 1. 查询: 分配一块够大的 `ForeignRegion` -> 驱动往里写 -> `foreign::read_as`/`read_array` 读出 -> drop 释放
//    尺寸对不上就拿到全零值, 上层把全零当成 "没有数据", 这个行为不要改成报错
// 2. 通知: 驱动往 `endpoint()` 发消息 -> 消息循环线程查登记表 -> 命中的交给 `event_dispatcher`
//    回调永远不在消息循环线程上跑, 所以订阅者慢了也不会卡住驱动

// 消息循环是进程级的, 起来之后就不会停, 进程退出时跟着一起没了
// (`MessageEvents::start` 单独起的循环例外, drop 时关掉端点, 线程自己退出)
// 分发上下文在第一次初始化时捕获: 调用方在 tokio 里就用它的运行时, 否则单独开一个分发线程
