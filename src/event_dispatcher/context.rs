use std::{fmt, thread};

use tokio::{runtime::Handle, sync::mpsc};
use tracing::{debug, warn};

use crate::error::{BridgeError, Result};

pub type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    /// 在捕获到的 tokio 运行时上由一个 drain task 执行
    Runtime,
    /// 在专用的分发线程上执行
    Thread,
}

/// 串行执行器, 任务按投递顺序执行
///
/// 投递不阻塞, 也不会就地执行任务, 所以消息循环线程上不会跑订阅者代码.
#[derive(Clone)]
pub struct DispatchContext {
    queue: mpsc::UnboundedSender<Job>,
    kind: ContextKind,
}

impl DispatchContext {
    /// 捕获调用方所在的执行上下文: 有 tokio 运行时就用它, 否则新开一个分发线程
    pub fn current(thread_name: &str) -> Result<Self> {
        match Handle::try_current() {
            Ok(handle) => Ok(Self::from_handle(&handle)),
            Err(_) => Self::dedicated(thread_name),
        }
    }

    /// 单个 drain task 保证顺序, 即使是多线程运行时
    pub fn from_handle(handle: &Handle) -> Self {
        let (queue, mut jobs) = mpsc::unbounded_channel::<Job>();
        handle.spawn(async move {
            while let Some(job) = jobs.recv().await {
                job();
            }
            debug!("dispatch queue closed");
        });
        Self {
            queue,
            kind: ContextKind::Runtime,
        }
    }

    pub fn dedicated(thread_name: &str) -> Result<Self> {
        let (queue, mut jobs) = mpsc::unbounded_channel::<Job>();
        thread::Builder::new()
            .name(thread_name.to_string())
            .spawn(move || {
                while let Some(job) = jobs.blocking_recv() {
                    job();
                }
                debug!("dispatch queue closed");
            })
            .map_err(BridgeError::PumpSpawn)?;
        Ok(Self {
            queue,
            kind: ContextKind::Thread,
        })
    }

    pub fn kind(&self) -> ContextKind {
        self.kind
    }

    /// 排入 `job`. 执行器已经没了 (运行时已关闭) 时返回 `false`, 任务被丢弃
    pub fn post(&self, job: Job) -> bool {
        if self.queue.send(job).is_err() {
            warn!(kind = ?self.kind, "dispatch context is gone, dropping job");
            return false;
        }
        true
    }
}

impl fmt::Debug for DispatchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchContext")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
