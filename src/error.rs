use std::io;

use thiserror::Error;

use crate::config::ConfigError;

/// 桥接层的错误类型
///
/// 尺寸不匹配 **不是** 错误, 见 [`crate::foreign::read_as`]
#[derive(Error, Debug)]
pub enum BridgeError {
    /// 拿不到驱动用的内存
    #[error("failed to allocate {size} bytes of foreign memory")]
    Allocation { size: usize },

    /// 读取请求本身不合法
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// 必须有值的查询驱动什么都没给
    #[error("driver returned no data for category {category}, index {index}")]
    NoData { category: u32, index: u32 },

    /// 消息循环线程没起来
    #[error("failed to spawn message loop thread: {0}")]
    PumpSpawn(#[source] io::Error),

    /// 消息循环线程建不出接收端点
    #[error("failed to create message endpoint: {0}")]
    Endpoint(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = BridgeError> = std::result::Result<T, E>;
