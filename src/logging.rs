//! `tracing` 订阅器初始化
//!
//! 优先使用 `RUST_LOG`, 否则退回到 [`LoggingConfig::filter`]

use tracing_subscriber::{EnvFilter, fmt, prelude::*, util::TryInitError};

use crate::config::LoggingConfig;

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// 安装全局 fmt 订阅器, 已经装过时返回错误
pub fn try_init(config: &LoggingConfig) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(build_filter(config))
        .with(fmt::layer().with_thread_names(true))
        .try_init()
}

/// 同 [`try_init`], 已经装过订阅器时保持原样, 不报错
pub fn init(config: &LoggingConfig) {
    if try_init(config).is_err() {
        tracing::debug!("global tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_directive_falls_back() {
        let config = LoggingConfig {
            filter: "[[[".to_string(),
        };
        // 不应 panic
        let _ = build_filter(&config);
    }

    #[test]
    fn second_init_is_harmless() {
        let config = LoggingConfig::default();
        init(&config);
        init(&config);
        assert!(try_init(&config).is_err());
    }
}
