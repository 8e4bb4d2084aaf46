use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Read(#[from] io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// 顶层配置, 所有字段都有默认值, 空文件也是合法配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub pump: PumpConfig,
    pub info: InfoConfig,
    pub data: DataConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PumpConfig {
    /// 后台消息循环线程名
    pub thread_name: String,
    /// 没捕获到 tokio 运行时时使用的串行分发线程名
    pub dispatch_thread_name: String,
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            thread_name: "wintab message loop".to_string(),
            dispatch_thread_name: "wintab dispatch".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfoConfig {
    /// 字符串查询 (设备名, 光标名) 的目的缓冲区字节数
    pub string_buffer_size: usize,
}

impl Default for InfoConfig {
    fn default() -> Self {
        Self {
            string_buffer_size: 256,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// 单次批量读取的包数上限
    pub max_packets: u32,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { max_packets: 128 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 没设置 `RUST_LOG` 时使用的 `EnvFilter` 指令
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl BridgeConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pump.thread_name.trim().is_empty() {
            return Err(ConfigError::Invalid("pump.thread_name is empty".into()));
        }
        if self.pump.dispatch_thread_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "pump.dispatch_thread_name is empty".into(),
            ));
        }
        // 至少要放得下一个宽字符和结尾的 NUL
        if self.info.string_buffer_size < 4 {
            return Err(ConfigError::Invalid(format!(
                "info.string_buffer_size must be at least 4, got {}",
                self.info.string_buffer_size
            )));
        }
        if self.data.max_packets == 0 {
            return Err(ConfigError::Invalid("data.max_packets must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = BridgeConfig::from_toml_str("").unwrap();
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.info.string_buffer_size, 256);
        assert_eq!(config.data.max_packets, 128);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = BridgeConfig::from_toml_str(
            r#"
            [pump]
            thread_name = "pen loop"

            [data]
            max_packets = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.pump.thread_name, "pen loop");
        assert_eq!(config.pump.dispatch_thread_name, "wintab dispatch");
        assert_eq!(config.data.max_packets, 8);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn rejects_zero_packet_count() {
        let err = BridgeConfig::from_toml_str("[data]\nmax_packets = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_tiny_string_buffer() {
        let err = BridgeConfig::from_toml_str("[info]\nstring_buffer_size = 2\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = BridgeConfig::from_toml_str("[pump\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nfilter = \"wintab_bridge=debug\"").unwrap();

        let config = BridgeConfig::load(file.path()).unwrap();
        assert_eq!(config.logging.filter, "wintab_bridge=debug");
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = BridgeConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read(_)));
    }
}
