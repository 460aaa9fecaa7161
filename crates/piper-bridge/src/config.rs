//! 桥接进程配置
//!
//! TOML 文件，三个分区：
//!
//! ```toml
//! [unity]
//! host = "192.168.68.51"
//! port = 9101
//! on_no_update = "reconnect"   # 或 "skip"
//!
//! [arm]
//! interface = "can1"
//! speed_percent = 5
//!
//! [translate]
//! radian_threshold = 3.2
//! gripper_effort = 1000
//! ```
//!
//! 缺省字段取默认值，未知字段报错。

use crate::error::ConfigError;
use piper_bridge_protocol::{ENABLE_MASK_ALL_JOINTS, TranslatorConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Unity 默认端口
pub const DEFAULT_UNITY_PORT: u16 = 9101;

/// 内容层面的 NoUpdate（坏 JSON、seq ≤ 0 等）如何处理
///
/// 连接结束（零长度读取）总是结束会话，不受该策略影响。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoUpdatePolicy {
    /// 断开并在退避后重连
    #[default]
    Reconnect,
    /// 保持连接，继续下一次轮询
    Skip,
}

/// `[unity]` 分区：位姿源连接参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UnityConfig {
    pub host: String,
    pub port: u16,
    pub connect_timeout_ms: u64,
    /// 单行响应的读超时
    pub read_timeout_ms: u64,
    /// 读操作分片（停止信号的检查粒度）
    pub read_slice_ms: u64,
    /// 轮询间隔
    pub poll_interval_ms: u64,
    /// 连接失败或断开后的固定退避
    pub reconnect_backoff_ms: u64,
    pub max_line_bytes: usize,
    pub on_no_update: NoUpdatePolicy,
}

impl Default for UnityConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_UNITY_PORT,
            connect_timeout_ms: 5_000,
            read_timeout_ms: 5_000,
            read_slice_ms: 100,
            poll_interval_ms: 50,
            reconnect_backoff_ms: 2_000,
            max_line_bytes: 64 * 1024,
            on_no_update: NoUpdatePolicy::Reconnect,
        }
    }
}

impl UnityConfig {
    /// `host:port`（用于日志和地址解析）
    pub fn endpoint(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// 读分片，不超过读超时
    pub fn read_slice(&self) -> Duration {
        Duration::from_millis(self.read_slice_ms.min(self.read_timeout_ms))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn reconnect_backoff(&self) -> Duration {
        Duration::from_millis(self.reconnect_backoff_ms)
    }
}

/// `[arm]` 分区：机械臂接口与就绪序列参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArmConfig {
    /// SocketCAN 接口名
    pub interface: String,
    /// MOVE J 速度百分比（1..=100）
    pub speed_percent: u8,
    /// 使能掩码（0x07 = 全部关节）
    pub enable_mask: u8,
    /// 示教/轨迹/夹爪命令之间的间隔
    pub step_delay_ms: u64,
    /// 使能两阶段之间的等待
    pub enable_settle_ms: u64,
    /// 设置运动模式后的等待
    pub mode_settle_ms: u64,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            interface: "can1".to_string(),
            speed_percent: 5,
            enable_mask: ENABLE_MASK_ALL_JOINTS,
            step_delay_ms: 50,
            enable_settle_ms: 200,
            mode_settle_ms: 100,
        }
    }
}

/// 完整配置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    pub unity: UnityConfig,
    pub arm: ArmConfig,
    pub translate: TranslatorConfig,
}

impl BridgeConfig {
    /// 默认配置文件路径：`<config_dir>/piper/unity_bridge.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("piper").join("unity_bridge.toml"))
    }

    /// 从 TOML 文本解析并校验
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: BridgeConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 读取指定文件
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&content, path)
    }

    /// 显式路径必须存在；未指定时默认路径存在才读取，否则用默认配置
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// 序列化为 TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 校验取值范围
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unity = &self.unity;
        if unity.host.trim().is_empty() {
            return Err(ConfigError::Invalid("unity.host must not be empty".into()));
        }
        if unity.port == 0 {
            return Err(ConfigError::Invalid("unity.port must not be 0".into()));
        }
        for (name, value) in [
            ("unity.connect_timeout_ms", unity.connect_timeout_ms),
            ("unity.read_timeout_ms", unity.read_timeout_ms),
            ("unity.read_slice_ms", unity.read_slice_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{} must be > 0", name)));
            }
        }
        if unity.max_line_bytes == 0 {
            return Err(ConfigError::Invalid("unity.max_line_bytes must be > 0".into()));
        }

        if self.arm.interface.trim().is_empty() {
            return Err(ConfigError::Invalid("arm.interface must not be empty".into()));
        }
        if !(1..=100).contains(&self.arm.speed_percent) {
            return Err(ConfigError::Invalid(format!(
                "arm.speed_percent must be within 1..=100, got {}",
                self.arm.speed_percent
            )));
        }
        if self.arm.enable_mask == 0 {
            return Err(ConfigError::Invalid("arm.enable_mask must not be 0".into()));
        }

        let translate = &self.translate;
        for (name, value) in [
            ("translate.radian_threshold", translate.radian_threshold),
            ("translate.radian_scale", translate.radian_scale),
            ("translate.degree_scale", translate.degree_scale),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        if translate.gripper_effort < 0 {
            return Err(ConfigError::Invalid(format!(
                "translate.gripper_effort must not be negative, got {}",
                translate.gripper_effort
            )));
        }
        Ok(())
    }
}
