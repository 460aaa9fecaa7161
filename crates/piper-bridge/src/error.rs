//! 桥接层错误类型定义

use piper_bridge_can::CanError;
use piper_bridge_protocol::NoUpdateReason;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// 停止信号已触发
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Stop requested")]
pub struct Stopped;

/// 执行器网关错误
#[derive(Error, Debug)]
pub enum GatewayError {
    /// CAN 适配层错误
    #[error("CAN error: {0}")]
    Can(#[from] CanError),

    /// 尚未调用 `connect_port`
    #[error("Arm port not connected")]
    NotConnected,
}

/// Unity 会话错误
///
/// 除 [`SessionError::Cancelled`] 外，所有变体都只会结束当前连接，
/// 由会话循环在退避后重连。
#[derive(Error, Debug)]
pub enum SessionError {
    /// 地址解析失败
    #[error("Failed to resolve {endpoint}: {source}")]
    Resolve {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    /// 连接失败（拒绝、超时等）
    #[error("Failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    /// 读写错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 读超时
    #[error("No response line within {0:?}")]
    ReadTimeout(Duration),

    /// 响应行超过长度上限
    #[error("Response line exceeds {limit} bytes")]
    LineTooLong { limit: usize },

    /// 对端关闭连接
    #[error("Connection closed by peer")]
    Closed,

    /// 本周期没有可用更新（按策略结束会话）
    #[error("No update: {0}")]
    NoUpdate(NoUpdateReason),

    /// 外部停止信号
    #[error("Cancelled")]
    Cancelled,
}

impl SessionError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SessionError::Cancelled)
    }
}

impl From<Stopped> for SessionError {
    fn from(_: Stopped) -> Self {
        SessionError::Cancelled
    }
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_from_can() {
        let err: GatewayError = CanError::NotStarted.into();
        assert!(matches!(err, GatewayError::Can(_)));
        assert!(err.to_string().contains("Device not started"));
    }

    #[test]
    fn test_stopped_maps_to_cancelled() {
        let err: SessionError = Stopped.into();
        assert!(err.is_cancelled());
        assert!(!SessionError::Closed.is_cancelled());
    }

    #[test]
    fn test_session_error_display() {
        let err = SessionError::LineTooLong { limit: 64 };
        assert_eq!(err.to_string(), "Response line exceeds 64 bytes");

        let err = SessionError::NoUpdate(NoUpdateReason::StaleSequence { seq: 0 });
        assert!(err.to_string().starts_with("No update"));
    }
}
