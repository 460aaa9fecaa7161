//! SocketCAN CAN 适配器实现
//!
//! ## 限制
//!
//! - **仅限 Linux 平台**：SocketCAN 是 Linux 内核特性
//! - **接口配置**：波特率等配置由系统工具（`ip link`）完成，不在应用层设置
//! - **权限要求**：可能需要 `dialout` 组权限或 `sudo`

use crate::{CanAdapter, CanError, PiperFrame};
use socketcan::{BlockingCan, CanFrame, CanSocket, EmbeddedFrame, Socket, StandardId};
use tracing::{debug, trace};

/// SocketCAN 适配器
///
/// 构造时只记录接口名，`open()` 时才真正打开 socket，
/// 这样网关可以在 `connect_port` 阶段报告打开失败。
///
/// ```no_run
/// use piper_bridge_can::{CanAdapter, PiperFrame, SocketCanAdapter};
///
/// let mut adapter = SocketCanAdapter::new("can1");
/// adapter.open().unwrap();
/// adapter.send(PiperFrame::new_standard(0x151, &[0x01, 0x01, 5, 0x00])).unwrap();
/// ```
#[derive(Debug)]
pub struct SocketCanAdapter {
    interface: String,
    socket: Option<CanSocket>,
}

impl SocketCanAdapter {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            socket: None,
        }
    }

    /// 接口名称
    pub fn interface(&self) -> &str {
        &self.interface
    }
}

impl CanAdapter for SocketCanAdapter {
    fn open(&mut self) -> Result<(), CanError> {
        if self.socket.is_some() {
            return Ok(());
        }

        let socket = CanSocket::open(&self.interface).map_err(|e| {
            CanError::Device(format!(
                "Failed to open CAN interface '{}': {}. Make sure it exists and is UP:\n  sudo ip link set up {}",
                self.interface, e, self.interface
            ))
        })?;

        debug!("SocketCAN interface '{}' opened", self.interface);
        self.socket = Some(socket);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.socket.is_some()
    }

    fn send(&mut self, frame: PiperFrame) -> Result<(), CanError> {
        let socket = self.socket.as_mut().ok_or(CanError::NotStarted)?;

        // 1. 转换 PiperFrame -> CanFrame（只发送标准帧）
        let can_frame = u16::try_from(frame.id)
            .ok()
            .and_then(StandardId::new)
            .and_then(|id| CanFrame::new(id, frame.data_slice()))
            .ok_or(CanError::InvalidFrame { id: frame.id })?;

        // 2. 发送（Fire-and-Forget）
        socket.transmit(&can_frame).map_err(|e| {
            CanError::Io(std::io::Error::other(format!(
                "SocketCAN transmit error on '{}': {}",
                self.interface, e
            )))
        })?;

        trace!("Sent CAN frame: ID=0x{:X}, len={}", frame.id, frame.len);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_before_open() {
        let mut adapter = SocketCanAdapter::new("vcan-missing");
        assert!(!adapter.is_open());
        assert_eq!(adapter.interface(), "vcan-missing");
        let result = adapter.send(PiperFrame::new_standard(0x151, &[0; 8]));
        assert!(matches!(result, Err(CanError::NotStarted)));
    }

    #[test]
    fn test_open_missing_interface_fails() {
        let mut adapter = SocketCanAdapter::new("nocan9");
        let err = adapter.open().unwrap_err();
        assert!(matches!(err, CanError::Device(_)));
        assert!(!adapter.is_open());
    }
}
