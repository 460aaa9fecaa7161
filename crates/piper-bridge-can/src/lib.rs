//! # Piper Bridge CAN Adapter Layer
//!
//! 桥接进程只向机械臂发送控制帧（fire-and-forget），因此适配层只需要
//! “打开”和“发送”两个操作。接口的波特率、UP/DOWN 状态由系统工具
//! （`ip link`）负责，不在应用层设置。

use thiserror::Error;

pub use piper_bridge_protocol::PiperFrame;

#[cfg(target_os = "linux")]
pub mod socketcan;

#[cfg(target_os = "linux")]
pub use socketcan::SocketCanAdapter;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockCanAdapter;

/// CAN 适配层统一错误类型
#[derive(Error, Debug)]
pub enum CanError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Device Error: {0}")]
    Device(String),
    #[error("Invalid frame ID 0x{id:X}")]
    InvalidFrame { id: u32 },
    #[error("Device not started")]
    NotStarted,
}

/// CAN 适配器
pub trait CanAdapter {
    /// 打开底层设备（重复调用应为无操作）
    fn open(&mut self) -> Result<(), CanError>;

    /// 是否已打开
    fn is_open(&self) -> bool;

    /// 发送帧（Fire-and-Forget）
    fn send(&mut self, frame: PiperFrame) -> Result<(), CanError>;
}

impl<A: CanAdapter + ?Sized> CanAdapter for Box<A> {
    fn open(&mut self) -> Result<(), CanError> {
        (**self).open()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn send(&mut self, frame: PiperFrame) -> Result<(), CanError> {
        (**self).send(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_error_display() {
        assert_eq!(CanError::NotStarted.to_string(), "Device not started");
        assert_eq!(
            CanError::InvalidFrame { id: 0x1FFF }.to_string(),
            "Invalid frame ID 0x1FFF"
        );
        assert!(
            CanError::Device("can1 is down".to_string())
                .to_string()
                .contains("can1 is down")
        );
    }

    #[test]
    fn test_boxed_adapter_forwards() {
        let mut adapter: Box<dyn CanAdapter> = Box::new(MockCanAdapter::new());
        assert!(!adapter.is_open());
        adapter.open().unwrap();
        assert!(adapter.is_open());
        adapter
            .send(PiperFrame::new_standard(0x151, &[1, 1, 5, 0]))
            .unwrap();
    }
}
