//! # Piper Bridge Protocol
//!
//! Unity 位姿桥接协议与 Piper 控制帧定义（无 IO、无硬件依赖）
//!
//! ## 模块
//!
//! - `wire`: Unity 文本行协议（`get\n` 请求 / JSON 行响应）编解码
//! - `pose`: 解码后的位姿更新记录
//! - `translate`: 位姿更新 → 执行器命令（单位推断、取整、夹爪钳位）
//! - `command`: 执行器命令值类型
//! - `ids`: CAN ID 常量定义
//! - `control`: 控制帧构建
//! - `frame`: CAN 2.0 帧抽象
//!
//! ## 字节序
//!
//! Piper CAN 协议使用 Motorola (MSB) 高位在前（大端字节序）。

pub mod command;
pub mod control;
pub mod frame;
pub mod ids;
pub mod pose;
pub mod translate;
pub mod wire;

// 重新导出常用类型
pub use command::*;
pub use control::*;
pub use frame::PiperFrame;
pub use ids::*;
pub use pose::PoseUpdate;
pub use translate::{CommandTranslator, TranslateError, TranslatorConfig, UnitGuess};
pub use wire::{Decoded, NoUpdateReason, POLL_REQUEST, decode_line, encode_poll_request};

/// i32 转大端字节序
pub fn i32_to_bytes_be(value: i32) -> [u8; 4] {
    value.to_be_bytes()
}

/// i16 转大端字节序
pub fn i16_to_bytes_be(value: i16) -> [u8; 2] {
    value.to_be_bytes()
}

/// 大端字节序转 i32
pub fn bytes_to_i32_be(bytes: [u8; 4]) -> i32 {
    i32::from_be_bytes(bytes)
}
