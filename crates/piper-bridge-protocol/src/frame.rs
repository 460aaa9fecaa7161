//! CAN 2.0 标准帧抽象
//!
//! 协议层与 CAN 适配层之间的中间类型：协议层只构建 `PiperFrame`，
//! 具体发送由 `piper-bridge-can` 中的适配器完成。

/// CAN 2.0 标准帧
///
/// 固定 8 字节数据，`Copy`，无堆分配。本桥接只发送控制帧，
/// 因此只提供标准帧（11-bit ID）构造。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PiperFrame {
    /// CAN ID（标准帧）
    pub id: u32,

    /// 帧数据（固定 8 字节，未使用部分为 0）
    pub data: [u8; 8],

    /// 有效数据长度 (0-8)
    pub len: u8,
}

impl PiperFrame {
    /// 创建标准帧
    pub fn new_standard(id: u16, data: &[u8]) -> Self {
        let mut fixed_data = [0u8; 8];
        let len = data.len().min(8);
        fixed_data[..len].copy_from_slice(&data[..len]);

        Self {
            id: id as u32,
            data: fixed_data,
            len: len as u8,
        }
    }

    /// 获取数据切片（只包含有效数据）
    pub fn data_slice(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_standard_pads_data() {
        let frame = PiperFrame::new_standard(0x159, &[1, 2, 3]);
        assert_eq!(frame.id, 0x159);
        assert_eq!(frame.len, 3);
        assert_eq!(frame.data, [1, 2, 3, 0, 0, 0, 0, 0]);
        assert_eq!(frame.data_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_new_standard_truncates_long_data() {
        let frame = PiperFrame::new_standard(0x155, &[0xAA; 12]);
        assert_eq!(frame.len, 8);
        assert_eq!(frame.data_slice().len(), 8);
    }
}
