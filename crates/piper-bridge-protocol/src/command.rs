//! 执行器命令值类型
//!
//! 翻译器的输出。所有字段都已经是设备单位的整数，
//! 可以直接编码为控制帧或交给任何实现了网关契约的后端。

/// 关节数量
pub const JOINT_COUNT: usize = 6;

/// 关节控制命令
///
/// 六个关节目标角度，单位 0.001°（与 0x155~0x157 控制帧一致）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JointCommand {
    pub joints: [i32; JOINT_COUNT],
}

impl JointCommand {
    /// 零位（所有关节 0°）
    pub const ZERO: JointCommand = JointCommand {
        joints: [0; JOINT_COUNT],
    };

    pub fn new(joints: [i32; JOINT_COUNT]) -> Self {
        Self { joints }
    }
}

/// 夹爪控制码（0x159 Byte 6）
///
/// - Bit 0: 置1使能，0失能
/// - Bit 1: 置1清除错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GripperCode {
    /// 失能
    Disable = 0x00,
    /// 使能
    #[default]
    Enable = 0x01,
    /// 失能并清除错误
    DisableClearError = 0x02,
    /// 使能并清除错误
    EnableClearError = 0x03,
}

impl GripperCode {
    pub fn enable(self) -> bool {
        (self as u8) & 0x01 != 0
    }

    pub fn clear_error(self) -> bool {
        (self as u8) & 0x02 != 0
    }
}

/// 夹爪零点设置字节：不设置
pub const GRIPPER_ZERO_NONE: u8 = 0x00;

/// 夹爪控制命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GripperCommand {
    /// 开口宽度，单位 0.001mm，非负
    pub aperture: i32,
    /// 固定的夹爪力矩/速度常量，单位 0.001N·m
    pub effort: i16,
    /// 控制码
    pub code: GripperCode,
    /// 零点设置（0x00: 无效，0xAE: 设置当前为零点）
    pub set_zero: u8,
}

impl GripperCommand {
    /// 使能状态下移动到指定开口
    pub fn enabled(aperture: i32, effort: i16) -> Self {
        Self {
            aperture: aperture.max(0),
            effort,
            code: GripperCode::Enable,
            set_zero: GRIPPER_ZERO_NONE,
        }
    }

    /// 指定控制码（用于上电前的清错/使能序列）
    pub fn with_code(mut self, code: GripperCode) -> Self {
        self.code = code;
        self
    }
}

/// 一个轮询周期翻译得到的命令集合
///
/// 关节和夹爪相互独立，任意一项缺失都是正常情况。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommandSet {
    pub joints: Option<JointCommand>,
    pub gripper: Option<GripperCommand>,
}

impl CommandSet {
    pub fn is_empty(&self) -> bool {
        self.joints.is_none() && self.gripper.is_none()
    }
}
