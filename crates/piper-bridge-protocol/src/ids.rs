//! CAN ID 常量定义
//!
//! 只包含桥接进程会发送的控制帧 ID。

/// 快速急停/轨迹/拖动示教指令（MotionCtrl_1）
pub const ID_EMERGENCY_STOP: u32 = 0x150;

/// 控制模式指令（MotionCtrl_2）
pub const ID_CONTROL_MODE: u32 = 0x151;

/// 关节控制指令
pub const ID_JOINT_CONTROL_12: u32 = 0x155;
pub const ID_JOINT_CONTROL_34: u32 = 0x156;
pub const ID_JOINT_CONTROL_56: u32 = 0x157;

/// 夹爪控制指令
pub const ID_GRIPPER_CONTROL: u32 = 0x159;

/// 电机使能/失能设置指令
pub const ID_MOTOR_ENABLE: u32 = 0x471;
