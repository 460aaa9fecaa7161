//! 控制帧结构体定义
//!
//! 网关契约中每个调用对应一种 Piper 控制帧。这里只负责把命令编码为
//! `PiperFrame`，发送由 CAN 适配层完成。

use crate::command::{GripperCommand, JOINT_COUNT, JointCommand};
use crate::frame::PiperFrame;
use crate::{i16_to_bytes_be, i32_to_bytes_be, ids::*};
use bilge::prelude::*;

// ============================================================================
// MotionCtrl_1 (0x150) 相关枚举
// ============================================================================

/// 快速急停动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmergencyStopAction {
    /// 无效
    #[default]
    Invalid = 0x00,
    /// 快速急停
    EmergencyStop = 0x01,
    /// 恢复
    Resume = 0x02,
}

/// 轨迹指令
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrajectoryCommand {
    /// 关闭
    #[default]
    Closed = 0x00,
    /// 暂停当前规划
    PausePlanning = 0x01,
    /// 开始/继续当前轨迹
    StartContinue = 0x02,
    /// 清除当前轨迹
    ClearCurrent = 0x03,
    /// 清除所有轨迹
    ClearAll = 0x04,
    /// 终止执行
    Terminate = 0x06,
}

/// 拖动示教指令
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TeachCommand {
    /// 关闭（示教模式禁用）
    #[default]
    Closed = 0x00,
    /// 开始示教记录（进入拖动示教模式）
    StartRecord = 0x01,
    /// 结束示教记录（退出拖动示教模式）
    EndRecord = 0x02,
}

/// 快速急停/轨迹/拖动示教指令 (0x150)
///
/// 对应网关契约中的 `motion_ctrl_1`。Byte 3-7 仅在离线轨迹传输时使用，
/// 桥接进程从不传输轨迹，全部填 0。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotionCtrl1 {
    pub emergency_stop: EmergencyStopAction, // Byte 0
    pub track_ctrl: TrajectoryCommand,       // Byte 1
    pub teach_ctrl: TeachCommand,            // Byte 2
}

impl MotionCtrl1 {
    /// 仅设置拖动示教指令
    pub fn teach(teach_ctrl: TeachCommand) -> Self {
        Self {
            teach_ctrl,
            ..Default::default()
        }
    }

    /// 仅设置轨迹指令
    pub fn track(track_ctrl: TrajectoryCommand) -> Self {
        Self {
            track_ctrl,
            ..Default::default()
        }
    }

    /// 转换为 CAN 帧
    pub fn to_frame(self) -> PiperFrame {
        let mut data = [0u8; 8];
        data[0] = self.emergency_stop as u8;
        data[1] = self.track_ctrl as u8;
        data[2] = self.teach_ctrl as u8;

        PiperFrame::new_standard(ID_EMERGENCY_STOP as u16, &data)
    }
}

// ============================================================================
// MotionCtrl_2 (0x151) 相关枚举
// ============================================================================

/// 控制模式（控制指令版本）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlModeCommand {
    /// 待机模式
    #[default]
    Standby = 0x00,
    /// CAN指令控制模式
    CanControl = 0x01,
}

/// MOVE 模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveMode {
    /// MOVE P - 点位模式（末端位姿控制）
    #[default]
    MoveP = 0x00,
    /// MOVE J - 关节模式
    MoveJ = 0x01,
    /// MOVE L - 直线运动
    MoveL = 0x02,
    /// MOVE C - 圆弧运动
    MoveC = 0x03,
}

/// MIT 模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MitMode {
    /// 位置速度模式（默认）
    #[default]
    PositionVelocity = 0x00,
    /// MIT模式
    Mit = 0xAD,
}

/// 控制模式指令 (0x151)
///
/// 对应网关契约中的 `motion_ctrl_2`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotionCtrl2 {
    pub ctrl_mode: ControlModeCommand, // Byte 0
    pub move_mode: MoveMode,           // Byte 1
    pub speed_percent: u8,             // Byte 2 (1-100)
    pub mit_mode: MitMode,             // Byte 3
}

impl MotionCtrl2 {
    /// CAN 控制 + 关节模式 + 位置速度模式
    pub fn joint_position(speed_percent: u8) -> Self {
        Self {
            ctrl_mode: ControlModeCommand::CanControl,
            move_mode: MoveMode::MoveJ,
            speed_percent,
            mit_mode: MitMode::PositionVelocity,
        }
    }

    /// 转换为 CAN 帧
    pub fn to_frame(self) -> PiperFrame {
        let mut data = [0u8; 8];
        data[0] = self.ctrl_mode as u8;
        data[1] = self.move_mode as u8;
        data[2] = self.speed_percent;
        data[3] = self.mit_mode as u8;
        // Byte 4-7: 轨迹停留时间/安装位置，保持 0

        PiperFrame::new_standard(ID_CONTROL_MODE as u16, &data)
    }
}

// ============================================================================
// 电机使能指令 (0x471)
// ============================================================================

/// 全部关节电机（不含夹爪）
pub const ENABLE_MASK_ALL_JOINTS: u8 = 0x07;

/// 使能阶段（0x471 Byte 1）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnablePhase {
    /// 使能准备
    Prepare = 0x01,
    /// 使能完成
    Complete = 0x02,
}

/// 电机使能设置指令 (0x471)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorEnableCommand {
    pub mask: u8,           // Byte 0: 关节选择
    pub phase: EnablePhase, // Byte 1
}

impl MotorEnableCommand {
    pub fn new(mask: u8, phase: EnablePhase) -> Self {
        Self { mask, phase }
    }

    /// 转换为 CAN 帧
    pub fn to_frame(self) -> PiperFrame {
        let mut data = [0u8; 8];
        data[0] = self.mask;
        data[1] = self.phase as u8;

        PiperFrame::new_standard(ID_MOTOR_ENABLE as u16, &data)
    }
}

// ============================================================================
// 关节控制指令 (0x155~0x157)
// ============================================================================

fn joint_pair_frame(id: u32, a: i32, b: i32) -> PiperFrame {
    let mut data = [0u8; 8];
    data[0..4].copy_from_slice(&i32_to_bytes_be(a));
    data[4..8].copy_from_slice(&i32_to_bytes_be(b));
    PiperFrame::new_standard(id as u16, &data)
}

impl JointCommand {
    /// 转换为三帧（J1/J2、J3/J4、J5/J6），单位 0.001°
    pub fn to_frames(&self) -> [PiperFrame; JOINT_COUNT / 2] {
        let j = &self.joints;
        [
            joint_pair_frame(ID_JOINT_CONTROL_12, j[0], j[1]),
            joint_pair_frame(ID_JOINT_CONTROL_34, j[2], j[3]),
            joint_pair_frame(ID_JOINT_CONTROL_56, j[4], j[5]),
        ]
    }
}

// ============================================================================
// 夹爪控制指令 (0x159)
// ============================================================================

/// 夹爪控制标志位域（Byte 6: 8 位）
#[bitsize(8)]
#[derive(FromBits, DebugBits, Clone, Copy, Default)]
pub struct GripperControlFlags {
    pub enable: bool,      // Bit 0: 置1使能，0失能
    pub clear_error: bool, // Bit 1: 置1清除错误
    pub reserved: u6,      // Bit 2-7: 保留
}

impl GripperCommand {
    /// 转换为 CAN 帧
    pub fn to_frame(&self) -> PiperFrame {
        let mut data = [0u8; 8];
        data[0..4].copy_from_slice(&i32_to_bytes_be(self.aperture));
        data[4..6].copy_from_slice(&i16_to_bytes_be(self.effort));

        let mut flags = GripperControlFlags::from(u8::new(0));
        flags.set_enable(self.code.enable());
        flags.set_clear_error(self.code.clear_error());
        data[6] = u8::from(flags).value();
        data[7] = self.set_zero;

        PiperFrame::new_standard(ID_GRIPPER_CONTROL as u16, &data)
    }
}
