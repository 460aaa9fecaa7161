//! 执行器网关
//!
//! 会话循环与就绪序列只依赖 [`ArmGateway`] 这组命令，不关心底层是
//! CAN 总线还是日志输出。所有调用都是 fire-and-forget：成功只表示命令
//! 已交给传输层。

mod can;
mod dry_run;

pub use can::CanGateway;
pub use dry_run::DryRunGateway;

use crate::error::GatewayError;
use piper_bridge_protocol::{EnablePhase, GripperCommand, JointCommand, MotionCtrl1, MotionCtrl2};

/// 机械臂命令接口
pub trait ArmGateway {
    /// 打开机械臂传输端口
    fn connect_port(&mut self) -> Result<(), GatewayError>;

    /// 电机使能（`mask` 选择关节，分准备/完成两个阶段）
    fn enable_arm(&mut self, mask: u8, phase: EnablePhase) -> Result<(), GatewayError>;

    /// 急停 / 轨迹 / 示教控制（0x150）
    fn motion_ctrl_1(&mut self, cmd: MotionCtrl1) -> Result<(), GatewayError>;

    /// 控制模式 / 运动模式 / 速度（0x151）
    fn motion_ctrl_2(&mut self, cmd: MotionCtrl2) -> Result<(), GatewayError>;

    /// 六关节目标（0.001°），一次调用即一组完整目标
    fn joint_control(&mut self, cmd: &JointCommand) -> Result<(), GatewayError>;

    /// 夹爪控制
    fn gripper_control(&mut self, cmd: &GripperCommand) -> Result<(), GatewayError>;
}

impl<G: ArmGateway + ?Sized> ArmGateway for Box<G> {
    fn connect_port(&mut self) -> Result<(), GatewayError> {
        (**self).connect_port()
    }

    fn enable_arm(&mut self, mask: u8, phase: EnablePhase) -> Result<(), GatewayError> {
        (**self).enable_arm(mask, phase)
    }

    fn motion_ctrl_1(&mut self, cmd: MotionCtrl1) -> Result<(), GatewayError> {
        (**self).motion_ctrl_1(cmd)
    }

    fn motion_ctrl_2(&mut self, cmd: MotionCtrl2) -> Result<(), GatewayError> {
        (**self).motion_ctrl_2(cmd)
    }

    fn joint_control(&mut self, cmd: &JointCommand) -> Result<(), GatewayError> {
        (**self).joint_control(cmd)
    }

    fn gripper_control(&mut self, cmd: &GripperCommand) -> Result<(), GatewayError> {
        (**self).gripper_control(cmd)
    }
}
