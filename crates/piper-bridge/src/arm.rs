//! 机械臂生命周期：会话前的就绪序列与退出时的回零
//!
//! # 就绪序列
//!
//! 1. 退出示教（`teach=0x02`）→ 关闭示教（`0x00`）→ 暂停轨迹（`track=0x01`），
//!    这三步失败只记录警告
//! 2. 电机使能：准备（0x01）→ 完成（0x02）
//! 3. CAN 控制 + MOVE J + 速度百分比
//! 4. 夹爪失能并清错（0x02）→ 使能（0x01），开口 0
//!
//! 第 2 步之后的任何失败都会中止序列并返回错误。

use crate::config::ArmConfig;
use crate::error::GatewayError;
use crate::gateway::ArmGateway;
use piper_bridge_protocol::{
    EnablePhase, GripperCode, GripperCommand, JointCommand, MotionCtrl1, MotionCtrl2, TeachCommand,
    TrajectoryCommand,
};
use std::time::Duration;
use tracing::{info, warn};

/// 就绪序列参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmSetup {
    pub enable_mask: u8,
    pub speed_percent: u8,
    pub gripper_effort: i16,
    pub step_delay: Duration,
    pub enable_settle: Duration,
    pub mode_settle: Duration,
}

impl ArmSetup {
    pub fn from_config(arm: &ArmConfig, gripper_effort: i16) -> Self {
        Self {
            enable_mask: arm.enable_mask,
            speed_percent: arm.speed_percent,
            gripper_effort,
            step_delay: Duration::from_millis(arm.step_delay_ms),
            enable_settle: Duration::from_millis(arm.enable_settle_ms),
            mode_settle: Duration::from_millis(arm.mode_settle_ms),
        }
    }

    /// 所有等待清零（测试用）
    pub fn without_delays(mut self) -> Self {
        self.step_delay = Duration::ZERO;
        self.enable_settle = Duration::ZERO;
        self.mode_settle = Duration::ZERO;
        self
    }
}

fn pause(duration: Duration) {
    if !duration.is_zero() {
        spin_sleep::sleep(duration);
    }
}

/// 执行就绪序列
pub fn prepare_arm<G: ArmGateway + ?Sized>(
    gateway: &mut G,
    setup: &ArmSetup,
) -> Result<(), GatewayError> {
    let mode_steps = [
        MotionCtrl1::teach(TeachCommand::EndRecord),
        MotionCtrl1::teach(TeachCommand::Closed),
        MotionCtrl1::track(TrajectoryCommand::PausePlanning),
    ];
    for step in mode_steps {
        if let Err(e) = gateway.motion_ctrl_1(step) {
            warn!("Ignoring motion_ctrl_1 failure during readiness ({:?}): {}", step, e);
        }
        pause(setup.step_delay);
    }

    gateway.enable_arm(setup.enable_mask, EnablePhase::Prepare)?;
    pause(setup.enable_settle);
    gateway.enable_arm(setup.enable_mask, EnablePhase::Complete)?;
    pause(setup.enable_settle);

    gateway.motion_ctrl_2(MotionCtrl2::joint_position(setup.speed_percent))?;
    pause(setup.step_delay);
    pause(setup.mode_settle);

    let gripper = GripperCommand::enabled(0, setup.gripper_effort);
    gateway.gripper_control(&gripper.with_code(GripperCode::DisableClearError))?;
    pause(setup.step_delay);
    gateway.gripper_control(&gripper.with_code(GripperCode::Enable))?;
    pause(setup.step_delay);

    info!(
        "Arm ready (mask=0x{:02X}, speed={}%)",
        setup.enable_mask, setup.speed_percent
    );
    Ok(())
}

/// 回零：关节全部 0°，夹爪开口 0（使能）
///
/// 两条命令都会尝试；失败只记录警告。返回是否全部成功。
pub fn move_to_zero<G: ArmGateway + ?Sized>(gateway: &mut G, setup: &ArmSetup) -> bool {
    let joints = gateway.joint_control(&JointCommand::ZERO);
    if let Err(e) = &joints {
        warn!("Failed to move joints to zero: {}", e);
    }

    let gripper = gateway.gripper_control(&GripperCommand::enabled(0, setup.gripper_effort));
    if let Err(e) = &gripper {
        warn!("Failed to close gripper: {}", e);
    }
    pause(setup.step_delay);

    let ok = joints.is_ok() && gripper.is_ok();
    if ok {
        info!("Arm moved to zero position");
    }
    ok
}
