//! 空跑网关：只记录日志，不接触硬件

use super::ArmGateway;
use crate::error::GatewayError;
use piper_bridge_protocol::{EnablePhase, GripperCommand, JointCommand, MotionCtrl1, MotionCtrl2};
use tracing::{debug, info};

/// 用于没有机械臂时联调 Unity 端
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DryRunGateway {
    joint_commands: u64,
    gripper_commands: u64,
}

impl DryRunGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn joint_commands(&self) -> u64 {
        self.joint_commands
    }

    pub fn gripper_commands(&self) -> u64 {
        self.gripper_commands
    }
}

impl ArmGateway for DryRunGateway {
    fn connect_port(&mut self) -> Result<(), GatewayError> {
        info!("[dry-run] connect_port");
        Ok(())
    }

    fn enable_arm(&mut self, mask: u8, phase: EnablePhase) -> Result<(), GatewayError> {
        info!("[dry-run] enable_arm mask=0x{:02X} phase={:?}", mask, phase);
        Ok(())
    }

    fn motion_ctrl_1(&mut self, cmd: MotionCtrl1) -> Result<(), GatewayError> {
        info!("[dry-run] motion_ctrl_1 {:?}", cmd);
        Ok(())
    }

    fn motion_ctrl_2(&mut self, cmd: MotionCtrl2) -> Result<(), GatewayError> {
        info!("[dry-run] motion_ctrl_2 {:?}", cmd);
        Ok(())
    }

    fn joint_control(&mut self, cmd: &JointCommand) -> Result<(), GatewayError> {
        self.joint_commands += 1;
        debug!("[dry-run] joint_control {:?}", cmd.joints);
        Ok(())
    }

    fn gripper_control(&mut self, cmd: &GripperCommand) -> Result<(), GatewayError> {
        self.gripper_commands += 1;
        debug!(
            "[dry-run] gripper_control aperture={} effort={} code={:?}",
            cmd.aperture, cmd.effort, cmd.code
        );
        Ok(())
    }
}
