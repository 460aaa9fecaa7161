//! CAN 网关：把网关调用编码为 Piper 控制帧

use super::ArmGateway;
use crate::error::GatewayError;
use piper_bridge_can::{CanAdapter, PiperFrame};
use piper_bridge_protocol::{
    EnablePhase, GripperCommand, JointCommand, MotionCtrl1, MotionCtrl2, MotorEnableCommand,
};
use tracing::{info, trace};

/// 基于 [`CanAdapter`] 的网关
///
/// 帧编码见 `piper_bridge_protocol::control`。`connect_port` 之前的
/// 任何命令都返回 [`GatewayError::NotConnected`]。
#[derive(Debug)]
pub struct CanGateway<A: CanAdapter> {
    adapter: A,
    connected: bool,
}

impl<A: CanAdapter> CanGateway<A> {
    pub fn new(adapter: A) -> Self {
        Self {
            adapter,
            connected: false,
        }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    fn send(&mut self, frame: PiperFrame) -> Result<(), GatewayError> {
        if !self.connected {
            return Err(GatewayError::NotConnected);
        }
        trace!("TX 0x{:03X} {:02X?}", frame.id, frame.data_slice());
        self.adapter.send(frame)?;
        Ok(())
    }
}

impl<A: CanAdapter> ArmGateway for CanGateway<A> {
    fn connect_port(&mut self) -> Result<(), GatewayError> {
        self.adapter.open()?;
        self.connected = true;
        info!("Arm CAN port connected");
        Ok(())
    }

    fn enable_arm(&mut self, mask: u8, phase: EnablePhase) -> Result<(), GatewayError> {
        self.send(MotorEnableCommand::new(mask, phase).to_frame())
    }

    fn motion_ctrl_1(&mut self, cmd: MotionCtrl1) -> Result<(), GatewayError> {
        self.send(cmd.to_frame())
    }

    fn motion_ctrl_2(&mut self, cmd: MotionCtrl2) -> Result<(), GatewayError> {
        self.send(cmd.to_frame())
    }

    /// 三帧依次发送，任一帧失败即返回错误（剩余帧不再发送）
    fn joint_control(&mut self, cmd: &JointCommand) -> Result<(), GatewayError> {
        for frame in cmd.to_frames() {
            self.send(frame)?;
        }
        Ok(())
    }

    fn gripper_control(&mut self, cmd: &GripperCommand) -> Result<(), GatewayError> {
        self.send(cmd.to_frame())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use piper_bridge_can::MockCanAdapter;
    use piper_bridge_protocol::{
        ID_CONTROL_MODE, ID_GRIPPER_CONTROL, ID_JOINT_CONTROL_12, ID_JOINT_CONTROL_34,
        ID_JOINT_CONTROL_56, ID_MOTOR_ENABLE, TeachCommand,
    };

    fn connected() -> (CanGateway<MockCanAdapter>, MockCanAdapter) {
        let adapter = MockCanAdapter::new();
        let observer = adapter.clone();
        let mut gateway = CanGateway::new(adapter);
        gateway.connect_port().unwrap();
        (gateway, observer)
    }

    #[test]
    fn test_commands_require_connect() {
        let mut gateway = CanGateway::new(MockCanAdapter::new());
        assert!(!gateway.is_connected());
        let err = gateway.joint_control(&JointCommand::ZERO).unwrap_err();
        assert!(matches!(err, GatewayError::NotConnected));
        assert!(gateway.adapter().sent_frames().is_empty());
    }

    #[test]
    fn test_joint_control_sends_three_frames() {
        let (mut gateway, observer) = connected();
        gateway
            .joint_control(&JointCommand::new([5730, 0, 0, 0, 0, -11459]))
            .unwrap();

        let frames = observer.sent_frames();
        let ids: Vec<u32> = frames.iter().map(|f| f.id).collect();
        assert_eq!(
            ids,
            vec![ID_JOINT_CONTROL_12, ID_JOINT_CONTROL_34, ID_JOINT_CONTROL_56]
        );
        assert_eq!(&frames[0].data[0..4], &5730i32.to_be_bytes());
        assert_eq!(&frames[2].data[4..8], &(-11459i32).to_be_bytes());
    }

    #[test]
    fn test_gripper_and_modes() {
        let (mut gateway, observer) = connected();
        gateway.enable_arm(0x07, EnablePhase::Prepare).unwrap();
        gateway
            .motion_ctrl_1(MotionCtrl1::teach(TeachCommand::EndRecord))
            .unwrap();
        gateway.motion_ctrl_2(MotionCtrl2::joint_position(5)).unwrap();
        gateway
            .gripper_control(&GripperCommand::enabled(300, 1000))
            .unwrap();

        let frames = observer.sent_frames();
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0].id, ID_MOTOR_ENABLE);
        assert_eq!(&frames[0].data[0..2], &[0x07, 0x01]);
        assert_eq!(frames[2].id, ID_CONTROL_MODE);
        assert_eq!(&frames[2].data[0..4], &[0x01, 0x01, 5, 0x00]);
        assert_eq!(frames[3].id, ID_GRIPPER_CONTROL);
        assert_eq!(frames[3].data, [0, 0, 0x01, 0x2C, 0x03, 0xE8, 0x01, 0x00]);
    }

    #[test]
    fn test_adapter_failure_surfaces() {
        let (mut gateway, observer) = connected();
        observer.set_fail_sends(true);
        let err = gateway
            .gripper_control(&GripperCommand::enabled(0, 1000))
            .unwrap_err();
        assert!(matches!(err, GatewayError::Can(_)));
    }
}
