//! 会话循环
//!
//! ```text
//!          ┌──────────── backoff ◄───────────┐
//!          ▼                                 │
//! Idle → Connecting ──ok──► Polling ──err──► Closing
//!          │  ▲                │
//!          └──┘ connect err    └── stop ──► ShuttingDown
//! ```
//!
//! - 连接失败：等待固定退避后无限重试（无指数增长、无抖动）
//! - 轮询：请求 → 读一行 → 解码 → 分发 → 等待轮询间隔
//! - 传输错误或 NoUpdate（默认策略）结束本次连接；关闭后等待退避再重连
//! - 分发失败只丢弃该命令，不影响连接
//! - 停止信号是唯一不被恢复的条件

use crate::config::{BridgeConfig, NoUpdatePolicy, UnityConfig};
use crate::connection::Connection;
use crate::error::SessionError;
use crate::gateway::ArmGateway;
use crate::stop::StopSignal;
use piper_bridge_protocol::{CommandSet, CommandTranslator, Decoded, PoseUpdate, decode_line};
use tracing::{debug, info, trace, warn};

/// 会话循环状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Polling,
    Closing,
    /// 终止状态（仅由停止信号进入）
    ShuttingDown,
}

/// 运行统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub connect_attempts: u64,
    pub connect_failures: u64,
    /// 成功建立的连接数
    pub sessions: u64,
    /// 收到响应的轮询周期数
    pub cycles: u64,
    /// 内容层面的 NoUpdate（不含连接结束）
    pub no_updates: u64,
    pub joint_commands: u64,
    pub gripper_commands: u64,
    pub dispatch_failures: u64,
}

/// Unity → 机械臂 会话循环
pub struct SessionLoop<G: ArmGateway> {
    unity: UnityConfig,
    translator: CommandTranslator,
    gateway: G,
    stop: StopSignal,
    state: SessionState,
    stats: SessionStats,
}

impl<G: ArmGateway> SessionLoop<G> {
    pub fn new(config: &BridgeConfig, gateway: G, stop: StopSignal) -> Self {
        Self {
            unity: config.unity.clone(),
            translator: CommandTranslator::new(config.translate),
            gateway,
            stop,
            state: SessionState::Idle,
            stats: SessionStats::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    /// 取回网关（用于退出时回零）
    pub fn into_gateway(self) -> G {
        self.gateway
    }

    /// 运行直到停止信号触发
    pub fn run(&mut self) -> SessionStats {
        info!("Polling Unity at {}", self.unity.endpoint());

        while !self.stop.is_stopped() {
            self.state = SessionState::Connecting;
            self.stats.connect_attempts += 1;

            match Connection::open(&self.unity, &self.stop) {
                Ok(mut conn) => {
                    self.stats.sessions += 1;
                    info!("[Unity] Connected to {}", conn.endpoint());

                    self.state = SessionState::Polling;
                    let reason = self.poll(&mut conn);

                    self.state = SessionState::Closing;
                    conn.close();

                    if reason.is_cancelled() {
                        break;
                    }
                    info!(
                        "[Unity] Session ended: {}. Reconnecting in {:?}",
                        reason,
                        self.unity.reconnect_backoff()
                    );
                },
                Err(SessionError::Cancelled) => break,
                Err(e) => {
                    self.stats.connect_failures += 1;
                    warn!(
                        "[Unity] {}. Reconnecting in {:?}",
                        e,
                        self.unity.reconnect_backoff()
                    );
                },
            }

            if self.stop.sleep(self.unity.reconnect_backoff()).is_err() {
                break;
            }
        }

        self.state = SessionState::ShuttingDown;
        info!("Session loop stopped: {:?}", self.stats);
        self.stats
    }

    /// 内循环，返回结束原因
    fn poll(&mut self, conn: &mut Connection) -> SessionError {
        loop {
            if let Err(e) = self.cycle(conn) {
                return e;
            }
            if let Err(stopped) = self.stop.sleep(self.unity.poll_interval()) {
                return stopped.into();
            }
        }
    }

    /// 一个轮询周期
    fn cycle(&mut self, conn: &mut Connection) -> Result<(), SessionError> {
        self.stop.check()?;
        conn.send_poll()?;
        let decoded = decode_line(conn.read_line(&self.stop)?);

        match decoded {
            Decoded::Update(update) => {
                self.stats.cycles += 1;
                self.dispatch(&update);
                Ok(())
            },
            Decoded::NoUpdate(reason) => {
                if reason.is_end_of_stream() {
                    return Err(SessionError::Closed);
                }
                self.stats.cycles += 1;
                self.stats.no_updates += 1;
                match self.unity.on_no_update {
                    NoUpdatePolicy::Reconnect => Err(SessionError::NoUpdate(reason)),
                    NoUpdatePolicy::Skip => {
                        debug!("Skipping response: {}", reason);
                        Ok(())
                    },
                }
            },
        }
    }

    /// 翻译并分发；关节与夹爪互不影响，失败只丢弃本周期的该命令
    fn dispatch(&mut self, update: &PoseUpdate) -> CommandSet {
        let commands = self.translator.translate(update);
        trace!("seq {} -> {:?}", update.seq(), commands);

        if let Some(joints) = &commands.joints {
            match self.gateway.joint_control(joints) {
                Ok(()) => self.stats.joint_commands += 1,
                Err(e) => {
                    self.stats.dispatch_failures += 1;
                    warn!("seq {}: joint command dropped: {}", update.seq(), e);
                },
            }
        }

        if let Some(gripper) = &commands.gripper {
            match self.gateway.gripper_control(gripper) {
                Ok(()) => self.stats.gripper_commands += 1,
                Err(e) => {
                    self.stats.dispatch_failures += 1;
                    warn!("seq {}: gripper command dropped: {}", update.seq(), e);
                },
            }
        }

        commands
    }
}
