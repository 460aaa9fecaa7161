//! # Piper Bridge
//!
//! 从 Unity 位姿源轮询关节/夹爪目标，翻译后通过执行器网关发送给 Piper 机械臂。
//!
//! ## 模块
//!
//! - `config`: TOML 配置（`[unity]` / `[arm]` / `[translate]`）
//! - `connection`: 单次 TCP 连接（行缓冲、分片读超时）
//! - `session`: 自动重连的会话循环
//! - `gateway`: 执行器网关契约及 CAN / 空跑实现
//! - `arm`: 就绪序列与回零
//! - `stop`: 协作式停止信号
//!
//! ## 使用示例
//!
//! ```no_run
//! use piper_bridge::{BridgeConfig, DryRunGateway, SessionLoop, StopSignal};
//!
//! let config = BridgeConfig::default();
//! let stop = StopSignal::new();
//! let mut session = SessionLoop::new(&config, DryRunGateway::new(), stop.clone());
//! let stats = session.run();
//! println!("{:?}", stats);
//! ```

pub mod arm;
pub mod config;
pub mod connection;
mod error;
pub mod gateway;
pub mod session;
pub mod stop;

pub use arm::{ArmSetup, move_to_zero, prepare_arm};
pub use config::{ArmConfig, BridgeConfig, NoUpdatePolicy, UnityConfig};
pub use connection::{Connection, ConnectionState};
pub use error::{ConfigError, GatewayError, SessionError, Stopped};
pub use gateway::{ArmGateway, CanGateway, DryRunGateway};
pub use session::{SessionLoop, SessionState, SessionStats};
pub use stop::StopSignal;
