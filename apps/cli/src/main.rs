//! # Piper Unity Bridge
//!
//! 轮询 Unity 位姿源，把关节/夹爪目标转发给 Piper 机械臂。
//!
//! ```bash
//! # 使用默认配置（<config_dir>/piper/unity_bridge.toml，不存在则用内置默认值）
//! piper-unity-bridge --host 192.168.68.51
//!
//! # 无硬件联调：只打印命令
//! RUST_LOG=piper_bridge=debug piper-unity-bridge --dry-run
//!
//! # 查看生效配置
//! piper-unity-bridge --config bridge.toml --print-config
//! ```
//!
//! Ctrl+C 后停止轮询，并尝试让关节和夹爪回零。

use anyhow::{Context, Result};
use clap::Parser;
use piper_bridge::{
    ArmGateway, ArmSetup, BridgeConfig, DryRunGateway, NoUpdatePolicy, SessionLoop, StopSignal,
    move_to_zero, prepare_arm,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Piper Unity Bridge - Unity 位姿 → Piper 机械臂
#[derive(Parser, Debug)]
#[command(name = "piper-unity-bridge")]
#[command(about = "Forward Unity pose updates to a Piper robot arm", long_about = None)]
#[command(version)]
struct Cli {
    /// 配置文件路径
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Unity 主机地址
    #[arg(long)]
    host: Option<String>,

    /// Unity 端口
    #[arg(short, long)]
    port: Option<u16>,

    /// CAN 接口名称（如 can1）
    #[arg(short, long)]
    interface: Option<String>,

    /// MOVE J 速度百分比（1-100）
    #[arg(long)]
    speed: Option<u8>,

    /// 收到无效响应时的处理方式
    #[arg(long, value_parser = parse_policy)]
    on_no_update: Option<NoUpdatePolicy>,

    /// 不连接机械臂，只记录命令
    #[arg(long)]
    dry_run: bool,

    /// 跳过就绪序列（机械臂已使能）
    #[arg(long)]
    skip_ready: bool,

    /// 打印生效配置（TOML）后退出
    #[arg(long)]
    print_config: bool,
}

fn parse_policy(value: &str) -> Result<NoUpdatePolicy, String> {
    match value {
        "reconnect" => Ok(NoUpdatePolicy::Reconnect),
        "skip" => Ok(NoUpdatePolicy::Skip),
        other => Err(format!("expected `reconnect` or `skip`, got `{}`", other)),
    }
}

impl Cli {
    /// 配置文件 + 命令行覆盖
    fn resolve_config(&self) -> Result<BridgeConfig> {
        let mut config = BridgeConfig::load_or_default(self.config.as_deref())?;

        if let Some(host) = &self.host {
            config.unity.host = host.clone();
        }
        if let Some(port) = self.port {
            config.unity.port = port;
        }
        if let Some(interface) = &self.interface {
            config.arm.interface = interface.clone();
        }
        if let Some(speed) = self.speed {
            config.arm.speed_percent = speed;
        }
        if let Some(policy) = self.on_no_update {
            config.unity.on_no_update = policy;
        }

        config.validate()?;
        Ok(config)
    }
}

fn open_gateway(config: &BridgeConfig, dry_run: bool) -> Result<Box<dyn ArmGateway>> {
    if dry_run {
        info!("Dry run: no commands will reach the arm");
        return Ok(Box::new(DryRunGateway::new()));
    }

    #[cfg(target_os = "linux")]
    {
        use piper_bridge::CanGateway;
        use piper_bridge_can::SocketCanAdapter;

        info!("Using SocketCAN interface '{}'", config.arm.interface);
        Ok(Box::new(CanGateway::new(SocketCanAdapter::new(
            config.arm.interface.clone(),
        ))))
    }

    #[cfg(not(target_os = "linux"))]
    {
        anyhow::bail!(
            "SocketCAN interface '{}' is only available on Linux; use --dry-run",
            config.arm.interface
        )
    }
}

fn run(
    config: BridgeConfig,
    mut gateway: Box<dyn ArmGateway>,
    stop: StopSignal,
    skip_ready: bool,
) -> Result<()> {
    let setup = ArmSetup::from_config(&config.arm, config.translate.gripper_effort);

    gateway.connect_port().context("Failed to connect arm port")?;
    if skip_ready {
        info!("Skipping readiness sequence");
    } else {
        prepare_arm(&mut gateway, &setup).context("Arm readiness sequence failed")?;
    }

    let mut session = SessionLoop::new(&config, gateway, stop);
    let stats = session.run();

    info!("Stopping, moving arm to zero position");
    let mut gateway = session.into_gateway();
    move_to_zero(&mut gateway, &setup);

    info!(
        "Done: {} sessions, {} joint / {} gripper commands, {} dispatch failures",
        stats.sessions, stats.joint_commands, stats.gripper_commands, stats.dispatch_failures
    );
    Ok(())
}

fn main() -> Result<()> {
    // 初始化日志（输出到 stderr，stdout 留给 --print-config）
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("piper_bridge=info,piper_unity_bridge=info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let stop = StopSignal::new();
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || {
            info!("Ctrl+C detected, stopping...");
            stop.trigger();
        })
        .context("Failed to set Ctrl+C handler")?;
    }

    let gateway = open_gateway(&config, cli.dry_run)?;
    run(config, gateway, stop, cli.skip_ready)
}
