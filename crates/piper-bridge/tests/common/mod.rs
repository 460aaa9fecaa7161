//! 集成测试公共设施
//!
//! - `RecordingGateway`: 记录所有网关调用，可注入关节命令失败
//! - `FakeUnity`: 进程内的位姿源，按脚本应答 `get` 请求

#![allow(dead_code)]

use piper_bridge::{ArmGateway, BridgeConfig, GatewayError, NoUpdatePolicy};
use piper_bridge_protocol::{EnablePhase, GripperCommand, JointCommand, MotionCtrl1, MotionCtrl2};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// 网关调用记录
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ConnectPort,
    EnableArm(u8, EnablePhase),
    MotionCtrl1(MotionCtrl1),
    MotionCtrl2(MotionCtrl2),
    Joint(JointCommand),
    Gripper(GripperCommand),
}

#[derive(Debug, Clone, Default)]
pub struct RecordingGateway {
    calls: Arc<Mutex<Vec<Call>>>,
    fail_joints: Arc<AtomicBool>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_joints(&self, fail: bool) {
        self.fail_joints.store(fail, Ordering::Relaxed);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn joints(&self) -> Vec<JointCommand> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Joint(cmd) => Some(cmd),
                _ => None,
            })
            .collect()
    }

    pub fn grippers(&self) -> Vec<GripperCommand> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Gripper(cmd) => Some(cmd),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ArmGateway for RecordingGateway {
    fn connect_port(&mut self) -> Result<(), GatewayError> {
        self.record(Call::ConnectPort);
        Ok(())
    }

    fn enable_arm(&mut self, mask: u8, phase: EnablePhase) -> Result<(), GatewayError> {
        self.record(Call::EnableArm(mask, phase));
        Ok(())
    }

    fn motion_ctrl_1(&mut self, cmd: MotionCtrl1) -> Result<(), GatewayError> {
        self.record(Call::MotionCtrl1(cmd));
        Ok(())
    }

    fn motion_ctrl_2(&mut self, cmd: MotionCtrl2) -> Result<(), GatewayError> {
        self.record(Call::MotionCtrl2(cmd));
        Ok(())
    }

    fn joint_control(&mut self, cmd: &JointCommand) -> Result<(), GatewayError> {
        if self.fail_joints.load(Ordering::Relaxed) {
            return Err(GatewayError::NotConnected);
        }
        self.record(Call::Joint(*cmd));
        Ok(())
    }

    fn gripper_control(&mut self, cmd: &GripperCommand) -> Result<(), GatewayError> {
        self.record(Call::Gripper(*cmd));
        Ok(())
    }
}

/// 单个连接的应答脚本
#[derive(Debug, Clone)]
pub enum Script {
    /// 依次应答这些行，用完后关闭连接
    Lines(Vec<String>),
    /// 每次请求都应答同一行，直到客户端断开
    Repeat(String),
    /// 读取请求但从不应答
    Silent,
}

/// 进程内位姿源
///
/// 第 i 个连接使用第 i 个脚本；超出脚本数量的连接接受后立即关闭。
pub struct FakeUnity {
    addr: SocketAddr,
    accepts: Arc<Mutex<Vec<Instant>>>,
    requests: Arc<AtomicUsize>,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FakeUnity {
    pub fn start(scripts: Vec<Script>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();

        let accepts = Arc::new(Mutex::new(Vec::new()));
        let requests = Arc::new(AtomicUsize::new(0));
        let shutdown = Arc::new(AtomicBool::new(false));

        let handle = {
            let accepts = accepts.clone();
            let requests = requests.clone();
            let shutdown = shutdown.clone();
            thread::spawn(move || {
                let mut scripts = scripts.into_iter();
                while !shutdown.load(Ordering::Relaxed) {
                    match listener.accept() {
                        Ok((stream, _)) => {
                            accepts.lock().unwrap().push(Instant::now());
                            if let Some(script) = scripts.next() {
                                serve(stream, script, &requests, &shutdown);
                            }
                        },
                        Err(e) if e.kind() == ErrorKind::WouldBlock => {
                            thread::sleep(Duration::from_millis(5));
                        },
                        Err(_) => break,
                    }
                }
            })
        };

        Self {
            addr,
            accepts,
            requests,
            shutdown,
            handle: Some(handle),
        }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// 每个已接受连接的时间
    pub fn accepts(&self) -> Vec<Instant> {
        self.accepts.lock().unwrap().clone()
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }
}

impl Drop for FakeUnity {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn serve(stream: TcpStream, script: Script, requests: &AtomicUsize, shutdown: &AtomicBool) {
    stream.set_nonblocking(false).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_millis(20)))
        .unwrap();
    let mut writer = stream.try_clone().unwrap();
    let mut reader = BufReader::new(stream);

    let mut lines = match &script {
        Script::Lines(lines) => lines.clone().into_iter(),
        _ => Vec::new().into_iter(),
    };

    let mut request = String::new();
    while !shutdown.load(Ordering::Relaxed) {
        match reader.read_line(&mut request) {
            Ok(0) => return,
            Ok(_) if request.ends_with('\n') => {
                assert_eq!(request, "get\n");
                request.clear();
                requests.fetch_add(1, Ordering::Relaxed);

                let reply = match &script {
                    Script::Lines(_) => match lines.next() {
                        Some(line) => line,
                        None => return,
                    },
                    Script::Repeat(line) => line.clone(),
                    Script::Silent => continue,
                };
                if writer.write_all(format!("{}\n", reply).as_bytes()).is_err() {
                    return;
                }
            },
            Ok(_) => {},
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {},
            Err(_) => return,
        }
    }
}

/// 指向 `FakeUnity` 的快速配置（短退避、短轮询间隔）
pub fn fast_config(port: u16) -> BridgeConfig {
    let mut config = BridgeConfig::default();
    config.unity.host = "127.0.0.1".to_string();
    config.unity.port = port;
    config.unity.connect_timeout_ms = 500;
    config.unity.read_timeout_ms = 1_000;
    config.unity.read_slice_ms = 20;
    config.unity.poll_interval_ms = 10;
    config.unity.reconnect_backoff_ms = 100;
    config.unity.on_no_update = NoUpdatePolicy::Reconnect;
    config
}

/// 轮询等待条件成立
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

/// 一个不太可能有人监听的本地端口
pub fn unused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
