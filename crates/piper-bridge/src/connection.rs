//! 与位姿源的一次 TCP 连接
//!
//! 每次重连都创建新的 [`Connection`]，从不跨连接复用。读操作按
//! `read_slice` 分片阻塞，每片之间检查停止信号；`read_until` 在超时时
//! 保留已读数据，所以分片不会截断一行。

use crate::config::UnityConfig;
use crate::error::SessionError;
use crate::stop::StopSignal;
use piper_bridge_protocol::encode_poll_request;
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// 连接状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
    /// 读写出错，只能关闭
    Faulted,
}

/// 单次连接（socket + 行缓冲读写）
#[derive(Debug)]
pub struct Connection {
    endpoint: String,
    peer: SocketAddr,
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    state: ConnectionState,
    read_timeout: Duration,
    max_line_bytes: usize,
    line: Vec<u8>,
}

impl Connection {
    /// 解析地址并依次尝试连接
    ///
    /// 每个地址使用 `connect_timeout`；尝试之间检查停止信号。
    pub fn open(config: &UnityConfig, stop: &StopSignal) -> Result<Self, SessionError> {
        let endpoint = config.endpoint();
        let addrs: Vec<SocketAddr> = (config.host.as_str(), config.port)
            .to_socket_addrs()
            .map_err(|source| SessionError::Resolve {
                endpoint: endpoint.clone(),
                source,
            })?
            .collect();

        let mut last_error =
            std::io::Error::new(ErrorKind::AddrNotAvailable, "no addresses resolved");
        for addr in addrs {
            stop.check()?;
            trace!("Connecting to {} ({})", endpoint, addr);
            match TcpStream::connect_timeout(&addr, config.connect_timeout()) {
                Ok(stream) => return Self::from_stream(stream, addr, endpoint, config),
                Err(e) => last_error = e,
            }
        }
        stop.check()?;

        Err(SessionError::Connect {
            endpoint,
            source: last_error,
        })
    }

    fn from_stream(
        stream: TcpStream,
        peer: SocketAddr,
        endpoint: String,
        config: &UnityConfig,
    ) -> Result<Self, SessionError> {
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(config.read_slice()))?;
        stream.set_write_timeout(Some(config.connect_timeout()))?;
        let writer = BufWriter::new(stream.try_clone()?);

        debug!("TCP connected to {} ({})", endpoint, peer);
        Ok(Self {
            endpoint,
            peer,
            reader: BufReader::new(stream),
            writer,
            state: ConnectionState::Connected,
            read_timeout: config.read_timeout(),
            max_line_bytes: config.max_line_bytes,
            line: Vec::new(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// 发送一次轮询请求（立即 flush）
    pub fn send_poll(&mut self) -> Result<(), SessionError> {
        encode_poll_request(&mut self.writer).map_err(|e| self.fault(e.into()))
    }

    /// 读取一行响应（含结尾换行）
    ///
    /// 对端关闭时返回空切片；已读到部分数据后对端关闭则返回该部分。
    pub fn read_line(&mut self, stop: &StopSignal) -> Result<&[u8], SessionError> {
        self.line.clear();
        let deadline = Instant::now() + self.read_timeout;

        loop {
            if let Err(stopped) = stop.check() {
                return Err(self.fault(stopped.into()));
            }

            // 多读 1 字节用于判断超长
            let budget = (self.max_line_bytes + 1).saturating_sub(self.line.len()) as u64;
            let result = (&mut self.reader)
                .take(budget)
                .read_until(b'\n', &mut self.line);

            match result {
                Ok(_) => {
                    if self.line.len() > self.max_line_bytes {
                        let limit = self.max_line_bytes;
                        return Err(self.fault(SessionError::LineTooLong { limit }));
                    }
                    trace!("RX {} bytes from {}", self.line.len(), self.endpoint);
                    return Ok(&self.line);
                },
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    if Instant::now() >= deadline {
                        let timeout = self.read_timeout;
                        return Err(self.fault(SessionError::ReadTimeout(timeout)));
                    }
                },
                Err(e) if e.kind() == ErrorKind::Interrupted => {},
                Err(e) => return Err(self.fault(e.into())),
            }
        }
    }

    fn fault(&mut self, error: SessionError) -> SessionError {
        self.state = ConnectionState::Faulted;
        error
    }

    /// 关闭连接（尽力而为，不会失败）
    pub fn close(mut self) {
        if self.state == ConnectionState::Connected {
            if let Err(e) = self.writer.flush() {
                debug!("Flush on close failed: {}", e);
            }
        }
        if let Err(e) = self.reader.get_ref().shutdown(Shutdown::Both) {
            debug!("Socket shutdown on close failed: {}", e);
        }
        self.state = ConnectionState::Disconnected;
        debug!("Connection to {} closed", self.endpoint);
    }
}
