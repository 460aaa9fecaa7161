//! 协作式停止信号
//!
//! Ctrl+C 处理线程调用 [`StopSignal::trigger`]，会话循环在每个阻塞点
//! （连接、分片读取、固定间隔睡眠）检查信号。睡眠通过 channel 的
//! `recv_timeout` 实现，触发后立即唤醒。

use crate::error::Stopped;
use crossbeam_channel::{Receiver, Sender, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[derive(Debug)]
struct Inner {
    stopped: AtomicBool,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
}

/// 可克隆的停止信号（所有克隆共享同一状态）
#[derive(Debug, Clone)]
pub struct StopSignal {
    inner: Arc<Inner>,
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl StopSignal {
    pub fn new() -> Self {
        let (wake_tx, wake_rx) = bounded(1);
        Self {
            inner: Arc::new(Inner {
                stopped: AtomicBool::new(false),
                wake_tx,
                wake_rx,
            }),
        }
    }

    /// 请求停止（可重复调用）
    pub fn trigger(&self) {
        self.inner.stopped.store(true, Ordering::Release);
        // 通道已满说明已有唤醒在途
        let _ = self.inner.wake_tx.try_send(());
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::Acquire)
    }

    /// 已请求停止时返回 `Err(Stopped)`
    pub fn check(&self) -> Result<(), Stopped> {
        if self.is_stopped() { Err(Stopped) } else { Ok(()) }
    }

    /// 可中断睡眠
    ///
    /// 睡满 `duration` 返回 `Ok(())`；期间收到停止信号立即返回 `Err(Stopped)`。
    pub fn sleep(&self, duration: Duration) -> Result<(), Stopped> {
        self.check()?;
        // 唤醒、超时都回到标志位判断
        let _ = self.inner.wake_rx.recv_timeout(duration);
        self.check()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_sleep_completes_without_stop() {
        let stop = StopSignal::new();
        let start = Instant::now();
        assert_eq!(stop.sleep(Duration::from_millis(20)), Ok(()));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_sleep_after_trigger_returns_immediately() {
        let stop = StopSignal::new();
        stop.trigger();
        let start = Instant::now();
        assert_eq!(stop.sleep(Duration::from_secs(10)), Err(Stopped));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_trigger_wakes_sleeper() {
        let stop = StopSignal::new();
        let remote = stop.clone();

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            remote.trigger();
        });

        let start = Instant::now();
        assert_eq!(stop.sleep(Duration::from_secs(10)), Err(Stopped));
        assert!(start.elapsed() < Duration::from_secs(5));
        handle.join().unwrap();
    }

    #[test]
    fn test_trigger_is_idempotent() {
        let stop = StopSignal::new();
        stop.trigger();
        stop.trigger();
        stop.trigger();
        assert!(stop.is_stopped());
        assert_eq!(stop.check(), Err(Stopped));
        // 多次睡眠都立即返回
        assert!(stop.sleep(Duration::from_secs(5)).is_err());
        assert!(stop.sleep(Duration::from_secs(5)).is_err());
    }
}
