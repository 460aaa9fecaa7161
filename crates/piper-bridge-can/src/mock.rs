//! Mock CAN 适配器
//!
//! 记录所有发送的帧，可注入发送失败。克隆共享同一份记录，
//! 测试可以把一个克隆交给网关，再用另一个克隆检查结果。

use crate::{CanAdapter, CanError, PiperFrame};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct MockCanAdapter {
    sent: Arc<Mutex<Vec<PiperFrame>>>,
    open: Arc<AtomicBool>,
    fail_sends: Arc<AtomicBool>,
}

impl MockCanAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已发送的帧（按发送顺序）
    pub fn sent_frames(&self) -> Vec<PiperFrame> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    /// 让后续发送全部失败
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::Relaxed);
    }
}

impl CanAdapter for MockCanAdapter {
    fn open(&mut self) -> Result<(), CanError> {
        self.open.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Relaxed)
    }

    fn send(&mut self, frame: PiperFrame) -> Result<(), CanError> {
        if !self.is_open() {
            return Err(CanError::NotStarted);
        }
        if self.fail_sends.load(Ordering::Relaxed) {
            return Err(CanError::Io(std::io::Error::other("mock send failure")));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(frame);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_requires_open() {
        let mut adapter = MockCanAdapter::new();
        let frame = PiperFrame::new_standard(0x159, &[0; 8]);
        assert!(matches!(adapter.send(frame), Err(CanError::NotStarted)));

        adapter.open().unwrap();
        adapter.send(frame).unwrap();
        assert_eq!(adapter.sent_frames(), vec![frame]);
    }

    #[test]
    fn test_clones_share_log() {
        let mut adapter = MockCanAdapter::new();
        let observer = adapter.clone();
        adapter.open().unwrap();
        adapter
            .send(PiperFrame::new_standard(0x155, &[0; 8]))
            .unwrap();
        assert_eq!(observer.sent_frames().len(), 1);
        assert!(observer.is_open());
    }

    #[test]
    fn test_injected_failure() {
        let mut adapter = MockCanAdapter::new();
        adapter.open().unwrap();
        adapter.set_fail_sends(true);
        assert!(matches!(
            adapter.send(PiperFrame::new_standard(0x155, &[0; 8])),
            Err(CanError::Io(_))
        ));
        assert!(adapter.sent_frames().is_empty());
    }
}
