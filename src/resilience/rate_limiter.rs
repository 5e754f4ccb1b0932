//! 滑动窗口限流器
//!
//! 记录最近一个窗口内已提交的调用时间戳。`acquire` 在窗口满时
//! 挂起等待最老时间戳滑出窗口，`commit` 在调用真正发出后落账。
//! 两段式设计避免把失败前的等待也计入配额。

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// 滑动窗口限流器
///
/// 同一实例可被多任务共享（内部 `Mutex`），每个媒体供应商持有独立实例
pub struct SlidingWindowLimiter {
    capacity: usize,
    window: Duration,
    timestamps: Mutex<VecDeque<Instant>>,
}

impl SlidingWindowLimiter {
    pub fn new(capacity: usize, window: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            window,
            timestamps: Mutex::new(VecDeque::new()),
        }
    }

    /// 等待直到窗口内有空位
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut stamps = self.timestamps.lock().await;
                let now = Instant::now();
                while let Some(&oldest) = stamps.front() {
                    if now.duration_since(oldest) >= self.window {
                        stamps.pop_front();
                    } else {
                        break;
                    }
                }
                if stamps.len() < self.capacity {
                    return;
                }
                // 锁外等待最老记录滑出
                let oldest = *stamps.front().unwrap_or(&now);
                self.window.saturating_sub(now.duration_since(oldest))
            };
            tokio::time::sleep(wait).await;
        }
    }

    /// 调用发出后落账一条时间戳
    pub async fn commit(&self) {
        let mut stamps = self.timestamps.lock().await;
        stamps.push_back(Instant::now());
    }
}
