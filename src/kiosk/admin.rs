use tokio::time::{Duration, Instant};

/// 欢迎页隐藏的管理员手势：在时间窗口内连续点击若干次
#[derive(Debug, Clone)]
pub struct AdminGesture {
    threshold: u32,
    window: Duration,
    last_tap: Option<Instant>,
    count: u32,
}

impl AdminGesture {
    pub fn new(threshold: u32, window: Duration) -> Self {
        Self {
            threshold: threshold.max(1),
            window,
            last_tap: None,
            count: 0,
        }
    }

    /// 记录一次点击，达到阈值时返回 true 并清零
    pub fn register_tap(&mut self, now: Instant) -> bool {
        let within = self
            .last_tap
            .map(|last| now.saturating_duration_since(last) <= self.window)
            .unwrap_or(false);

        self.count = if within { self.count + 1 } else { 1 };
        self.last_tap = Some(now);

        if self.count >= self.threshold {
            self.reset();
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.last_tap = None;
        self.count = 0;
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}
