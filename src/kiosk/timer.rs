use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// start -> video 前等待装饰动画淡出
    StartDebounce,
    /// 视频加载失败后的提示停留时间
    VideoFallback,
    /// 感谢页倒计时，每秒一次
    CountdownTick,
}

/// 定时器到期后投递回 UI 循环的消息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub generation: u64,
    pub kind: TimerKind,
}

/// 单一定时器槽位：任意时刻最多一个待触发任务。
/// 每次 schedule/cancel 都会推进 generation，过期的 TimerFired 会被丢弃。
pub struct TimerSlot {
    generation: u64,
    pending: Option<(TimerKind, JoinHandle<()>)>,
    tx: mpsc::UnboundedSender<TimerFired>,
}

impl TimerSlot {
    pub fn new(tx: mpsc::UnboundedSender<TimerFired>) -> Self {
        Self {
            generation: 0,
            pending: None,
            tx,
        }
    }

    pub fn schedule(&mut self, kind: TimerKind, delay: Duration) {
        self.cancel();
        let fired = TimerFired {
            generation: self.generation,
            kind,
        };
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            let _ = tx.send(fired);
        });
        self.pending = Some((kind, handle));
    }

    pub fn cancel(&mut self) {
        if let Some((_, handle)) = self.pending.take() {
            handle.abort();
        }
        self.generation = self.generation.wrapping_add(1);
    }

    /// 仅当消息属于当前待触发任务时返回 true，并清空槽位
    pub fn claim(&mut self, fired: &TimerFired) -> bool {
        match self.pending {
            Some((kind, _)) if kind == fired.kind && fired.generation == self.generation => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    pub fn pending_kind(&self) -> Option<TimerKind> {
        self.pending.as_ref().map(|(kind, _)| *kind)
    }

    #[cfg(test)]
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        if let Some((_, handle)) = self.pending.take() {
            handle.abort();
        }
    }
}
