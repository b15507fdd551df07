use crate::domain::ports::{ScheduledTask, Scheduler, TimerHandle};
use crate::utils::error::{BookingError, Result};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;

/// 以 tokio 計時器排程；取消只保證工作不執行，不會中止睡眠中的 task
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    pub fn current() -> Result<Self> {
        let handle = Handle::try_current().map_err(|e| BookingError::ConfigError {
            message: format!("a tokio runtime is required for timers: {}", e),
        })?;
        Ok(Self { handle })
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: ScheduledTask) -> TimerHandle {
        let timer = TimerHandle::new();
        let token = timer.clone();

        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if !token.is_cancelled() {
                task();
            }
        });

        timer
    }
}

struct PendingTask {
    due: Duration,
    seq: u64,
    timer: TimerHandle,
    task: ScheduledTask,
}

#[derive(Default)]
struct VirtualClock {
    now: Duration,
    next_seq: u64,
    pending: Vec<PendingTask>,
}

/// Virtual clock driven by `advance`. Tasks run on the caller's thread, in due order.
#[derive(Default)]
pub struct ManualScheduler {
    clock: Mutex<VirtualClock>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Tasks still waiting and not cancelled.
    pub fn pending(&self) -> usize {
        self.lock()
            .pending
            .iter()
            .filter(|p| !p.timer.is_cancelled())
            .count()
    }

    /// 推進虛擬時間並執行到期的工作，回傳實際執行的數量
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.lock().now + by;
        let mut fired = 0;

        loop {
            // 鎖只在挑選工作時持有，工作本身可能再排程
            let next = {
                let mut clock = self.lock();
                let index = clock
                    .pending
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.due <= target)
                    .min_by_key(|(_, p)| (p.due, p.seq))
                    .map(|(i, _)| i);

                match index {
                    Some(i) => {
                        let pending = clock.pending.remove(i);
                        clock.now = pending.due;
                        Some(pending)
                    }
                    None => {
                        clock.now = target;
                        None
                    }
                }
            };

            match next {
                Some(pending) if !pending.timer.is_cancelled() => {
                    (pending.task)();
                    fired += 1;
                }
                Some(_) => {}
                None => break,
            }
        }

        fired
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VirtualClock> {
        self.clock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: ScheduledTask) -> TimerHandle {
        let timer = TimerHandle::new();
        let mut clock = self.lock();
        let seq = clock.next_seq;
        clock.next_seq += 1;
        let due = clock.now + delay;
        clock.pending.push(PendingTask {
            due,
            seq,
            timer: timer.clone(),
            task,
        });
        timer
    }
}
