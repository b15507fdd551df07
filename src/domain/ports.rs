use crate::domain::model::{BookingDraft, SubmissionOutcome};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// 投遞預約到寄信服務。所有失敗都必須轉成 `SubmissionOutcome`，不可回傳錯誤。
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn deliver(&self, draft: &BookingDraft) -> SubmissionOutcome;
}

pub type ScheduledTask = Box<dyn FnOnce() + Send + 'static>;

/// Cancellation token for a scheduled task. Cancelling after the task ran is a no-op.
#[derive(Debug, Clone, Default)]
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
}

impl TimerHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

pub trait Scheduler: Send + Sync + 'static {
    fn schedule(&self, delay: Duration, task: ScheduledTask) -> TimerHandle;
}

pub trait WindowHandle: Send {
    fn is_closed(&self) -> bool;
}

/// 瀏覽器環境：頁面 hash 與開新視窗
pub trait BrowserHost: Send + Sync + 'static {
    fn location_hash(&self) -> String;

    /// `None` means the browser refused to hand back a window.
    fn open_window(&self, url: &Url) -> Option<Box<dyn WindowHandle>>;
}

pub trait Translator: Send + Sync + 'static {
    fn t(&self, key: &str) -> String;
}
