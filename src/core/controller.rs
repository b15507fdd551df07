use crate::core::classify::{keys, FailureKind, ValidationIssue};
use crate::core::form::FormState;
use crate::core::handoff::{ChannelHandoff, HandoffResult};
use crate::domain::model::{
    BookingDraft, FormField, SubmissionOutcome, SubmissionStatus, MESSAGE_MAX_CHARS,
};
use crate::domain::ports::{BrowserHost, Mailer, Scheduler, TimerHandle, Translator};
use crate::utils::error::{BookingError, Result};
use crate::utils::validation::{validate_email_shape, validate_max_chars, validate_non_empty_string};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use url::Url;

/// 各種自動返回與交接的延遲
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub validation_return: Duration,
    pub handoff_delay: Duration,
    pub success_return: Duration,
    pub error_return: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            validation_return: Duration::from_secs(3),
            handoff_delay: Duration::from_secs(2),
            success_return: Duration::from_secs(5),
            error_return: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub handoff: ChannelHandoff,
    pub timing: Timing,
    /// Page served from a loopback host; picks the local-development network hint.
    pub local_dev: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub failure: Option<FailureKind>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    StatusChanged(SubmissionStatus),
    Notice(Notice),
    HandoffOpened(Url),
    PopupBlocked(Url),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitAttempt {
    /// A submission was already in flight.
    Ignored,
    Invalid(ValidationIssue),
    Completed(SubmissionOutcome),
}

struct Session {
    form: FormState,
    status: SubmissionStatus,
    notice: Option<Notice>,
    secondary_notice: Option<Notice>,
    // 每次狀態轉換加一，計時器以此判斷是否過期
    cycle: u64,
    auto_return: Option<TimerHandle>,
    last_deep_link: Option<Url>,
}

struct Shared<H, T> {
    session: Mutex<Session>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<ControllerEvent>>>,
    host: H,
    translator: T,
}

impl<H: BrowserHost, T: Translator> Shared<H, T> {
    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: ControllerEvent) {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn transition(&self, session: &mut Session, next: SubmissionStatus) {
        if let Some(timer) = session.auto_return.take() {
            timer.cancel();
        }
        tracing::info!("📨 Submission status: {:?} -> {:?}", session.status, next);
        session.status = next;
        session.cycle += 1;
        if next == SubmissionStatus::Idle {
            session.notice = None;
        }
        self.emit(ControllerEvent::StatusChanged(next));
    }

    fn set_notice(&self, session: &mut Session, notice: Notice) {
        session.notice = Some(notice.clone());
        self.emit(ControllerEvent::Notice(notice));
    }

    /// Timer body: only acts if the session is still in the state and cycle it was issued for.
    fn return_to_idle(&self, expected: SubmissionStatus, cycle: u64) {
        let mut session = self.lock();
        if session.status != expected || session.cycle != cycle {
            tracing::debug!(
                "Stale auto-return ignored (issued for {:?}#{}, now {:?}#{})",
                expected,
                cycle,
                session.status,
                session.cycle
            );
            return;
        }
        session.auto_return = None;
        self.transition(&mut session, SubmissionStatus::Idle);
    }

    fn run_handoff(&self, link: &Url) {
        match ChannelHandoff::open(&self.host, link) {
            HandoffResult::Opened => self.emit(ControllerEvent::HandoffOpened(link.clone())),
            HandoffResult::Blocked => {
                let notice = Notice {
                    level: NoticeLevel::Warning,
                    text: FailureKind::PopupBlocked.notice(&self.translator),
                    failure: Some(FailureKind::PopupBlocked),
                };
                let mut session = self.lock();
                session.secondary_notice = Some(notice.clone());
                self.emit(ControllerEvent::PopupBlocked(link.clone()));
                self.emit(ControllerEvent::Notice(notice));
            }
        }
    }
}

/// 預約表單的送出流程：驗證、投遞、分類錯誤，成功後交接到通訊軟體
pub struct SubmissionController<M, S, H, T> {
    shared: Arc<Shared<H, T>>,
    mailer: M,
    scheduler: Arc<S>,
    settings: ControllerSettings,
}

impl<M, S, H, T> SubmissionController<M, S, H, T>
where
    M: Mailer,
    S: Scheduler,
    H: BrowserHost,
    T: Translator,
{
    pub fn new(mailer: M, scheduler: Arc<S>, host: H, translator: T, settings: ControllerSettings) -> Self {
        Self {
            shared: Arc::new(Shared {
                session: Mutex::new(Session {
                    form: FormState::new(),
                    status: SubmissionStatus::Idle,
                    notice: None,
                    secondary_notice: None,
                    cycle: 0,
                    auto_return: None,
                    last_deep_link: None,
                }),
                subscribers: Mutex::new(Vec::new()),
                host,
                translator,
            }),
            mailer,
            scheduler,
            settings,
        }
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ControllerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.shared
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// 掛載時呼叫：從頁面 hash 預選服務類型
    pub fn mount(&self) -> bool {
        let hash = self.shared.host.location_hash();
        self.shared.lock().form.seed_service_type_from_location(&hash)
    }

    /// Applies one edit. A successful edit dismisses a displayed success or error.
    pub fn update_field(&self, field: FormField, value: impl Into<String>) -> Result<BookingDraft> {
        let mut session = self.shared.lock();
        let draft = session.form.update_field(field, value)?.clone();

        if session.status.is_settled() {
            tracing::debug!("Edit to {} dismisses {:?}", field, session.status);
            self.shared.transition(&mut session, SubmissionStatus::Idle);
        }
        Ok(draft)
    }

    pub async fn submit(&self) -> SubmitAttempt {
        let draft = {
            let mut session = self.shared.lock();
            match session.status {
                SubmissionStatus::Submitting => {
                    tracing::debug!("Submission already in flight, ignoring");
                    return SubmitAttempt::Ignored;
                }
                SubmissionStatus::Success | SubmissionStatus::Error => {
                    self.shared.transition(&mut session, SubmissionStatus::Idle);
                }
                SubmissionStatus::Idle => {}
            }

            let draft = session.form.draft().clone();
            if let Err(issue) = validate_draft(&draft) {
                tracing::warn!("Booking request refused locally: {:?}", issue);
                self.fail(
                    &mut session,
                    FailureKind::Validation(issue),
                    self.settings.timing.validation_return,
                );
                return SubmitAttempt::Invalid(issue);
            }

            session.secondary_notice = None;
            self.shared.transition(&mut session, SubmissionStatus::Submitting);
            draft
        };

        let outcome = self.mailer.deliver(&draft).await;

        let mut session = self.shared.lock();
        match FailureKind::from_outcome(&outcome, self.settings.local_dev) {
            None => self.succeed(&mut session, &draft),
            Some(kind) => self.fail(&mut session, kind, self.settings.timing.error_return),
        }
        SubmitAttempt::Completed(outcome)
    }

    fn succeed(&self, session: &mut Session, submitted: &BookingDraft) {
        tracing::info!("✅ Booking request delivered ({})", submitted.service_type);

        let link = self.settings.handoff.build_deep_link(submitted);
        session.form.reset_draft();
        session.last_deep_link = Some(link.clone());

        self.shared.transition(session, SubmissionStatus::Success);
        let notice = Notice {
            level: NoticeLevel::Success,
            text: self.shared.translator.t(keys::SUCCESS),
            failure: None,
        };
        self.shared.set_notice(session, notice);

        // 交接與自動返回各自獨立排程
        let shared = Arc::clone(&self.shared);
        self.scheduler.schedule(
            self.settings.timing.handoff_delay,
            Box::new(move || shared.run_handoff(&link)),
        );
        self.schedule_return(session, SubmissionStatus::Success, self.settings.timing.success_return);
    }

    fn fail(&self, session: &mut Session, kind: FailureKind, return_after: Duration) {
        tracing::warn!("❌ Booking request failed: {}", kind.label());

        self.shared.transition(session, SubmissionStatus::Error);
        let notice = Notice {
            level: NoticeLevel::Error,
            text: kind.notice(&self.shared.translator),
            failure: Some(kind),
        };
        self.shared.set_notice(session, notice);
        self.schedule_return(session, SubmissionStatus::Error, return_after);
    }

    fn schedule_return(&self, session: &mut Session, expected: SubmissionStatus, delay: Duration) {
        let shared = Arc::clone(&self.shared);
        let cycle = session.cycle;
        let handle = self.scheduler.schedule(
            delay,
            Box::new(move || shared.return_to_idle(expected, cycle)),
        );
        session.auto_return = Some(handle);
    }

    pub fn status(&self) -> SubmissionStatus {
        self.shared.lock().status
    }

    pub fn draft(&self) -> BookingDraft {
        self.shared.lock().form.draft().clone()
    }

    pub fn notice(&self) -> Option<Notice> {
        self.shared.lock().notice.clone()
    }

    /// Popup-blocked warning from the most recent handoff, if any.
    pub fn secondary_notice(&self) -> Option<Notice> {
        self.shared.lock().secondary_notice.clone()
    }

    pub fn last_deep_link(&self) -> Option<Url> {
        self.shared.lock().last_deep_link.clone()
    }
}

/// 送出前的權威檢查，不信任輸入元件已做過的限制
///
/// 必填欄位先 trim 再判斷：只有空白的值視同缺漏（比只看字串是否為空更嚴格）。
pub fn validate_draft(draft: &BookingDraft) -> std::result::Result<(), ValidationIssue> {
    let missing = FormField::ALL
        .into_iter()
        .filter(|field| field.is_required())
        .any(|field| validate_non_empty_string(field.key(), draft.get(field)).is_err());
    if missing {
        return Err(ValidationIssue::MissingFields);
    }

    if let Err(BookingError::MessageTooLong { .. }) = validate_max_chars(&draft.message, MESSAGE_MAX_CHARS) {
        return Err(ValidationIssue::MessageTooLong);
    }

    if validate_email_shape(FormField::Email.key(), &draft.email).is_err() {
        return Err(ValidationIssue::InvalidEmail);
    }

    Ok(())
}
