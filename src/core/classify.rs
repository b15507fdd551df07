use crate::domain::model::{NetworkCause, SubmissionOutcome};
use crate::domain::ports::Translator;

pub mod keys {
    pub const REQUIRED_FIELDS: &str = "contact.form.required";
    pub const INVALID_EMAIL: &str = "contact.form.invalid_email";
    pub const SUCCESS: &str = "contact.form.success";
    pub const REJECTED_FALLBACK: &str = "contact.form.error.rejected";
    pub const NETWORK_LOCAL: &str = "contact.form.error.network_local";
    pub const NETWORK_REMOTE: &str = "contact.form.error.network_remote";
    pub const TIMED_OUT: &str = "contact.form.error.timeout";
    pub const HTTP_STATUS: &str = "contact.form.error.http";
    pub const INVALID_RESPONSE: &str = "contact.form.error.invalid_response";
    pub const POPUP_BLOCKED: &str = "contact.form.popup_blocked";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationIssue {
    MissingFields,
    MessageTooLong,
    InvalidEmail,
}

/// 使用者可見的錯誤分類，每一種對應不同的提示文字
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    Validation(ValidationIssue),
    Rejected { reason: Option<String> },
    Network { local_dev: bool },
    TimedOut,
    HttpStatus(u16),
    MalformedResponse,
    PopupBlocked,
}

impl FailureKind {
    /// `None` for a delivered submission.
    pub fn from_outcome(outcome: &SubmissionOutcome, local_dev: bool) -> Option<Self> {
        match outcome {
            SubmissionOutcome::Delivered => None,
            SubmissionOutcome::Rejected { reason } => Some(FailureKind::Rejected {
                reason: reason.clone(),
            }),
            SubmissionOutcome::Unreachable(cause) => Some(match cause {
                NetworkCause::Offline => FailureKind::Network { local_dev },
                NetworkCause::TimedOut => FailureKind::TimedOut,
                NetworkCause::HttpStatus(code) => FailureKind::HttpStatus(*code),
                NetworkCause::MalformedResponse => FailureKind::MalformedResponse,
            }),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FailureKind::Validation(_) => "validation",
            FailureKind::Rejected { .. } => "rejected",
            FailureKind::Network { .. } => "unreachable/network",
            FailureKind::TimedOut => "unreachable/timeout",
            FailureKind::HttpStatus(_) => "unreachable/http_status",
            FailureKind::MalformedResponse => "unreachable/malformed_response",
            FailureKind::PopupBlocked => "popup_blocked",
        }
    }

    pub fn notice(&self, translator: &dyn Translator) -> String {
        match self {
            FailureKind::Validation(ValidationIssue::InvalidEmail) => {
                translator.t(keys::INVALID_EMAIL)
            }
            FailureKind::Validation(_) => translator.t(keys::REQUIRED_FIELDS),
            FailureKind::Rejected { reason } => match reason.as_deref().map(str::trim) {
                Some(reason) if !reason.is_empty() => reason.to_string(),
                _ => translator.t(keys::REJECTED_FALLBACK),
            },
            FailureKind::Network { local_dev: true } => translator.t(keys::NETWORK_LOCAL),
            FailureKind::Network { local_dev: false } => translator.t(keys::NETWORK_REMOTE),
            FailureKind::TimedOut => translator.t(keys::TIMED_OUT),
            FailureKind::HttpStatus(_) => translator.t(keys::HTTP_STATUS),
            FailureKind::MalformedResponse => translator.t(keys::INVALID_RESPONSE),
            FailureKind::PopupBlocked => translator.t(keys::POPUP_BLOCKED),
        }
    }
}
