pub mod classify;
pub mod controller;
pub mod delivery;
pub mod form;
pub mod handoff;

pub use crate::domain::model::{BookingDraft, FormField, SubmissionOutcome, SubmissionStatus};
pub use crate::domain::ports::{BrowserHost, Mailer, Scheduler, Translator};
pub use crate::utils::error::Result;
