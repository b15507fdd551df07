pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{Catalog, ConsoleHost, ManualScheduler, TokioScheduler};
pub use config::FormConfig;
pub use core::controller::{ControllerEvent, SubmissionController, SubmitAttempt};
pub use core::delivery::HttpMailer;
pub use domain::model::{BookingDraft, FormField, SubmissionOutcome, SubmissionStatus};
pub use utils::error::{BookingError, Result};
