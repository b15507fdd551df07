// Adapters layer: concrete implementations of the domain ports (timers, host, translations).

pub mod catalog;
pub mod host;
pub mod scheduler;

pub use catalog::Catalog;
pub use host::ConsoleHost;
pub use scheduler::{ManualScheduler, TokioScheduler};
