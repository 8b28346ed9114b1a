pub mod app;
pub mod error;
pub mod scheduler;
pub mod services;
pub mod startup;

pub use app::{AppConfig, AppState, DEFAULT_FEED_ENDPOINT, SharedFeed};
pub use error::{ApiError, AppError, Result};
pub use scheduler::{RunGuard, RunTracker, Scheduler, TickOutcome};
pub use services::{AppServices, ScheduledRun};
pub use startup::{AppPaths, ensure_app_data_dir};
