pub mod control;
pub mod diagnostics;
pub mod injector;
pub mod jiggle_config;
pub mod jiggle_scheduler;

pub use diagnostics::{DiagnosticSink, TracingSink};
pub use injector::{create_injector, InputInjector};
pub use jiggle_config::{
    validate_interval, JiggleConfig, MotionProfile, MAX_INTERVAL_SECONDS, MIN_INTERVAL_SECONDS,
};
pub use jiggle_scheduler::{JiggleScheduler, SchedulerState};
