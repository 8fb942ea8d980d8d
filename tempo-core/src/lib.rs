pub mod builder;
pub mod dispatcher;
pub mod dto;
pub mod error;
pub mod scheduler;
pub mod service;
pub mod signal;

pub use builder::{build_runtime, build_sqlite_runtime};
pub use dispatcher::{TimerCompletion, TimerDispatcher, TimerHandler};
pub use dto::{CreateTimerDto, TimerDto};
pub use error::TimerError;
pub use scheduler::Scheduler;
pub use service::TimerService;
pub use signal::{WakeHandle, WakeSignal};
