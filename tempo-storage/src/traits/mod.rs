pub mod timer;

pub use timer::{DynTimerStore, TimerStorage};
