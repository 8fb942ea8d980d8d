pub mod entities;
pub mod error;
pub mod memory;
pub mod persistence;
pub mod traits;

pub use error::StorageError;
pub use memory::MemoryTimerStore;
pub use persistence::timer::TimerPersistence;
pub use traits::timer::{DynTimerStore, TimerStorage};
