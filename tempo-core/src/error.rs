use tempo_storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimerError {
    #[error("Timer not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Payload not serializable: {0}")]
    Serialization(String),
}
