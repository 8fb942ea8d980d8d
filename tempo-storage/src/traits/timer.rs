use crate::entities::timer::StoredTimer;
use crate::error::StorageError;
use chrono::NaiveDateTime;
use std::sync::Arc;

/// Durable persistence for scheduled timers. All mutation between the
/// loop and concurrent creators/deleters goes through these operations,
/// each of which is atomic and immediately visible to subsequent reads.
#[async_trait::async_trait]
pub trait TimerStorage: Send + Sync {
    /// Persist a new timer.
    async fn insert_timer(&self, timer: &StoredTimer) -> Result<(), StorageError>;

    /// Fetch a timer by id, fired or not.
    async fn get_timer(&self, timer_id: &str) -> Result<Option<StoredTimer>, StorageError>;

    /// Remove a timer. Ok(false) if it was already gone.
    async fn delete_timer(&self, timer_id: &str) -> Result<bool, StorageError>;

    /// Flip pending→fired. Ok(false) if the row is absent or already fired.
    async fn mark_fired(&self, timer_id: &str) -> Result<bool, StorageError>;

    /// The pending timer with the smallest expires_at among rows with
    /// expires_at <= before; overdue rows qualify. Equal deadlines order
    /// by timer_id ascending.
    async fn earliest_pending(
        &self,
        before: NaiveDateTime,
    ) -> Result<Option<StoredTimer>, StorageError>;
}

pub type DynTimerStore = Arc<dyn TimerStorage>;
