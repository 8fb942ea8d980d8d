use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::entities::timer::{StoredTimer, STATUS_FIRED, STATUS_PENDING};
use crate::error::StorageError;
use crate::traits::timer::TimerStorage;

/// Volatile timer store. Same contract as the SQLite adapter, minus the
/// durability; the scheduler tests run against it.
#[derive(Default, Clone)]
pub struct MemoryTimerStore {
    inner: Arc<Mutex<HashMap<String, StoredTimer>>>,
}

impl MemoryTimerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl TimerStorage for MemoryTimerStore {
    async fn insert_timer(&self, timer: &StoredTimer) -> Result<(), StorageError> {
        self.inner
            .lock()
            .await
            .insert(timer.timer_id.clone(), timer.clone());
        Ok(())
    }

    async fn get_timer(&self, timer_id: &str) -> Result<Option<StoredTimer>, StorageError> {
        Ok(self.inner.lock().await.get(timer_id).cloned())
    }

    async fn delete_timer(&self, timer_id: &str) -> Result<bool, StorageError> {
        Ok(self.inner.lock().await.remove(timer_id).is_some())
    }

    async fn mark_fired(&self, timer_id: &str) -> Result<bool, StorageError> {
        let mut map = self.inner.lock().await;
        match map.get_mut(timer_id) {
            Some(timer) if timer.status == STATUS_PENDING => {
                timer.status = STATUS_FIRED.to_string();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn earliest_pending(
        &self,
        before: NaiveDateTime,
    ) -> Result<Option<StoredTimer>, StorageError> {
        let map = self.inner.lock().await;
        Ok(map
            .values()
            .filter(|t| t.status == STATUS_PENDING && t.expires_at <= before)
            .min_by(|a, b| {
                a.expires_at
                    .cmp(&b.expires_at)
                    .then_with(|| a.timer_id.cmp(&b.timer_id))
            })
            .cloned())
    }
}
