use chrono::NaiveDateTime;
use sqlx::SqlitePool;
use tempo_sqlite::{crud::timer_crud, models::timer::Timer};

use crate::entities::timer::{StoredTimer, TimerExtra};
use crate::error::StorageError;
use crate::traits::timer::TimerStorage;

/// SQLite-backed timer store over a shared connection pool.
#[derive(Clone)]
pub struct TimerPersistence {
    pool: SqlitePool,
}

impl TimerPersistence {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn to_row(stored: &StoredTimer) -> Result<Timer, StorageError> {
        let extra = TimerExtra {
            args: stored.args.clone(),
            kwargs: stored.kwargs.clone(),
        };
        let extra = serde_json::to_string(&extra)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        Ok(Timer {
            timer_id: stored.timer_id.clone(),
            event: stored.event.clone(),
            created_at: stored.created_at,
            expires_at: stored.expires_at,
            status: stored.status.clone(),
            extra,
            precise: stored.precise,
        })
    }

    fn from_row(row: Timer) -> Result<StoredTimer, StorageError> {
        let extra: TimerExtra = serde_json::from_str(&row.extra)
            .map_err(|e| StorageError::Deserialization(e.to_string()))?;

        Ok(StoredTimer {
            timer_id: row.timer_id,
            event: row.event,
            created_at: row.created_at,
            expires_at: row.expires_at,
            status: row.status,
            precise: row.precise,
            args: extra.args,
            kwargs: extra.kwargs,
        })
    }
}

#[async_trait::async_trait]
impl TimerStorage for TimerPersistence {
    async fn insert_timer(&self, timer: &StoredTimer) -> Result<(), StorageError> {
        let row = Self::to_row(timer)?;
        timer_crud::create_timer(&self.pool, &row).await?;
        Ok(())
    }

    async fn get_timer(&self, timer_id: &str) -> Result<Option<StoredTimer>, StorageError> {
        timer_crud::get_timer(&self.pool, timer_id)
            .await?
            .map(Self::from_row)
            .transpose()
    }

    async fn delete_timer(&self, timer_id: &str) -> Result<bool, StorageError> {
        Ok(timer_crud::delete_timer(&self.pool, timer_id).await?)
    }

    async fn mark_fired(&self, timer_id: &str) -> Result<bool, StorageError> {
        Ok(timer_crud::mark_fired(&self.pool, timer_id).await?)
    }

    async fn earliest_pending(
        &self,
        before: NaiveDateTime,
    ) -> Result<Option<StoredTimer>, StorageError> {
        timer_crud::earliest_pending(&self.pool, before)
            .await?
            .map(Self::from_row)
            .transpose()
    }
}
