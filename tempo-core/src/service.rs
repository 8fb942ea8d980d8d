use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use tempo_storage::entities::timer::{StoredTimer, TimerExtra, STATUS_PENDING};
use tempo_storage::DynTimerStore;

use crate::dto::{CreateTimerDto, TimerDto};
use crate::error::TimerError;
use crate::signal::WakeHandle;

/// The surface feature modules schedule against. Cloneable; any number of
/// tasks may create and delete timers concurrently with the running loop.
#[derive(Clone)]
pub struct TimerService {
    store: DynTimerStore,
    wake: WakeHandle,
}

impl TimerService {
    pub fn new(store: DynTimerStore, wake: WakeHandle) -> Self {
        Self { store, wake }
    }

    /// Persist a timer and, when its deadline precedes whatever the loop is
    /// currently sleeping toward, interrupt that sleep. A deadline in the
    /// past is clamped to the creation instant and fires on the loop's next
    /// pass.
    pub async fn create_timer(&self, dto: CreateTimerDto) -> Result<TimerDto, TimerError> {
        // Reject payloads the store encoding cannot hold before any write.
        let extra = TimerExtra {
            args: dto.args.clone(),
            kwargs: dto.kwargs.clone(),
        };
        serde_json::to_string(&extra).map_err(|e| TimerError::Serialization(e.to_string()))?;

        let now = Utc::now().naive_utc();
        let expires_at = dto.expires_at.naive_utc().max(now);

        let stored = StoredTimer {
            timer_id: Uuid::new_v4().to_string(),
            event: dto.event,
            created_at: now,
            expires_at,
            status: STATUS_PENDING.to_string(),
            precise: dto.precise,
            args: dto.args,
            kwargs: dto.kwargs,
        };

        self.store.insert_timer(&stored).await?;
        self.wake.notify_created(stored.expires_at).await;

        info!(
            timer_id = %stored.timer_id,
            event = %stored.event,
            "🕒 Timer created to fire at {}",
            stored.expires_at
        );
        Ok(TimerDto::from(stored))
    }

    pub async fn get_timer(&self, timer_id: &str) -> Result<TimerDto, TimerError> {
        let stored = self
            .store
            .get_timer(timer_id)
            .await?
            .ok_or_else(|| TimerError::NotFound(timer_id.to_string()))?;
        Ok(TimerDto::from(stored))
    }

    /// Remove a timer from future consideration. A no-op if the timer never
    /// existed or was already removed; a timer the loop has already selected
    /// for its current wait still fires.
    pub async fn delete_timer(&self, timer_id: &str) -> Result<(), TimerError> {
        let removed = self.store.delete_timer(timer_id).await?;
        if removed {
            debug!(%timer_id, "🗑️ Timer deleted");
        } else {
            debug!(%timer_id, "delete_timer: no such timer");
        }
        Ok(())
    }
}
