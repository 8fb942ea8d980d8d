use chrono::Utc;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, error, info};

use tempo_common::SchedulerConfig;
use tempo_storage::entities::timer::StoredTimer;
use tempo_storage::DynTimerStore;

use crate::dispatcher::TimerDispatcher;
use crate::signal::WakeHandle;

/// The single waiting-and-dispatching task. Any number of tasks create and
/// delete timers concurrently through the store; only this loop waits on
/// deadlines, and only it consumes the wake signal.
///
/// The loop alternates between idle (nothing pending within the horizon),
/// waiting (sleeping toward the earliest pending deadline, interruptibly),
/// and dispatching. Store failures at any step are retried after a delay;
/// the loop itself never exits.
pub struct Scheduler {
    store: DynTimerStore,
    dispatcher: Arc<TimerDispatcher>,
    wake: WakeHandle,
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(
        store: DynTimerStore,
        dispatcher: Arc<TimerDispatcher>,
        wake: WakeHandle,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            store,
            dispatcher,
            wake,
            config,
        }
    }

    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    pub async fn run(&self) {
        info!("⏱️ Scheduler loop started ({})", self.config.summary());
        loop {
            self.tick().await;
        }
    }

    /// One pass: find the earliest pending timer within the horizon, wait
    /// toward it (or idle), and dispatch it when its deadline passes.
    async fn tick(&self) {
        let bound = Utc::now().naive_utc() + self.config.horizon();

        let next = match self.store.earliest_pending(bound).await {
            Ok(next) => next,
            Err(e) => {
                error!("❌ Timer query failed, retrying: {e}");
                sleep(self.config.retry_delay()).await;
                return;
            }
        };

        let Some(timer) = next else {
            // Nothing within the horizon. A timer further out is picked up
            // by the fallback re-poll after one horizon; a nearer insert
            // wakes us through the signal.
            self.wake.set_target(None).await;
            debug!("💤 No pending timers within horizon");
            tokio::select! {
                _ = self.wake.wait() => debug!("🔔 Woken by new timer"),
                _ = sleep(self.config.sleep_ceiling()) => {}
            }
            return;
        };

        self.wake.set_target(Some(timer.expires_at)).await;

        let remaining = timer.expires_at - Utc::now().naive_utc();
        if let Ok(wait) = remaining.to_std() {
            debug!(
                timer_id = %timer.timer_id,
                event = %timer.event,
                "⏳ Waiting {}s until next timer",
                wait.as_secs()
            );
            tokio::select! {
                _ = self.wake.wait() => {
                    // A nearer timer may have appeared, but another writer
                    // may have raced it: discard the held timer and re-query
                    // rather than trusting the newcomer.
                    debug!(timer_id = %timer.timer_id, "🔔 Wait interrupted, re-querying");
                    self.wake.set_target(None).await;
                    return;
                }
                _ = sleep(wait) => {}
            }
        }
        // negative remaining: already due, dispatch without waiting

        self.wake.set_target(None).await;
        self.fire(timer).await;
    }

    async fn fire(&self, timer: StoredTimer) {
        match self.store.mark_fired(&timer.timer_id).await {
            Ok(marked) => {
                if !marked {
                    // The row was deleted while we slept. Deletion does not
                    // retroactively cancel an in-flight wait: the held timer
                    // still fires.
                    debug!(
                        timer_id = %timer.timer_id,
                        "Timer row gone before dispatch, firing held copy anyway"
                    );
                }
                info!(
                    timer_id = %timer.timer_id,
                    event = %timer.event,
                    "⏰ Timer expired, dispatching"
                );
                self.dispatcher.dispatch(timer);
            }
            Err(e) => {
                // Leave the row pending; the next pass re-selects it once
                // the store is reachable again.
                error!(
                    timer_id = %timer.timer_id,
                    "❌ Failed to mark timer fired, will retry: {e}"
                );
                sleep(self.config.retry_delay()).await;
            }
        }
    }
}
