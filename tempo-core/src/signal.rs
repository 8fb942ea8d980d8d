use chrono::NaiveDateTime;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

/// Cooperative interrupt for the scheduler loop. Waking is idempotent: a
/// stored permit survives until the loop's next wait consumes it, so a
/// writer can never lose a wake-up by racing the loop between query and
/// sleep.
#[derive(Default, Clone)]
pub struct WakeSignal {
    notify: Arc<Notify>,
}

impl WakeSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wake(&self) {
        self.notify.notify_one();
    }

    pub async fn wait(&self) {
        self.notify.notified().await;
    }
}

/// Shared view of the loop's current wait target plus the signal that
/// interrupts it. The loop publishes the deadline it is sleeping toward
/// (None while idle or dispatching); writers consult it to decide whether
/// a freshly inserted timer must preempt the current sleep.
#[derive(Default, Clone)]
pub struct WakeHandle {
    signal: WakeSignal,
    target: Arc<Mutex<Option<NaiveDateTime>>>,
}

impl WakeHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn set_target(&self, deadline: Option<NaiveDateTime>) {
        *self.target.lock().await = deadline;
    }

    pub(crate) async fn wait(&self) {
        self.signal.wait().await;
    }

    /// Rescheduling rule: wake the loop when it has no wait target, or when
    /// the new deadline is strictly earlier than the one it sleeps toward.
    pub async fn notify_created(&self, expires_at: NaiveDateTime) {
        let target = self.target.lock().await;
        match *target {
            None => self.signal.wake(),
            Some(current) if expires_at < current => self.signal.wake(),
            Some(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_wake_before_wait_is_not_lost() {
        let signal = WakeSignal::new();
        signal.wake();
        // the permit from the earlier wake completes this wait immediately
        timeout(Duration::from_millis(50), signal.wait())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_wake_is_idempotent() {
        let signal = WakeSignal::new();
        signal.wake();
        signal.wake();
        signal.wake();
        // only one permit is stored
        timeout(Duration::from_millis(50), signal.wait())
            .await
            .unwrap();
        assert!(timeout(Duration::from_millis(50), signal.wait())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_notify_created_wakes_when_idle() {
        let handle = WakeHandle::new();
        handle.set_target(None).await;
        handle.notify_created(Utc::now().naive_utc()).await;
        timeout(Duration::from_millis(50), handle.wait())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_notify_created_wakes_only_for_nearer_deadline() {
        let handle = WakeHandle::new();
        let now = Utc::now().naive_utc();
        handle.set_target(Some(now + chrono::Duration::seconds(60))).await;

        // later than the current target: no wake
        handle
            .notify_created(now + chrono::Duration::seconds(120))
            .await;
        assert!(timeout(Duration::from_millis(50), handle.wait())
            .await
            .is_err());

        // strictly earlier: wake
        handle
            .notify_created(now + chrono::Duration::seconds(10))
            .await;
        timeout(Duration::from_millis(50), handle.wait())
            .await
            .unwrap();
    }
}
