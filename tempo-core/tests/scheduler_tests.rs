use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Instant};

use tempo_common::SchedulerConfig;
use tempo_core::{
    build_runtime, CreateTimerDto, TimerCompletion, TimerDispatcher, TimerError, TimerHandler,
    TimerService,
};
use tempo_storage::entities::timer::{StoredTimer, STATUS_PENDING};
use tempo_storage::{DynTimerStore, MemoryTimerStore, TimerStorage};

struct Recorder {
    tx: mpsc::UnboundedSender<(String, Instant)>,
}

#[async_trait]
impl TimerHandler for Recorder {
    async fn on_complete(&self, completion: TimerCompletion) -> anyhow::Result<()> {
        let label = match completion {
            TimerCompletion::Args { kwargs, .. } => kwargs
                .get("label")
                .and_then(|v| v.as_str())
                .unwrap_or("?")
                .to_string(),
            TimerCompletion::Timer(dto) => dto
                .kwargs
                .get("label")
                .and_then(|v| v.as_str())
                .unwrap_or("?")
                .to_string(),
        };
        self.tx.send((label, Instant::now()))?;
        Ok(())
    }
}

fn setup(
    events: &[&str],
) -> (
    TimerService,
    JoinHandle<()>,
    mpsc::UnboundedReceiver<(String, Instant)>,
    DynTimerStore,
) {
    tracing_subscriber::fmt()
        .with_env_filter("tempo_core=debug")
        .with_test_writer()
        .try_init()
        .ok();

    let store: DynTimerStore = Arc::new(MemoryTimerStore::new());
    let (tx, rx) = mpsc::unbounded_channel();
    let mut dispatcher = TimerDispatcher::new();
    for event in events {
        dispatcher = dispatcher.register(*event, Arc::new(Recorder { tx: tx.clone() }));
    }
    let (service, scheduler) = build_runtime(SchedulerConfig::default(), store.clone(), dispatcher);
    let loop_handle = scheduler.spawn();
    (service, loop_handle, rx, store)
}

fn in_ms(ms: i64) -> DateTime<Utc> {
    Utc::now() + ChronoDuration::milliseconds(ms)
}

fn labeled(event: &str, label: &str, ms: i64) -> CreateTimerDto {
    let mut dto = CreateTimerDto::new(event, in_ms(ms));
    dto.kwargs.insert("label".to_string(), json!(label));
    dto
}

async fn recv(
    rx: &mut mpsc::UnboundedReceiver<(String, Instant)>,
    within: Duration,
) -> (String, Instant) {
    timeout(within, rx.recv())
        .await
        .expect("timed out waiting for dispatch")
        .expect("dispatch channel closed")
}

#[tokio::test]
async fn test_nearer_timer_preempts_current_wait() {
    let (service, _loop_handle, mut rx, _store) = setup(&["reminder"]);

    let start = Instant::now();
    service.create_timer(labeled("reminder", "A", 900)).await.unwrap();
    // inserted while the loop is already sleeping toward A
    service.create_timer(labeled("reminder", "B", 250)).await.unwrap();

    let (first, at_first) = recv(&mut rx, Duration::from_secs(3)).await;
    assert_eq!(first, "B");
    // B fired at ~250ms, not after A's 900ms deadline
    assert!(at_first - start < Duration::from_millis(800));

    let (second, at_second) = recv(&mut rx, Duration::from_secs(3)).await;
    assert_eq!(second, "A");
    assert!(at_second - start >= Duration::from_millis(850));
}

#[tokio::test]
async fn test_dispatch_order_non_decreasing_in_deadline() {
    let (service, _loop_handle, mut rx, _store) = setup(&["reminder"]);

    // scrambled insertion order
    service.create_timer(labeled("reminder", "t600", 600)).await.unwrap();
    service.create_timer(labeled("reminder", "t300", 300)).await.unwrap();
    service.create_timer(labeled("reminder", "t450", 450)).await.unwrap();

    let mut order = Vec::new();
    for _ in 0..3 {
        let (label, _) = recv(&mut rx, Duration::from_secs(3)).await;
        order.push(label);
    }
    assert_eq!(order, vec!["t300", "t450", "t600"]);
}

#[tokio::test]
async fn test_timer_never_fires_early() {
    let (service, _loop_handle, mut rx, _store) = setup(&["reminder"]);

    let start = Instant::now();
    service.create_timer(labeled("reminder", "late", 400)).await.unwrap();

    // quiet until the deadline
    assert!(timeout(Duration::from_millis(250), rx.recv()).await.is_err());

    let (label, at) = recv(&mut rx, Duration::from_secs(3)).await;
    assert_eq!(label, "late");
    assert!(at - start >= Duration::from_millis(370));
}

#[tokio::test]
async fn test_restart_recovers_persisted_timers_in_order() {
    let store: DynTimerStore = Arc::new(MemoryTimerStore::new());
    let now = Utc::now().naive_utc();

    // rows left behind by a previous process, two of them overdue
    for (id, label, offset_ms) in [
        ("t1", "oldest", -2000_i64),
        ("t2", "older", -1000),
        ("t3", "upcoming", 250),
    ] {
        let mut kwargs = serde_json::Map::new();
        kwargs.insert("label".to_string(), json!(label));
        store
            .insert_timer(&StoredTimer {
                timer_id: id.to_string(),
                event: "reminder".to_string(),
                created_at: now - ChronoDuration::hours(1),
                expires_at: now + ChronoDuration::milliseconds(offset_ms),
                status: STATUS_PENDING.to_string(),
                precise: true,
                args: Vec::new(),
                kwargs,
            })
            .await
            .unwrap();
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let dispatcher = TimerDispatcher::new().register("reminder", Arc::new(Recorder { tx }));
    let (_service, scheduler) = build_runtime(SchedulerConfig::default(), store.clone(), dispatcher);
    let _loop_handle = scheduler.spawn();

    let mut order = Vec::new();
    for _ in 0..3 {
        let (label, _) = recv(&mut rx, Duration::from_secs(3)).await;
        order.push(label);
    }
    assert_eq!(order, vec!["oldest", "older", "upcoming"]);
}

#[tokio::test]
async fn test_delete_timer_is_idempotent_and_get_reports_not_found() {
    let (service, _loop_handle, _rx, _store) = setup(&["reminder"]);

    let dto = service
        .create_timer(labeled("reminder", "doomed", 60_000))
        .await
        .unwrap();

    service.delete_timer(&dto.timer_id).await.unwrap();
    // second delete is a no-op, never an error
    service.delete_timer(&dto.timer_id).await.unwrap();

    match service.get_timer(&dto.timer_id).await {
        Err(TimerError::NotFound(id)) => assert_eq!(id, dto.timer_id),
        other => panic!("expected NotFound, got {:?}", other.map(|d| d.timer_id)),
    }
}

#[tokio::test]
async fn test_far_future_timer_does_not_block_near_one() {
    let (service, _loop_handle, mut rx, store) = setup(&["reminder", "blacklist"]);

    // 100 days out: beyond the 40-day horizon, the loop idles instead of
    // sleeping toward it
    let far = service
        .create_timer(labeled("blacklist", "far", 100 * 24 * 3600 * 1000))
        .await
        .unwrap();

    service.create_timer(labeled("reminder", "near", 250)).await.unwrap();

    let (label, _) = recv(&mut rx, Duration::from_secs(3)).await;
    assert_eq!(label, "near");

    // the far timer is still pending and the loop is still alive
    let far_stored = store.get_timer(&far.timer_id).await.unwrap().unwrap();
    assert_eq!(far_stored.status, "pending");

    service.create_timer(labeled("reminder", "again", 150)).await.unwrap();
    let (label, _) = recv(&mut rx, Duration::from_secs(3)).await;
    assert_eq!(label, "again");
}

#[tokio::test]
async fn test_delete_during_wait_still_fires_held_timer() {
    let (service, _loop_handle, mut rx, _store) = setup(&["tempmute"]);

    let dto = service
        .create_timer(labeled("tempmute", "raced", 400))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    // the loop has already committed to this wait; deletion does not
    // retroactively cancel it
    service.delete_timer(&dto.timer_id).await.unwrap();

    let (label, _) = recv(&mut rx, Duration::from_secs(3)).await;
    assert_eq!(label, "raced");
}

#[tokio::test]
async fn test_unhandled_event_is_dropped_without_stalling_the_loop() {
    let (service, _loop_handle, mut rx, _store) = setup(&["reminder"]);

    // no handler bound for this event; the loop logs and moves on
    service.create_timer(labeled("ghost", "ghost", 150)).await.unwrap();
    service.create_timer(labeled("reminder", "real", 350)).await.unwrap();

    let (label, _) = recv(&mut rx, Duration::from_secs(3)).await;
    assert_eq!(label, "real");
    assert!(timeout(Duration::from_millis(100), rx.recv()).await.is_err());
}

#[tokio::test]
async fn test_past_deadline_fires_immediately() {
    let (service, _loop_handle, mut rx, _store) = setup(&["reminder"]);

    let dto = service
        .create_timer(labeled("reminder", "asap", -5000))
        .await
        .unwrap();
    // the past deadline was clamped: the record never expires before it exists
    assert!(dto.expires_at >= dto.created_at);

    let start = Instant::now();
    let (label, at) = recv(&mut rx, Duration::from_secs(3)).await;
    assert_eq!(label, "asap");
    assert!(at - start < Duration::from_millis(1000));
}
