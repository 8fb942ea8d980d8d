use anyhow::Result;
use std::sync::Arc;

use tempo_common::SchedulerConfig;
use tempo_storage::{DynTimerStore, TimerPersistence};

use crate::dispatcher::TimerDispatcher;
use crate::scheduler::Scheduler;
use crate::service::TimerService;
use crate::signal::WakeHandle;

/// Wire a service/loop pair over one store. Register every handler on the
/// dispatcher before calling this; the loop owns the registry afterwards.
pub fn build_runtime(
    config: SchedulerConfig,
    store: DynTimerStore,
    dispatcher: TimerDispatcher,
) -> (TimerService, Scheduler) {
    let wake = WakeHandle::new();
    let service = TimerService::new(store.clone(), wake.clone());
    let scheduler = Scheduler::new(store, Arc::new(dispatcher), wake, config);
    (service, scheduler)
}

/// Same wiring over the SQLite store at `config.db_path`.
pub async fn build_sqlite_runtime(
    config: SchedulerConfig,
    dispatcher: TimerDispatcher,
) -> Result<(TimerService, Scheduler)> {
    let pool = tempo_sqlite::db::connect(&config.db_path).await?;
    let store: DynTimerStore = Arc::new(TimerPersistence::new(pool));
    Ok(build_runtime(config, store, dispatcher))
}
