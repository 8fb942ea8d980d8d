use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::dto::TimerDto;
use tempo_storage::entities::timer::StoredTimer;

/// What a handler receives when its timer's deadline passes.
#[derive(Debug, Clone)]
pub enum TimerCompletion {
    /// Precise timers reproduce the original call payload.
    Args {
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    },
    /// Non-precise timers hand over the whole record, id and timestamps
    /// included.
    Timer(TimerDto),
}

/// One feature's reversal logic, bound to an event name at startup.
#[async_trait]
pub trait TimerHandler: Send + Sync {
    async fn on_complete(&self, completion: TimerCompletion) -> anyhow::Result<()>;
}

/// Registry from event name to handler. Built once at startup; the loop
/// owns it afterwards.
#[derive(Default)]
pub struct TimerDispatcher {
    handlers: HashMap<String, Arc<dyn TimerHandler>>,
}

impl TimerDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an event name to its handler.
    pub fn register(mut self, event: impl Into<String>, handler: Arc<dyn TimerHandler>) -> Self {
        self.handlers.insert(event.into(), handler);
        self
    }

    pub fn get(&self, event: &str) -> Option<&Arc<dyn TimerHandler>> {
        self.handlers.get(event)
    }

    /// Hand an expired timer to its registered handler. The handler runs on
    /// its own task so the loop can proceed to the next deadline; failures
    /// are logged here and never reach the loop. A timer whose event has no
    /// handler (e.g. a feature since disabled) is dropped with a warning.
    pub fn dispatch(&self, timer: StoredTimer) {
        let Some(handler) = self.handlers.get(&timer.event) else {
            warn!(
                timer_id = %timer.timer_id,
                event = %timer.event,
                "⚠️ No handler registered, dropping timer"
            );
            return;
        };

        let timer_id = timer.timer_id.clone();
        let event = timer.event.clone();
        let completion = if timer.precise {
            TimerCompletion::Args {
                args: timer.args,
                kwargs: timer.kwargs,
            }
        } else {
            TimerCompletion::Timer(TimerDto::from(timer))
        };

        let handler = handler.clone();
        tokio::spawn(async move {
            debug!(%timer_id, %event, "🔔 Timer complete, invoking handler");
            if let Err(e) = handler.on_complete(completion).await {
                error!(%timer_id, %event, "❌ Timer handler failed: {e}");
            }
        });
    }
}
