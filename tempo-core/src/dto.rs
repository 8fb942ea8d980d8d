use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tempo_storage::entities::timer::StoredTimer;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimerDto {
    pub timer_id: String,
    pub event: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: String,
    pub precise: bool,
    pub args: Vec<Value>,
    pub kwargs: Map<String, Value>,
}

impl From<StoredTimer> for TimerDto {
    fn from(stored: StoredTimer) -> Self {
        Self {
            timer_id: stored.timer_id,
            event: stored.event,
            created_at: DateTime::from_naive_utc_and_offset(stored.created_at, Utc),
            expires_at: DateTime::from_naive_utc_and_offset(stored.expires_at, Utc),
            status: stored.status,
            precise: stored.precise,
            args: stored.args,
            kwargs: stored.kwargs,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTimerDto {
    pub event: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub kwargs: Map<String, Value>,
    #[serde(default = "default_precise")]
    pub precise: bool,
}

fn default_precise() -> bool {
    true
}

impl CreateTimerDto {
    pub fn new(event: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            event: event.into(),
            expires_at,
            args: Vec::new(),
            kwargs: Map::new(),
            precise: true,
        }
    }
}
