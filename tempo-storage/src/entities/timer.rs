use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_FIRED: &str = "fired";

/// One scheduled action: a named event, a deadline, and a JSON payload.
/// Identity and timestamps never change after the row is persisted; the
/// only mutation the store performs is the pending→fired status flip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredTimer {
    pub timer_id: String, // UUID, assigned at creation, never reused
    pub event: String,    // handler lookup key
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime, // always >= created_at
    pub status: String,            // "pending" | "fired"
    pub precise: bool,
    pub args: Vec<Value>,
    pub kwargs: Map<String, Value>,
}

/// JSON shape of the `extra` column: {"args": [...], "kwargs": {...}}.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TimerExtra {
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub kwargs: Map<String, Value>,
}
