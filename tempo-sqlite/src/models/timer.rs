use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Timer {
    pub timer_id: String,
    pub event: String,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
    pub status: String, // "pending" | "fired"
    pub extra: String,  // JSON text: {"args": [...], "kwargs": {...}}
    pub precise: bool,
}
