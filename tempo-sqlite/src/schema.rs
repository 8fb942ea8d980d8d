use sqlx::SqlitePool;

pub const CREATE_TIMERS: &str = r#"
CREATE TABLE IF NOT EXISTS timers (
    timer_id   TEXT PRIMARY KEY,
    event      TEXT NOT NULL,
    created_at DATETIME NOT NULL,
    expires_at DATETIME NOT NULL,
    status     TEXT NOT NULL DEFAULT 'pending',
    extra      TEXT NOT NULL,
    precise    BOOLEAN NOT NULL
);
"#;

pub const CREATE_TIMERS_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_timers_status_expires
    ON timers (status, expires_at);
"#;

pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_TIMERS).execute(pool).await?;
    sqlx::query(CREATE_TIMERS_INDEX).execute(pool).await?;
    Ok(())
}
