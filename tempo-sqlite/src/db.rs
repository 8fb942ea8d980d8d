use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::Duration;

/// Open (or create) the timers database and apply the schema.
pub async fn connect(db_path: &str) -> Result<Pool<Sqlite>, sqlx::Error> {
    let db_url = format!("sqlite://{}", db_path);

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    crate::schema::init_schema(&pool).await?;
    Ok(pool)
}
