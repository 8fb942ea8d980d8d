use crate::models::timer::Timer;
use chrono::NaiveDateTime;
use sqlx::{Executor, Result, Sqlite};

pub async fn create_timer<'e, E>(executor: E, timer: &Timer) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO timers (
            timer_id, event, created_at, expires_at, status, extra, precise
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&timer.timer_id)
    .bind(&timer.event)
    .bind(timer.created_at)
    .bind(timer.expires_at)
    .bind(&timer.status)
    .bind(&timer.extra)
    .bind(timer.precise)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get_timer<'e, E>(executor: E, timer_id: &str) -> Result<Option<Timer>>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Timer>(
        r#"
        SELECT timer_id, event, created_at, expires_at, status, extra, precise
        FROM timers WHERE timer_id = ?
        "#,
    )
    .bind(timer_id)
    .fetch_optional(executor)
    .await
}

/// Ok(false) when no row matched; deleting twice is not an error.
pub async fn delete_timer<'e, E>(executor: E, timer_id: &str) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM timers WHERE timer_id = ?")
        .bind(timer_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Flip a pending timer to fired so it is never selected again.
/// Ok(false) when the row is absent or already fired.
pub async fn mark_fired<'e, E>(executor: E, timer_id: &str) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "UPDATE timers SET status = 'fired' WHERE timer_id = ? AND status = 'pending'",
    )
    .bind(timer_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// The single pending timer with the smallest expires_at no later than
/// `before`. Overdue rows qualify. Equal deadlines order by timer_id.
pub async fn earliest_pending<'e, E>(
    executor: E,
    before: NaiveDateTime,
) -> Result<Option<Timer>>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Timer>(
        r#"
        SELECT timer_id, event, created_at, expires_at, status, extra, precise
        FROM timers
        WHERE status = 'pending' AND expires_at <= ?
        ORDER BY expires_at ASC, timer_id ASC
        LIMIT 1
        "#,
    )
    .bind(before)
    .fetch_optional(executor)
    .await
}
