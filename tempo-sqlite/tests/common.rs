use sqlx::SqlitePool;
use tempo_sqlite::schema;

pub async fn setup_pool() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
    schema::init_schema(&pool).await.unwrap();
    pool
}
