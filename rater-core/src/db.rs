use crate::config::DatabaseConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};

/// Schema for the `item` and `interaction` tables. Idempotent.
///
/// `interaction.item_id` has no ON DELETE rule: deleting a rated item is
/// rejected, so samples only disappear through a full purge.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS item (
        id      SERIAL PRIMARY KEY,
        label   VARCHAR(32) NOT NULL,
        content TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS interaction (
        user_id   BIGINT NOT NULL,
        item_id   INTEGER NOT NULL REFERENCES item (id),
        relevance SMALLINT NOT NULL CHECK (relevance BETWEEN 1 AND 5),
        quality   SMALLINT NOT NULL CHECK (quality BETWEEN 1 AND 5),
        PRIMARY KEY (user_id, item_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS interaction_item_id_idx ON interaction (item_id)",
];

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
}

/// Create missing tables inside one transaction.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for statement in SCHEMA {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    tracing::info!("Database schema ready");
    Ok(())
}

pub async fn health_check(pool: &PgPool) -> Result<String, sqlx::Error> {
    let row: (String,) = sqlx::query_as("SELECT version()").fetch_one(pool).await?;
    Ok(row.0)
}
