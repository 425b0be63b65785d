//! PostgreSQL implementation of `SampleStore`.
//!
//! Every mutating call opens its own transaction and ends through `finish`,
//! which commits on success and rolls back (with a logged diagnostic) on
//! failure. The pooled connection returns to the pool when the transaction
//! is consumed, on every path.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::StoreError;
use crate::models::{Interaction, NewSample, ReviewerId, Sample, SampleId};
use crate::store::{
    PurgeReport, SampleStore, StoreCounts, TableDump, INTERACTION_EXPORT_COLUMNS,
    ITEM_EXPORT_COLUMNS,
};

const SELECT_NEXT_SQL: &str = r#"
    SELECT i.id, i.label, i.content
    FROM item i
    LEFT JOIN (
        SELECT item_id, COUNT(*) AS cnt
        FROM interaction
        GROUP BY item_id
    ) c ON c.item_id = i.id
    WHERE NOT EXISTS (
        SELECT 1 FROM interaction own
        WHERE own.item_id = i.id AND own.user_id = $1
    )
    ORDER BY c.cnt ASC NULLS FIRST, i.id ASC
    LIMIT 1
"#;

#[derive(Debug, Clone)]
pub struct PgSampleStore {
    pool: PgPool,
}

impl PgSampleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Close a transactional scope: commit on `Ok`, roll back and log on `Err`.
async fn finish<T>(
    tx: Transaction<'_, Postgres>,
    operation: &str,
    result: Result<T, StoreError>,
) -> Result<T, StoreError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            tracing::error!(operation, error = %e, "Store operation failed, rolling back");
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(operation, error = %rollback_err, "Rollback failed");
            }
            Err(e)
        }
    }
}

#[async_trait]
impl SampleStore for PgSampleStore {
    async fn add_sample(&self, sample: NewSample) -> Result<SampleId, StoreError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query_scalar::<_, SampleId>(
            "INSERT INTO item (label, content) VALUES ($1, $2) RETURNING id",
        )
        .bind(&sample.label)
        .bind(&sample.content)
        .fetch_one(&mut *tx)
        .await
        .map_err(StoreError::from);
        finish(tx, "add_sample", result).await
    }

    async fn add_samples(&self, batch: Vec<NewSample>) -> Result<Vec<SampleId>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let result = async {
            let mut ids = Vec::with_capacity(batch.len());
            for sample in &batch {
                let id: SampleId = sqlx::query_scalar(
                    "INSERT INTO item (label, content) VALUES ($1, $2) RETURNING id",
                )
                .bind(&sample.label)
                .bind(&sample.content)
                .fetch_one(&mut *tx)
                .await?;
                ids.push(id);
            }
            Ok::<_, StoreError>(ids)
        }
        .await;

        let ids = finish(tx, "add_samples", result).await?;
        tracing::info!(count = ids.len(), "Stored sample batch");
        Ok(ids)
    }

    async fn record_interaction(&self, interaction: Interaction) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            r#"
            INSERT INTO interaction (user_id, item_id, relevance, quality)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(interaction.user_id)
        .bind(interaction.item_id)
        .bind(interaction.relevance.as_i16())
        .bind(interaction.quality.as_i16())
        .execute(&mut *tx)
        .await
        .map(|_| ())
        .map_err(|e| {
            StoreError::from_interaction_insert(e, interaction.user_id, interaction.item_id)
        });
        finish(tx, "record_interaction", result).await
    }

    async fn select_next(&self, reviewer_id: ReviewerId) -> Result<Option<Sample>, StoreError> {
        let sample = sqlx::query_as::<_, Sample>(SELECT_NEXT_SQL)
            .bind(reviewer_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(sample)
    }

    async fn export_all(&self) -> Result<Vec<TableDump>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let result = async {
            // One snapshot for both tables.
            sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
                .execute(&mut *tx)
                .await?;

            let item_rows: Vec<(String, String)> =
                sqlx::query_as("SELECT label, content FROM item ORDER BY id")
                    .fetch_all(&mut *tx)
                    .await?;
            let interaction_rows: Vec<(SampleId, i16, i16)> = sqlx::query_as(
                "SELECT item_id, relevance, quality FROM interaction ORDER BY user_id, item_id",
            )
            .fetch_all(&mut *tx)
            .await?;

            let mut items = TableDump::new("item", &ITEM_EXPORT_COLUMNS);
            items.rows = item_rows
                .into_iter()
                .map(|(label, content)| vec![label, content])
                .collect();

            let mut interactions = TableDump::new("interaction", &INTERACTION_EXPORT_COLUMNS);
            interactions.rows = interaction_rows
                .into_iter()
                .map(|(item_id, relevance, quality)| {
                    vec![item_id.to_string(), relevance.to_string(), quality.to_string()]
                })
                .collect();

            Ok::<_, StoreError>(vec![items, interactions])
        }
        .await;
        finish(tx, "export_all", result).await
    }

    async fn purge_all(&self) -> Result<PurgeReport, StoreError> {
        let mut tx = self.pool.begin().await?;
        let result = async {
            let interactions = sqlx::query("DELETE FROM interaction")
                .execute(&mut *tx)
                .await?;
            let items = sqlx::query("DELETE FROM item").execute(&mut *tx).await?;
            Ok::<_, StoreError>(PurgeReport {
                samples_deleted: items.rows_affected(),
                interactions_deleted: interactions.rows_affected(),
            })
        }
        .await;

        let report = finish(tx, "purge_all", result).await?;
        tracing::info!(
            "Purged {} samples and {} interactions",
            report.samples_deleted,
            report.interactions_deleted
        );
        Ok(report)
    }

    async fn counts(&self) -> Result<StoreCounts, StoreError> {
        let (samples, interactions): (i64, i64) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM item), (SELECT COUNT(*) FROM interaction)",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(StoreCounts {
            samples,
            interactions,
        })
    }
}
