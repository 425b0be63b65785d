//! Sample Store abstraction.
//!
//! `SampleStore` owns every persisted row: samples (`item`) and ratings
//! (`interaction`). Each mutating call is one transactional scope: it either
//! commits fully or rolls back and returns a `StoreError`. Implementations:
//! - `PgSampleStore`: PostgreSQL via sqlx
//! - `MemorySampleStore`: in-process, same constraints, used by tests

use async_trait::async_trait;
use serde::Serialize;

use crate::error::StoreError;
use crate::models::{Interaction, NewSample, ReviewerId, Sample, SampleId};

/// Table names in dependency order (parents first).
pub const TABLES: [&str; 2] = ["item", "interaction"];

/// One table's rows as exported, without the leading identity column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDump {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableDump {
    pub fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

/// Exported `item` columns. `id` is omitted.
pub const ITEM_EXPORT_COLUMNS: [&str; 2] = ["label", "content"];

/// Exported `interaction` columns. `user_id` is omitted.
pub const INTERACTION_EXPORT_COLUMNS: [&str; 3] = ["item_id", "relevance", "quality"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
    pub samples: i64,
    pub interactions: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    pub samples_deleted: u64,
    pub interactions_deleted: u64,
}

#[async_trait]
pub trait SampleStore: Send + Sync {
    /// Insert one sample and return its id.
    async fn add_sample(&self, sample: NewSample) -> Result<SampleId, StoreError>;

    /// Insert a batch of samples atomically: all are stored or none are.
    async fn add_samples(&self, batch: Vec<NewSample>) -> Result<Vec<SampleId>, StoreError>;

    /// Record one reviewer's ratings for one sample.
    ///
    /// Fails with `DuplicateInteraction` when the pair already exists and with
    /// `Reference` when the sample is unknown. The existing row is never altered.
    async fn record_interaction(&self, interaction: Interaction) -> Result<(), StoreError>;

    /// The next sample the reviewer has not rated, least-rated first.
    async fn select_next(&self, reviewer_id: ReviewerId) -> Result<Option<Sample>, StoreError>;

    /// Every table in dependency order.
    async fn export_all(&self) -> Result<Vec<TableDump>, StoreError>;

    /// Delete every row, children before parents.
    async fn purge_all(&self) -> Result<PurgeReport, StoreError>;

    async fn counts(&self) -> Result<StoreCounts, StoreError>;
}
