//! In-memory implementation of `SampleStore`.
//!
//! Holds both tables behind a single `RwLock`, so every call is atomic with
//! respect to the others. Enforces the same constraints as the PostgreSQL
//! schema. All state is lost on restart.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::{Interaction, NewSample, ReviewerId, Sample, SampleId, LABEL_MAX_LEN};
use crate::selection;
use crate::store::{
    PurgeReport, SampleStore, StoreCounts, TableDump, INTERACTION_EXPORT_COLUMNS,
    ITEM_EXPORT_COLUMNS,
};

#[derive(Debug, Default)]
struct Tables {
    items: Vec<Sample>,
    interactions: Vec<Interaction>,
    next_id: SampleId,
}

impl Tables {
    fn insert(&mut self, sample: NewSample) -> Result<SampleId, StoreError> {
        if !sample.label_fits() {
            return Err(StoreError::Persistence(format!(
                "label exceeds {} characters",
                LABEL_MAX_LEN
            )));
        }
        self.next_id += 1;
        let id = self.next_id;
        self.items.push(Sample {
            id,
            label: sample.label,
            content: sample.content,
        });
        Ok(id)
    }
}

pub struct MemorySampleStore {
    tables: RwLock<Tables>,
}

impl MemorySampleStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }
}

impl Default for MemorySampleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SampleStore for MemorySampleStore {
    async fn add_sample(&self, sample: NewSample) -> Result<SampleId, StoreError> {
        let mut tables = self.tables.write().await;
        tables.insert(sample)
    }

    async fn add_samples(&self, batch: Vec<NewSample>) -> Result<Vec<SampleId>, StoreError> {
        let mut tables = self.tables.write().await;
        let snapshot_len = tables.items.len();
        let snapshot_id = tables.next_id;

        let mut ids = Vec::with_capacity(batch.len());
        for sample in batch {
            match tables.insert(sample) {
                Ok(id) => ids.push(id),
                Err(e) => {
                    tables.items.truncate(snapshot_len);
                    tables.next_id = snapshot_id;
                    tracing::error!(error = %e, "Sample batch rolled back");
                    return Err(e);
                }
            }
        }
        Ok(ids)
    }

    async fn record_interaction(&self, interaction: Interaction) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;

        if !tables.items.iter().any(|s| s.id == interaction.item_id) {
            return Err(StoreError::Reference(interaction.item_id));
        }
        if tables
            .interactions
            .iter()
            .any(|i| i.user_id == interaction.user_id && i.item_id == interaction.item_id)
        {
            return Err(StoreError::DuplicateInteraction {
                reviewer_id: interaction.user_id,
                sample_id: interaction.item_id,
            });
        }

        tables.interactions.push(interaction);
        Ok(())
    }

    async fn select_next(&self, reviewer_id: ReviewerId) -> Result<Option<Sample>, StoreError> {
        let tables = self.tables.read().await;
        Ok(selection::pick_next(&tables.items, &tables.interactions, reviewer_id).cloned())
    }

    async fn export_all(&self) -> Result<Vec<TableDump>, StoreError> {
        let tables = self.tables.read().await;

        let mut items = TableDump::new("item", &ITEM_EXPORT_COLUMNS);
        items.rows = tables
            .items
            .iter()
            .map(|s| vec![s.label.clone(), s.content.clone()])
            .collect();

        let mut ordered = tables.interactions.clone();
        ordered.sort_by_key(|i| (i.user_id, i.item_id));
        let mut interactions = TableDump::new("interaction", &INTERACTION_EXPORT_COLUMNS);
        interactions.rows = ordered
            .iter()
            .map(|i| {
                vec![
                    i.item_id.to_string(),
                    i.relevance.to_string(),
                    i.quality.to_string(),
                ]
            })
            .collect();

        Ok(vec![items, interactions])
    }

    async fn purge_all(&self) -> Result<PurgeReport, StoreError> {
        let mut tables = self.tables.write().await;
        let report = PurgeReport {
            interactions_deleted: tables.interactions.len() as u64,
            samples_deleted: tables.items.len() as u64,
        };
        tables.interactions.clear();
        tables.items.clear();
        Ok(report)
    }

    async fn counts(&self) -> Result<StoreCounts, StoreError> {
        let tables = self.tables.read().await;
        Ok(StoreCounts {
            samples: tables.items.len() as i64,
            interactions: tables.interactions.len() as i64,
        })
    }
}
