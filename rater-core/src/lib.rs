pub mod config;
pub mod db;
pub mod error;
pub mod memory_store;
pub mod models;
pub mod pg_store;
pub mod selection;
pub mod store;

pub use config::RaterConfig;
pub use error::{RaterError, StoreError};
pub use memory_store::MemorySampleStore;
pub use models::{Interaction, NewSample, Rating, ReviewerId, Sample, SampleId};
pub use pg_store::PgSampleStore;
pub use store::{PurgeReport, SampleStore, StoreCounts, TableDump};
