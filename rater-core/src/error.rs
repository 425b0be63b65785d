use thiserror::Error;

use crate::models::{ReviewerId, SampleId};

/// Failures raised by a `SampleStore`.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Constraint violation on write (label too long, rating out of range, ...).
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Reviewer {reviewer_id} already rated sample {sample_id}")]
    DuplicateInteraction {
        reviewer_id: ReviewerId,
        sample_id: SampleId,
    },

    /// The referenced sample does not exist (e.g. purged mid-dialogue).
    #[error("Sample {0} does not exist")]
    Reference(SampleId),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl StoreError {
    /// Classify a driver error raised while recording an interaction.
    pub fn from_interaction_insert(
        err: sqlx::Error,
        reviewer_id: ReviewerId,
        sample_id: SampleId,
    ) -> Self {
        match &err {
            sqlx::Error::Database(db) => match db.kind() {
                sqlx::error::ErrorKind::UniqueViolation => Self::DuplicateInteraction {
                    reviewer_id,
                    sample_id,
                },
                sqlx::error::ErrorKind::ForeignKeyViolation => Self::Reference(sample_id),
                _ => Self::Persistence(db.message().to_string()),
            },
            _ => Self::Database(err),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) => Self::Persistence(db.message().to_string()),
            _ => Self::Database(err),
        }
    }
}

#[derive(Error, Debug)]
pub enum RaterError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    /// A non-admin invoked an admin operation. Callers treat this as a silent no-op.
    #[error("User {0} is not authorized for admin operations")]
    Unauthorized(ReviewerId),
}
