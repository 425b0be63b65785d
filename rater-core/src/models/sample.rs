use serde::{Deserialize, Serialize};

use super::SampleId;

/// Column width of `item.label`.
pub const LABEL_MAX_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Sample {
    pub id: SampleId,
    pub label: String,
    pub content: String,
}

/// A sample that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSample {
    pub label: String,
    pub content: String,
}

impl NewSample {
    pub fn new(label: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            content: content.into(),
        }
    }

    /// Whether the label fits the `item.label` column.
    pub fn label_fits(&self) -> bool {
        self.label.chars().count() <= LABEL_MAX_LEN
    }
}
