use serde::{Deserialize, Serialize};

use super::{Rating, ReviewerId, SampleId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub user_id: ReviewerId,
    pub item_id: SampleId,
    pub relevance: Rating,
    pub quality: Rating,
}

impl Interaction {
    pub fn new(user_id: ReviewerId, item_id: SampleId, relevance: Rating, quality: Rating) -> Self {
        Self {
            user_id,
            item_id,
            relevance,
            quality,
        }
    }
}
