//! Assignment ordering. Pure functions, no DB calls.
//!
//! Eligible samples are those the reviewer has not rated. Among them the
//! sample with the fewest recorded interactions wins; samples nobody has rated
//! carry no count at all and sort before every counted sample (NULLS FIRST).
//! Remaining ties go to the lowest id. `PgSampleStore` expresses the same
//! ordering in SQL; `MemorySampleStore` calls this directly.

use std::collections::{HashMap, HashSet};

use crate::models::{Interaction, ReviewerId, Sample, SampleId};

/// Ordering key: `None` (never rated) sorts before any `Some(count)`.
pub fn selection_key(counts: &HashMap<SampleId, usize>, id: SampleId) -> (Option<usize>, SampleId) {
    (counts.get(&id).copied(), id)
}

/// Interactions recorded per sample. Samples without ratings are absent.
pub fn interaction_counts(interactions: &[Interaction]) -> HashMap<SampleId, usize> {
    let mut counts = HashMap::new();
    for interaction in interactions {
        *counts.entry(interaction.item_id).or_insert(0) += 1;
    }
    counts
}

pub fn pick_next<'a>(
    samples: &'a [Sample],
    interactions: &[Interaction],
    reviewer_id: ReviewerId,
) -> Option<&'a Sample> {
    let rated: HashSet<SampleId> = interactions
        .iter()
        .filter(|i| i.user_id == reviewer_id)
        .map(|i| i.item_id)
        .collect();
    let counts = interaction_counts(interactions);

    samples
        .iter()
        .filter(|s| !rated.contains(&s.id))
        .min_by_key(|s| selection_key(&counts, s.id))
}
