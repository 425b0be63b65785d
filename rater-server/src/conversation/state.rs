use rater_core::{Rating, SampleId};

/// Where a reviewer is in the dialogue.
///
/// `Selecting`, `Recording` and `Purging` only exist while a store call is in
/// flight; the engine never stores them between inbound messages.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConversationState {
    #[default]
    Idle,

    Selecting,

    /// Sample shown, waiting for "Evaluate".
    AwaitingReady { sample_id: SampleId },

    AwaitingRelevance { sample_id: SampleId },

    AwaitingQuality {
        sample_id: SampleId,
        relevance: Rating,
    },

    Recording {
        sample_id: SampleId,
        relevance: Rating,
        quality: Rating,
    },

    /// Rating stored, waiting for yes/no on another sample.
    AwaitingContinue,

    /// Admin asked to delete everything, waiting for confirmation.
    AwaitingPurgeConfirm,

    Purging,
}

impl ConversationState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Waiting on a store result rather than on the reviewer.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Selecting | Self::Recording { .. } | Self::Purging)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Selecting => "selecting",
            Self::AwaitingReady { .. } => "awaiting_ready",
            Self::AwaitingRelevance { .. } => "awaiting_relevance",
            Self::AwaitingQuality { .. } => "awaiting_quality",
            Self::Recording { .. } => "recording",
            Self::AwaitingContinue => "awaiting_continue",
            Self::AwaitingPurgeConfirm => "awaiting_purge_confirm",
            Self::Purging => "purging",
        }
    }
}
