use rater_core::store::PurgeReport;
use rater_core::Sample;

/// Everything that can move a reviewer's dialogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // =========================================================================
    // Reviewer input
    // =========================================================================
    /// `/get_text`
    RequestSample,

    /// `/cancel`
    Cancel,

    /// `/drop_all`, already authorized by the admin gate.
    RequestPurge,

    /// Any non-command text; matched against the current state's pattern.
    Text(String),

    // =========================================================================
    // Store results
    // =========================================================================
    SampleSelected(Sample),

    /// The reviewer has rated every sample.
    SamplesExhausted,

    SelectionFailed,

    InteractionRecorded,

    RecordingFailed,

    PurgeCompleted(PurgeReport),

    PurgeFailed,

    // =========================================================================
    // Transport results
    // =========================================================================
    /// A dialogue message could not be delivered to the reviewer.
    DeliveryFailed,
}

impl Event {
    /// Whether the event came from the reviewer rather than the store.
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            Self::RequestSample | Self::Cancel | Self::RequestPurge | Self::Text(_)
        )
    }
}
