pub mod interaction;
pub mod rating;
pub mod sample;

pub use interaction::Interaction;
pub use rating::Rating;
pub use sample::{NewSample, Sample, LABEL_MAX_LEN};

/// Telegram user id of a reviewer.
pub type ReviewerId = i64;

/// Store-assigned sample id.
pub type SampleId = i32;
