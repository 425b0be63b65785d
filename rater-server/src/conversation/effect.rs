//! Effects (side effects as data).
//!
//! The transition function only describes what should happen; the engine
//! performs it and turns store results back into events.

use rater_core::{Rating, SampleId};

use crate::transport::{Keyboard, TextFormat};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Reply {
        text: String,
        format: TextFormat,
        keyboard: Keyboard,
    },

    /// Run the assignment selector for this reviewer.
    SelectNext,

    RecordInteraction {
        sample_id: SampleId,
        relevance: Rating,
        quality: Rating,
    },

    /// Send the filler image with a caption.
    SendFiller { caption: String },

    Purge,
}

impl Effect {
    pub fn reply(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self::Reply {
            text: text.into(),
            format: TextFormat::Plain,
            keyboard,
        }
    }

    pub fn reply_html(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self::Reply {
            text: text.into(),
            format: TextFormat::Html,
            keyboard,
        }
    }
}
