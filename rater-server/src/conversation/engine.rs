//! Effect interpreter for the rating dialogue.
//!
//! The engine is the boundary between the pure transition function and the
//! store and transport. For each inbound event it loads the reviewer's state,
//! runs transitions until no store results remain to feed back, executes the
//! effects in order, and saves the final state.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;
use rater_core::{Interaction, ReviewerId, SampleStore};

use super::effect::Effect;
use super::event::Event;
use super::sessions::SessionRegistry;
use super::state::ConversationState;
use super::transition::transition;
use crate::scope;
use crate::transport::{ChatId, Keyboard, TextFormat, Transport};

#[derive(Clone)]
pub struct ConversationEngine {
    store: Arc<dyn SampleStore>,
    transport: Arc<dyn Transport>,
    sessions: Arc<SessionRegistry>,
    filler_image_url: String,
}

impl ConversationEngine {
    pub fn new(
        store: Arc<dyn SampleStore>,
        transport: Arc<dyn Transport>,
        sessions: Arc<SessionRegistry>,
        filler_image_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            transport,
            sessions,
            filler_image_url: filler_image_url.into(),
        }
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    /// Handle one event from a reviewer and return the state they end up in.
    ///
    /// Callers must not run two `handle` calls for the same reviewer at once.
    pub async fn handle(
        &self,
        reviewer_id: ReviewerId,
        chat_id: ChatId,
        event: Event,
    ) -> ConversationState {
        let mut state = self.sessions.state(reviewer_id).await;
        let mut pending = VecDeque::from([event]);

        while let Some(event) = pending.pop_front() {
            let from = state.name();
            let is_input = event.is_input();
            let result = transition(state, event);

            if result.effects.is_empty() && is_input && result.state.name() == from {
                tracing::debug!(reviewer_id, state = from, "Input ignored");
            } else {
                tracing::debug!(reviewer_id, from, to = result.state.name(), "Transition");
            }

            state = result.state;
            for effect in result.effects {
                if let Some(follow_up) = self.execute(reviewer_id, chat_id, effect).await {
                    pending.push_back(follow_up);
                }
            }
        }

        self.sessions
            .update(reviewer_id, state.clone(), Utc::now())
            .await;
        state
    }

    /// Execute one effect, returning the store or delivery result as an event if any.
    async fn execute(&self, reviewer_id: ReviewerId, chat_id: ChatId, effect: Effect) -> Option<Event> {
        match effect {
            Effect::Reply {
                text,
                format,
                keyboard,
            } => {
                if let Err(e) = self
                    .transport
                    .send_text(chat_id, &text, format, &keyboard)
                    .await
                {
                    tracing::error!(reviewer_id, error = %e, "Failed to send reply");
                    return Some(Event::DeliveryFailed);
                }
                None
            }

            Effect::SelectNext => {
                let selected =
                    scope::settle("select_next", self.store.select_next(reviewer_id).await, None)
                        .await;
                Some(match selected {
                    Some(Some(sample)) => {
                        tracing::info!(reviewer_id, sample_id = sample.id, "Assigned sample");
                        Event::SampleSelected(sample)
                    }
                    Some(None) => {
                        tracing::info!(reviewer_id, "Reviewer has rated every sample");
                        Event::SamplesExhausted
                    }
                    None => Event::SelectionFailed,
                })
            }

            Effect::RecordInteraction {
                sample_id,
                relevance,
                quality,
            } => {
                let interaction = Interaction::new(reviewer_id, sample_id, relevance, quality);
                let recorded = scope::settle(
                    "record_interaction",
                    self.store.record_interaction(interaction).await,
                    None,
                )
                .await;
                Some(match recorded {
                    Some(()) => {
                        tracing::info!(
                            reviewer_id,
                            sample_id,
                            relevance = relevance.get(),
                            quality = quality.get(),
                            "Recorded interaction"
                        );
                        Event::InteractionRecorded
                    }
                    None => Event::RecordingFailed,
                })
            }

            Effect::SendFiller { caption } => {
                if let Err(e) = self
                    .transport
                    .send_photo_from_url(chat_id, &self.filler_image_url, Some(&caption))
                    .await
                {
                    tracing::warn!(reviewer_id, error = %e, "Filler image unavailable, sending caption only");
                    if let Err(e) = self
                        .transport
                        .send_text(chat_id, &caption, TextFormat::Plain, &Keyboard::Remove)
                        .await
                    {
                        tracing::error!(reviewer_id, error = %e, "Failed to send reply");
                    }
                }
                None
            }

            Effect::Purge => {
                let purged = scope::settle("purge_all", self.store.purge_all().await, None).await;
                Some(match purged {
                    Some(report) => Event::PurgeCompleted(report),
                    None => Event::PurgeFailed,
                })
            }
        }
    }
}
