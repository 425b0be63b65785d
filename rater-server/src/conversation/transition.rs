//! Pure state transition function.
//!
//! Takes the current state and an event and returns the new state plus the
//! effects to execute. No I/O happens here. Input that does not match what
//! the current state expects leaves the state unchanged and produces no
//! effects, so the reviewer simply gets no answer until they comply or cancel.

use super::effect::Effect;
use super::event::Event;
use super::messages;
use super::patterns;
use super::state::ConversationState;
use crate::transport::Keyboard;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    pub state: ConversationState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConversationState, effects: Vec<Effect>) -> Self {
        Self { state, effects }
    }

    pub fn no_change(state: ConversationState) -> Self {
        Self {
            state,
            effects: vec![],
        }
    }
}

pub fn transition(state: ConversationState, event: Event) -> TransitionResult {
    if is_cancellation(&state, &event) {
        return cancel();
    }

    // The reviewer never saw the last prompt, so there is nothing to answer.
    if matches!(event, Event::DeliveryFailed) {
        return match state {
            ConversationState::Idle => TransitionResult::no_change(state),
            _ => finish(messages::FAILURE_REPLY),
        };
    }

    match state {
        ConversationState::Idle => idle(event),
        ConversationState::Selecting => selecting(event),
        ConversationState::AwaitingReady { sample_id } => match event {
            Event::Text(text) if patterns::is_evaluate(&text) => TransitionResult::new(
                ConversationState::AwaitingRelevance { sample_id },
                vec![Effect::reply(
                    messages::RELEVANCE_PROMPT,
                    messages::scale_keyboard(false),
                )],
            ),
            _ => TransitionResult::no_change(ConversationState::AwaitingReady { sample_id }),
        },
        ConversationState::AwaitingRelevance { sample_id } => {
            match rating_input(&event) {
                Some(relevance) => TransitionResult::new(
                    ConversationState::AwaitingQuality {
                        sample_id,
                        relevance,
                    },
                    vec![Effect::reply(
                        messages::QUALITY_PROMPT,
                        messages::scale_keyboard(true),
                    )],
                ),
                None => {
                    TransitionResult::no_change(ConversationState::AwaitingRelevance { sample_id })
                }
            }
        }
        ConversationState::AwaitingQuality {
            sample_id,
            relevance,
        } => match rating_input(&event) {
            Some(quality) => TransitionResult::new(
                ConversationState::Recording {
                    sample_id,
                    relevance,
                    quality,
                },
                vec![Effect::RecordInteraction {
                    sample_id,
                    relevance,
                    quality,
                }],
            ),
            None => TransitionResult::no_change(ConversationState::AwaitingQuality {
                sample_id,
                relevance,
            }),
        },
        state @ ConversationState::Recording { .. } => recording(state, event),
        ConversationState::AwaitingContinue => match event {
            Event::Text(text) if patterns::is_yes(&text) => {
                TransitionResult::new(ConversationState::Selecting, vec![Effect::SelectNext])
            }
            Event::Text(text) if patterns::is_no(&text) => finish(messages::THANKS),
            _ => TransitionResult::no_change(ConversationState::AwaitingContinue),
        },
        ConversationState::AwaitingPurgeConfirm => match event {
            Event::Text(text) if patterns::is_yes(&text) => {
                TransitionResult::new(ConversationState::Purging, vec![Effect::Purge])
            }
            // Any other reply, command or not, aborts.
            Event::Text(_) | Event::Cancel | Event::RequestSample | Event::RequestPurge => {
                finish(messages::PURGE_ABORTED)
            }
            _ => TransitionResult::no_change(ConversationState::AwaitingPurgeConfirm),
        },
        ConversationState::Purging => match event {
            Event::PurgeCompleted(_) => finish(messages::PURGE_DONE),
            Event::PurgeFailed => finish(messages::FAILURE_REPLY),
            _ => TransitionResult::no_change(ConversationState::Purging),
        },
    }
}

fn idle(event: Event) -> TransitionResult {
    match event {
        Event::RequestSample => {
            TransitionResult::new(ConversationState::Selecting, vec![Effect::SelectNext])
        }
        Event::RequestPurge => TransitionResult::new(
            ConversationState::AwaitingPurgeConfirm,
            vec![Effect::reply(
                messages::PURGE_CONFIRM,
                messages::yes_no_keyboard(false),
            )],
        ),
        _ => TransitionResult::no_change(ConversationState::Idle),
    }
}

fn selecting(event: Event) -> TransitionResult {
    match event {
        Event::SampleSelected(sample) => TransitionResult::new(
            ConversationState::AwaitingReady {
                sample_id: sample.id,
            },
            vec![Effect::reply_html(
                messages::sample_card(&sample),
                messages::evaluate_keyboard(),
            )],
        ),
        Event::SamplesExhausted => TransitionResult::new(
            ConversationState::Idle,
            vec![Effect::SendFiller {
                caption: messages::EXHAUSTED.to_string(),
            }],
        ),
        Event::SelectionFailed => finish(messages::FAILURE_REPLY),
        _ => TransitionResult::no_change(ConversationState::Selecting),
    }
}

fn recording(state: ConversationState, event: Event) -> TransitionResult {
    match event {
        Event::InteractionRecorded => TransitionResult::new(
            ConversationState::AwaitingContinue,
            vec![Effect::reply(
                messages::CONTINUE_PROMPT,
                messages::yes_no_keyboard(true),
            )],
        ),
        Event::RecordingFailed => finish(messages::FAILURE_REPLY),
        _ => TransitionResult::no_change(state),
    }
}

/// Cancellation is available from every state that waits on the reviewer,
/// except purge confirmation, which handles it as a refusal.
fn is_cancellation(state: &ConversationState, event: &Event) -> bool {
    let waiting_on_reviewer = !state.is_idle()
        && !state.is_transient()
        && *state != ConversationState::AwaitingPurgeConfirm;
    if !waiting_on_reviewer {
        return false;
    }
    match event {
        Event::Cancel => true,
        Event::Text(text) => patterns::is_cancel(text) && !accepts(state, text),
        _ => false,
    }
}

/// Whether the state's own pattern claims the text before cancellation does.
fn accepts(state: &ConversationState, text: &str) -> bool {
    match state {
        ConversationState::AwaitingReady { .. } => patterns::is_evaluate(text),
        ConversationState::AwaitingRelevance { .. } | ConversationState::AwaitingQuality { .. } => {
            patterns::parse_rating(text).is_some()
        }
        ConversationState::AwaitingContinue => patterns::is_yes(text) || patterns::is_no(text),
        _ => false,
    }
}

fn rating_input(event: &Event) -> Option<rater_core::Rating> {
    match event {
        Event::Text(text) => patterns::parse_rating(text),
        _ => None,
    }
}

fn cancel() -> TransitionResult {
    finish(messages::THANKS)
}

/// End the dialogue with a final message and remove the reply keyboard.
fn finish(text: &str) -> TransitionResult {
    TransitionResult::new(
        ConversationState::Idle,
        vec![Effect::reply(text, Keyboard::Remove)],
    )
}
