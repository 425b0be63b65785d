//! Per-reviewer rating dialogue.
//!
//! The dialogue is an explicit state machine:
//! - **State**: where a reviewer is in the dialogue (`ConversationState`)
//! - **Events**: reviewer input and store results (`Event`)
//! - **Effects**: replies and store calls to perform (`Effect`)
//! - **Transition**: pure function `(State, Event) -> (State, Vec<Effect>)`
//!
//! `ConversationEngine` executes effects against the store and transport and
//! feeds store results back in as events. `SessionRegistry` keeps one state
//! per reviewer and expires abandoned ones.

pub mod effect;
pub mod engine;
pub mod event;
pub mod messages;
pub mod patterns;
pub mod sessions;
pub mod state;
pub mod transition;

pub use effect::Effect;
pub use engine::ConversationEngine;
pub use event::Event;
pub use sessions::SessionRegistry;
pub use state::ConversationState;
pub use transition::{transition, TransitionResult};
