//! Core view state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.

mod effect;
pub mod event;
mod state;
mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Effect, Notice};
pub use event::Event;
pub use state::{
    CallSession, Panel, SessionContext, View, ViewKind, CALL_DURATION_SECS, FADE_DURATION,
    SESSION_LEVELS,
};
pub use transition::{transition, TransitionError, TransitionResult};
