//! Pure view transition function
//!
//! Given the current view and an event, produce the next view plus the
//! effects the runtime must execute. No I/O happens here; everything
//! with a side effect is returned as an `Effect`.

use super::{CallSession, Effect, Event, Notice, SessionContext, View, ViewKind};
use crate::chat::ChatRole;
use thiserror::Error;

/// Result of a view transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: View,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: View) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function: same inputs, same outputs, no I/O
pub fn transition(
    state: &View,
    context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Language selection
        // ============================================================
        (View::LanguageSelection, Event::LanguageSelected { language }) => {
            Ok(TransitionResult::new(View::SessionLevels {
                language: language.clone(),
            })
            .with_effect(Effect::FilterMarkers { language })
            .with_effect(Effect::BeginFade {
                into: ViewKind::SessionLevels,
            }))
        }

        (View::LanguageSelection, Event::LanguageRequested { language, email, notes }) => {
            if language.trim().is_empty() {
                Ok(TransitionResult::new(state.clone())
                    .with_effect(Effect::notify(Notice::request_missing_language())))
            } else {
                Ok(TransitionResult::new(state.clone()).with_effect(Effect::AppendRequest {
                    language,
                    email,
                    notes,
                }))
            }
        }

        // ============================================================
        // Level selection and matching
        // ============================================================
        (View::SessionLevels { .. }, Event::BackRequested) => {
            Ok(TransitionResult::new(View::LanguageSelection)
                .with_effect(Effect::ShowAllMarkers)
                .with_effect(Effect::BeginFade {
                    into: ViewKind::LanguageSelection,
                }))
        }

        (View::SessionLevels { language }, Event::LevelSelected { level }) => {
            Ok(TransitionResult::new(state.clone()).with_effect(Effect::FindMatch {
                language: language.clone(),
                level,
            }))
        }

        (View::SessionLevels { language }, Event::MatchFound { profile }) => {
            let username = profile.name.clone();
            let session = CallSession::new(profile, language.clone(), context.call_duration_secs);
            Ok(TransitionResult::new(View::InCall { session })
                .with_effect(Effect::RecordMatchedUser {
                    username: Some(username),
                })
                .with_effect(Effect::ShowView {
                    view: ViewKind::InCall,
                })
                .with_effect(Effect::StartCountdown))
        }

        // Stay put so the operator can try another level
        (View::SessionLevels { .. }, Event::MatchFailed) => {
            Ok(TransitionResult::new(state.clone()).with_effect(Effect::notify(Notice::no_match())))
        }

        // ============================================================
        // Call lifecycle
        // ============================================================
        (View::InCall { .. }, Event::HangUp) => Ok(end_call()),

        (View::InCall { session }, Event::BlockConfirmed) => {
            let notice = Notice::blocked(&session.partner.name);
            let mut result = end_call();
            result.effects.insert(0, Effect::notify(notice));
            Ok(result)
        }

        (View::InCall { session }, Event::CountdownTick) => {
            if session.remaining_secs == 0 {
                // Expiry runs exactly the manual end-call cleanup
                Ok(end_call())
            } else {
                let mut session = session.clone();
                session.remaining_secs -= 1;
                Ok(TransitionResult::new(View::InCall { session }))
            }
        }

        // ============================================================
        // Call controls
        // ============================================================
        (View::InCall { session }, Event::CameraToggled) => {
            let mut session = session.clone();
            session.camera_on = !session.camera_on;
            Ok(TransitionResult::new(View::InCall { session }))
        }

        (View::InCall { session }, Event::MicToggled) => {
            let mut session = session.clone();
            session.mic_on = !session.mic_on;
            Ok(TransitionResult::new(View::InCall { session }))
        }

        // Opening one panel closes the other; re-toggling closes it
        (View::InCall { session }, Event::PanelToggled { panel }) => {
            let mut session = session.clone();
            if session.open_panel == Some(panel) {
                session.open_panel = None;
                Ok(TransitionResult::new(View::InCall { session }))
            } else {
                session.open_panel = Some(panel);
                let needs_greeting = session.log(panel).is_empty();
                let mut result = TransitionResult::new(View::InCall { session });
                if needs_greeting {
                    result = result.with_effect(Effect::FetchGreeting { panel });
                }
                Ok(result)
            }
        }

        (View::InCall { session }, Event::PanelClosed { panel }) => {
            let mut session = session.clone();
            if session.open_panel == Some(panel) {
                session.open_panel = None;
            }
            Ok(TransitionResult::new(View::InCall { session }))
        }

        (View::InCall { .. }, Event::ShareScreenRequested) => Ok(TransitionResult::new(
            state.clone(),
        )
        .with_effect(Effect::notify(Notice::share_screen_stub()))),

        (View::InCall { session }, Event::FavoriteToggled) => {
            Ok(TransitionResult::new(state.clone()).with_effect(Effect::ToggleFavorite {
                username: session.partner.name.clone(),
            }))
        }

        (View::InCall { .. }, Event::ReportSubmitted { .. }) => {
            Ok(TransitionResult::new(state.clone())
                .with_effect(Effect::notify(Notice::report_received())))
        }

        // ============================================================
        // Chat
        // ============================================================
        (View::InCall { session }, Event::ChatSubmitted { panel, text }) => {
            let text = text.trim().to_string();
            if text.is_empty() {
                return Ok(TransitionResult::new(state.clone()));
            }
            let mut session = session.clone();
            session.push_line(panel, ChatRole::User, text.clone());
            Ok(TransitionResult::new(View::InCall { session })
                .with_effect(Effect::SendChat { panel, text }))
        }

        (View::InCall { session }, Event::ChatReply { panel, line }) => {
            let mut session = session.clone();
            session.log_mut(panel).push(line);
            Ok(TransitionResult::new(View::InCall { session }))
        }

        // ============================================================
        // Scheduled callbacks, possibly stale
        // ============================================================
        (state, Event::FadeSettled { into }) => {
            if state.kind() == into {
                Ok(TransitionResult::new(state.clone())
                    .with_effect(Effect::ShowView { view: into }))
            } else {
                // Superseded by a newer transition
                Ok(TransitionResult::new(state.clone()))
            }
        }

        // Stray tick or reply after the call already ended
        (state, Event::CountdownTick) => Ok(TransitionResult::new(state.clone())),
        (state, Event::ChatReply { .. }) => Ok(TransitionResult::new(state.clone())),

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "no transition from {:?} on {:?}",
            state.kind(),
            event
        ))),
    }
}

/// Manual hang-up, countdown expiry and block all share this cleanup
fn end_call() -> TransitionResult {
    TransitionResult::new(View::LanguageSelection)
        .with_effect(Effect::StopCountdown)
        .with_effect(Effect::RecordMatchedUser { username: None })
        .with_effect(Effect::ShowAllMarkers)
        .with_effect(Effect::ShowView {
            view: ViewKind::LanguageSelection,
        })
}
