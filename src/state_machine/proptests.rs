//! Property-based tests for the view state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use crate::chat::{ChatLine, ChatRole};
use crate::directory::{Proficiency, Profile, ProfileDirectory, StaticDirectory};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> SessionContext {
    SessionContext::default()
}

fn seed_profiles() -> Vec<Profile> {
    StaticDirectory::seeded().profiles().to_vec()
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_language() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("English".to_string()),
        Just("Spanish".to_string()),
        Just("Korean".to_string()),
        Just("Japanese".to_string()),
        Just("Klingon".to_string()),
    ]
}

fn arb_level() -> impl Strategy<Value = Proficiency> {
    prop_oneof![
        Just(Proficiency::Basic),
        Just(Proficiency::Intermediate),
        Just(Proficiency::Professional),
        Just(Proficiency::Native),
    ]
}

fn arb_panel() -> impl Strategy<Value = Panel> {
    prop_oneof![Just(Panel::Assistant), Just(Panel::Messages)]
}

fn arb_view_kind() -> impl Strategy<Value = ViewKind> {
    prop_oneof![
        Just(ViewKind::LanguageSelection),
        Just(ViewKind::SessionLevels),
        Just(ViewKind::InCall),
    ]
}

fn arb_profile() -> impl Strategy<Value = Profile> {
    (0usize..seed_profiles().len()).prop_map(|i| seed_profiles()[i].clone())
}

fn arb_chat_line() -> impl Strategy<Value = ChatLine> {
    ("[a-zA-Z ?!]{1,40}").prop_map(|text| ChatLine::new(ChatRole::Partner, text))
}

fn arb_call_session() -> impl Strategy<Value = CallSession> {
    (
        arb_profile(),
        arb_language(),
        0u32..400,
        any::<bool>(),
        any::<bool>(),
        proptest::option::of(arb_panel()),
    )
        .prop_map(|(partner, language, remaining, camera, mic, open_panel)| {
            let mut session = CallSession::new(partner, language, remaining);
            session.camera_on = camera;
            session.mic_on = mic;
            session.open_panel = open_panel;
            session
        })
}

fn arb_view() -> impl Strategy<Value = View> {
    prop_oneof![
        Just(View::LanguageSelection),
        arb_language().prop_map(|language| View::SessionLevels { language }),
        arb_call_session().prop_map(|session| View::InCall { session }),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_language().prop_map(|language| Event::LanguageSelected { language }),
        Just(Event::BackRequested),
        arb_level().prop_map(|level| Event::LevelSelected { level }),
        Just(Event::HangUp),
        Just(Event::CameraToggled),
        Just(Event::MicToggled),
        arb_panel().prop_map(|panel| Event::PanelToggled { panel }),
        arb_panel().prop_map(|panel| Event::PanelClosed { panel }),
        Just(Event::ShareScreenRequested),
        Just(Event::FavoriteToggled),
        (arb_panel(), "[a-z ]{0,20}")
            .prop_map(|(panel, text)| Event::ChatSubmitted { panel, text }),
        Just(Event::BlockConfirmed),
        "[a-z ]{0,20}".prop_map(|reason| Event::ReportSubmitted { reason }),
        arb_profile().prop_map(|profile| Event::MatchFound { profile }),
        Just(Event::MatchFailed),
        arb_view_kind().prop_map(|into| Event::FadeSettled { into }),
        Just(Event::CountdownTick),
        (arb_panel(), arb_chat_line())
            .prop_map(|(panel, line)| Event::ChatReply { panel, line }),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// The transition function is total: it never panics, it only ever
    /// returns a new state or a typed rejection.
    #[test]
    fn prop_transition_never_panics(state in arb_view(), event in arb_event()) {
        let _ = transition(&state, &test_context(), event);
    }

    /// A selected language exists exactly while a selection is active,
    /// and no event can break that.
    #[test]
    fn prop_selected_language_matches_view(state in arb_view(), event in arb_event()) {
        if let Ok(result) = transition(&state, &test_context(), event) {
            match &result.new_state {
                View::LanguageSelection => {
                    prop_assert!(result.new_state.selected_language().is_none());
                }
                View::SessionLevels { .. } | View::InCall { .. } => {
                    prop_assert!(result.new_state.selected_language().is_some());
                }
            }
        }
    }

    /// Selecting a language always lands on the level card with a
    /// marker filter for exactly that language.
    #[test]
    fn prop_language_selection_filters_markers(language in arb_language()) {
        let result = transition(
            &View::LanguageSelection,
            &test_context(),
            Event::LanguageSelected { language: language.clone() },
        ).unwrap();

        prop_assert_eq!(&result.new_state, &View::SessionLevels { language: language.clone() });
        prop_assert_eq!(result.new_state.marker_filter(), Some(language.as_str()));
        prop_assert!(result.effects.contains(&Effect::FilterMarkers { language }), "expected FilterMarkers effect");
    }

    /// Ticks only ever decrease the clock, and a call started at N
    /// seconds ends after exactly N+1 ticks.
    #[test]
    fn prop_countdown_is_monotonic(session in arb_call_session()) {
        let started_at = session.remaining_secs;
        let mut state = View::InCall { session };
        let mut ticks = 0u32;

        loop {
            let result = transition(&state, &test_context(), Event::CountdownTick).unwrap();
            ticks += 1;
            match (&state, &result.new_state) {
                (View::InCall { session: before }, View::InCall { session: after }) => {
                    prop_assert_eq!(after.remaining_secs, before.remaining_secs - 1);
                }
                (View::InCall { .. }, View::LanguageSelection) => break,
                other => prop_assert!(false, "unexpected transition {:?}", other),
            }
            state = result.new_state;
        }

        prop_assert_eq!(ticks, started_at + 1);
    }

    /// At most one side panel is open, whatever sequence of panel
    /// events arrives.
    #[test]
    fn prop_panels_stay_exclusive(
        session in arb_call_session(),
        panels in proptest::collection::vec(arb_panel(), 1..8),
    ) {
        let mut state = View::InCall { session };
        for panel in panels {
            let result = transition(&state, &test_context(), Event::PanelToggled { panel }).unwrap();
            state = result.new_state;
            if let View::InCall { session } = &state {
                // Option<Panel> makes dual-open unrepresentable; check the
                // toggled panel landed where it should.
                prop_assert!(session.open_panel.is_none() || session.open_panel == Some(panel));
            }
        }
    }

    /// A fade that lands after the view moved on changes nothing.
    #[test]
    fn prop_stale_fades_are_noops(state in arb_view(), into in arb_view_kind()) {
        prop_assume!(state.kind() != into);
        let result = transition(&state, &test_context(), Event::FadeSettled { into }).unwrap();
        prop_assert_eq!(result.new_state, state);
        prop_assert!(result.effects.is_empty());
    }

    /// A failed match never reaches the call view and never starts the
    /// countdown.
    #[test]
    fn prop_no_match_never_enters_call(language in arb_language()) {
        let state = View::SessionLevels { language };
        let result = transition(&state, &test_context(), Event::MatchFailed).unwrap();
        prop_assert_eq!(result.new_state, state);
        prop_assert!(!result.effects.contains(&Effect::StartCountdown));
    }
}
