//! View and call-session state types

use crate::chat::{ChatLine, ChatRole};
use crate::directory::{Proficiency, Profile};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Seconds on the clock when a call starts. Every call runs 4:22
/// regardless of the minutes advertised on the level card; the card
/// copy and the clock disagree in the shipped prototype and that
/// behavior is preserved.
pub const CALL_DURATION_SECS: u32 = 262;

/// Delay between fading out the old view and revealing the new one
pub const FADE_DURATION: Duration = Duration::from_millis(300);

/// Level card entries: practice level plus the advertised session
/// length in minutes (display copy only, see CALL_DURATION_SECS)
pub const SESSION_LEVELS: &[(Proficiency, u32)] = &[
    (Proficiency::Basic, 5),
    (Proficiency::Intermediate, 10),
    (Proficiency::Professional, 15),
    (Proficiency::Native, 20),
];

/// Side panels available during a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    Assistant,
    Messages,
}

/// Discriminant for a view, used to tag scheduled work so that stale
/// callbacks can be recognized and dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    LanguageSelection,
    SessionLevels,
    InCall,
}

/// Live state of a running call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSession {
    pub partner: Profile,
    /// The language this session was matched for
    pub language: String,
    pub remaining_secs: u32,
    pub camera_on: bool,
    pub mic_on: bool,
    /// At most one side panel is open at a time
    pub open_panel: Option<Panel>,
    pub assistant_log: Vec<ChatLine>,
    pub partner_log: Vec<ChatLine>,
}

impl CallSession {
    pub fn new(partner: Profile, language: impl Into<String>, duration_secs: u32) -> Self {
        Self {
            partner,
            language: language.into(),
            remaining_secs: duration_secs,
            camera_on: true,
            mic_on: true,
            open_panel: None,
            assistant_log: Vec::new(),
            partner_log: Vec::new(),
        }
    }

    /// Clock label, e.g. "Ends in 4:22"
    pub fn timer_label(&self) -> String {
        let minutes = self.remaining_secs / 60;
        let secs = self.remaining_secs % 60;
        format!("Ends in {minutes}:{secs:02}")
    }

    pub fn log(&self, panel: Panel) -> &[ChatLine] {
        match panel {
            Panel::Assistant => &self.assistant_log,
            Panel::Messages => &self.partner_log,
        }
    }

    pub fn log_mut(&mut self, panel: Panel) -> &mut Vec<ChatLine> {
        match panel {
            Panel::Assistant => &mut self.assistant_log,
            Panel::Messages => &mut self.partner_log,
        }
    }

    pub fn push_line(&mut self, panel: Panel, role: ChatRole, text: impl Into<String>) {
        self.log_mut(panel).push(ChatLine::new(role, text));
    }
}

/// The three mutually exclusive UI views. The selected language lives
/// inside the variants, so it exists exactly while a selection is
/// active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum View {
    /// Map plus the language card
    #[default]
    LanguageSelection,

    /// Level card for a chosen language; markers filtered to speakers
    SessionLevels { language: String },

    /// Mock call surface with a running countdown
    InCall { session: CallSession },
}

impl View {
    pub fn kind(&self) -> ViewKind {
        match self {
            View::LanguageSelection => ViewKind::LanguageSelection,
            View::SessionLevels { .. } => ViewKind::SessionLevels,
            View::InCall { .. } => ViewKind::InCall,
        }
    }

    /// The language driving the current selection, if any
    pub fn selected_language(&self) -> Option<&str> {
        match self {
            View::LanguageSelection => None,
            View::SessionLevels { language } => Some(language),
            View::InCall { session } => Some(&session.language),
        }
    }

    /// Marker filter implied by this view: None shows every marker
    pub fn marker_filter(&self) -> Option<&str> {
        match self {
            View::SessionLevels { language } => Some(language),
            _ => None,
        }
    }
}

/// Fixed configuration for a session (immutable once the app starts)
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub current_user: String,
    pub call_duration_secs: u32,
    pub fade: Duration,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self {
            current_user: crate::directory::CURRENT_USER.to_string(),
            call_duration_secs: CALL_DURATION_SECS,
            fade: FADE_DURATION,
        }
    }
}
