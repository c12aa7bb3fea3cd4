//! Effects produced by view transitions

use crate::directory::Proficiency;
use crate::state_machine::state::{Panel, ViewKind};

/// Work the runtime performs after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Show only markers for profiles speaking this language; tooltips
    /// on hidden markers are dismissed
    FilterMarkers { language: String },

    /// Make every marker visible again
    ShowAllMarkers,

    /// Start the fade-out of the old view; the tagged view is revealed
    /// once the fade settles
    BeginFade { into: ViewKind },

    /// Swap the visible view. Until this runs the new view is not
    /// interactive.
    ShowView { view: ViewKind },

    /// Run the match engine for the pending selection
    FindMatch { language: String, level: Proficiency },

    /// Start the 1 Hz call countdown (first tick fires immediately)
    StartCountdown,

    /// Cancel the running countdown
    StopCountdown,

    /// Flip the favorite status of a partner
    ToggleFavorite { username: String },

    /// Write (or clear, on None) the matched-user scratch entry
    RecordMatchedUser { username: Option<String> },

    /// Deliver a chat message over the panel's transport
    SendChat { panel: Panel, text: String },

    /// Fetch the panel's opening line the first time it opens
    FetchGreeting { panel: Panel },

    /// Append a pending language request to the log
    AppendRequest {
        language: String,
        email: String,
        notes: String,
    },

    /// Surface a modal notice
    Notify { notice: Notice },
}

impl Effect {
    pub fn notify(notice: Notice) -> Self {
        Effect::Notify { notice }
    }
}

/// A user-visible modal message
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub title: String,
    pub body: String,
}

impl Notice {
    fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn no_match() -> Self {
        Self::new(
            "TabbiMate",
            "No available users for this level. Please try another!",
        )
    }

    pub fn favorite_added(username: &str) -> Self {
        Self::new(
            "Added to Favorites",
            format!(
                "{username} has been added to your favorites! You'll be more likely to match with them in the future."
            ),
        )
    }

    pub fn favorite_removed(username: &str) -> Self {
        Self::new(
            "Removed from Favorites",
            format!("{username} has been removed from your favorites."),
        )
    }

    pub fn request_submitted(language: &str) -> Self {
        Self::new(
            "Request Submitted",
            format!(
                "Thank you for your request!\n\nWe've received your request for {language}. We'll notify you when it becomes available."
            ),
        )
    }

    pub fn request_missing_language() -> Self {
        Self::new("TabbiMate", "Please enter a language name.")
    }

    pub fn blocked(username: &str) -> Self {
        Self::new("User Blocked", format!("{username} has been blocked."))
    }

    pub fn report_received() -> Self {
        Self::new(
            "Report Submitted",
            "Thank you for your report. Our team will review it shortly.",
        )
    }

    pub fn share_screen_stub() -> Self {
        Self::new("TabbiMate", "Screen sharing functionality will be added here!")
    }

    pub fn guidelines() -> Self {
        Self::new(
            "Session Guidelines",
            "Be respectful and kind to your language partner.\n\nPractice the selected language during your session.\n\nUse the AI assistant for real-time help and translations.",
        )
    }

    pub fn save_failed(what: &str) -> Self {
        Self::new(
            "TabbiMate",
            format!("Failed to save {what}. Please try again."),
        )
    }
}
