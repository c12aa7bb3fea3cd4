//! Events that drive view transitions

use crate::chat::ChatLine;
use crate::directory::{Proficiency, Profile};
use crate::state_machine::state::{Panel, ViewKind};

/// Everything that can happen to the session
#[derive(Debug, Clone)]
pub enum Event {
    // Operator intents
    LanguageSelected {
        language: String,
    },
    BackRequested,
    LevelSelected {
        level: Proficiency,
    },
    HangUp,
    CameraToggled,
    MicToggled,
    PanelToggled {
        panel: Panel,
    },
    PanelClosed {
        panel: Panel,
    },
    ShareScreenRequested,
    FavoriteToggled,
    ChatSubmitted {
        panel: Panel,
        text: String,
    },
    BlockConfirmed,
    ReportSubmitted {
        reason: String,
    },
    LanguageRequested {
        language: String,
        email: String,
        notes: String,
    },

    // Generated while executing effects
    MatchFound {
        profile: Profile,
    },
    MatchFailed,
    /// A scheduled cross-fade finished. Tagged with the view it was
    /// scheduled for so a superseded fade lands as a no-op.
    FadeSettled {
        into: ViewKind,
    },
    CountdownTick,
    ChatReply {
        panel: Panel,
        line: ChatLine,
    },
}
