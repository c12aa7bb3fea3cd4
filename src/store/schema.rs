//! Store schema and persisted record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// SQL schema for initialization
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS entries (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

// Entry keys. The literal suffix is the only schema versioning.
pub const FAVORITES_KEY: &str = "tabbimate_favorites";
pub const LANGUAGE_REQUESTS_KEY: &str = "tabbimate_language_requests";
pub const PROFILE_KEY: &str = "tabbimate_profile_v1";
pub const MATCHED_USER_KEY: &str = "tabbimate_matched_user";

/// Most interests a profile may carry
pub const MAX_INTERESTS: usize = 3;

/// A favorited partner, keyed by username in the favorites mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteRecord {
    pub added_date: DateTime<Utc>,
    pub session_count: u32,
}

/// A pending request for a language not yet on the card.
/// Records are append-only: never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageRequest {
    pub id: String,
    pub language: String,
    pub email: String,
    pub notes: String,
    pub timestamp: DateTime<Utc>,
    pub status: RequestStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
}

/// The operator's own editable profile blob
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredProfile {
    #[serde(default)]
    pub languages: Vec<ProfileLanguage>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub location: ProfileLocation,
    #[serde(default)]
    pub photo_url: Option<String>,
}

/// A language on the operator's profile, with a per-language opt-in
/// for whether it participates in matching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileLanguage {
    pub id: String,
    pub name: String,
    #[serde(rename = "match")]
    pub match_enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileLocation {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
}
