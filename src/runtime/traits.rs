//! Trait abstractions for runtime persistence
//!
//! These seams keep the runtime testable with in-memory doubles and let
//! real services replace the local store without touching the state
//! machine.

use crate::store::{FavoritesStore, KvStore, LanguageRequest, RequestStore, MATCHED_USER_KEY};
use async_trait::async_trait;

/// Favorite state of one partner, as shown on the call surface.
/// `session_count` reads 1 for a user who has never been favorited.
#[derive(Debug, Clone, PartialEq)]
pub struct FavoriteStatus {
    pub username: String,
    pub favorited: bool,
    pub session_count: u32,
}

/// Favorites persistence
#[async_trait]
pub trait FavoriteBook: Send + Sync {
    async fn status(&self, username: &str) -> FavoriteStatus;

    /// Alternate add/remove and report the resulting status
    async fn toggle(&self, username: &str) -> Result<FavoriteStatus, String>;
}

/// Append-only language-request log
#[async_trait]
pub trait RequestLog: Send + Sync {
    async fn append(
        &self,
        language: &str,
        email: &str,
        notes: &str,
    ) -> Result<LanguageRequest, String>;
}

/// Scratch entries shared across runs
#[async_trait]
pub trait ScratchPad: Send + Sync {
    /// Record who the operator is currently matched with; None clears
    async fn record_matched_user(&self, username: Option<&str>) -> Result<(), String>;
}

/// Combined persistence trait for convenience
pub trait Persistence: FavoriteBook + RequestLog + ScratchPad {}
impl<T: FavoriteBook + RequestLog + ScratchPad> Persistence for T {}

// ============================================================================
// Production Adapter
// ============================================================================

/// Adapter over the rusqlite-backed stores
#[derive(Clone)]
pub struct StorePersistence {
    favorites: FavoritesStore,
    requests: RequestStore,
    kv: KvStore,
}

impl StorePersistence {
    pub fn new(kv: KvStore) -> Self {
        Self {
            favorites: FavoritesStore::new(kv.clone()),
            requests: RequestStore::new(kv.clone()),
            kv,
        }
    }
}

#[async_trait]
impl FavoriteBook for StorePersistence {
    async fn status(&self, username: &str) -> FavoriteStatus {
        match self.favorites.get(username) {
            Some(record) => FavoriteStatus {
                username: username.to_string(),
                favorited: true,
                session_count: record.session_count,
            },
            None => FavoriteStatus {
                username: username.to_string(),
                favorited: false,
                session_count: 1,
            },
        }
    }

    async fn toggle(&self, username: &str) -> Result<FavoriteStatus, String> {
        let record = self.favorites.toggle(username).map_err(|e| e.to_string())?;
        Ok(match record {
            Some(record) => FavoriteStatus {
                username: username.to_string(),
                favorited: true,
                session_count: record.session_count,
            },
            None => FavoriteStatus {
                username: username.to_string(),
                favorited: false,
                session_count: 1,
            },
        })
    }
}

#[async_trait]
impl RequestLog for StorePersistence {
    async fn append(
        &self,
        language: &str,
        email: &str,
        notes: &str,
    ) -> Result<LanguageRequest, String> {
        self.requests
            .append(language, email, notes)
            .map_err(|e| e.to_string())
    }
}

#[async_trait]
impl ScratchPad for StorePersistence {
    async fn record_matched_user(&self, username: Option<&str>) -> Result<(), String> {
        match username {
            Some(name) => self
                .kv
                .put_json(MATCHED_USER_KEY, &name)
                .map_err(|e| e.to_string()),
            None => self.kv.delete(MATCHED_USER_KEY).map_err(|e| e.to_string()),
        }
    }
}
