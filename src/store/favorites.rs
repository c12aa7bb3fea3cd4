//! Favorites mapping
//!
//! One persisted mapping of username -> FavoriteRecord. A record is
//! created on first add, its session counter incremented on re-add, and
//! the record is deleted entirely on remove.

use super::{FavoriteRecord, KvStore, StoreResult, FAVORITES_KEY};
use chrono::Utc;
use std::collections::BTreeMap;

pub type FavoritesMap = BTreeMap<String, FavoriteRecord>;

#[derive(Clone)]
pub struct FavoritesStore {
    kv: KvStore,
}

impl FavoritesStore {
    pub fn new(kv: KvStore) -> Self {
        Self { kv }
    }

    /// The full favorites mapping. Unreadable data counts as empty.
    pub fn all(&self) -> FavoritesMap {
        self.kv.load_or_default(FAVORITES_KEY)
    }

    pub fn get(&self, username: &str) -> Option<FavoriteRecord> {
        self.all().get(username).cloned()
    }

    pub fn is_favorited(&self, username: &str) -> bool {
        self.all().contains_key(username)
    }

    /// Add a user, or bump the session counter when already present
    pub fn add(&self, username: &str) -> StoreResult<FavoriteRecord> {
        let mut favorites = self.all();
        let record = match favorites.get(username) {
            Some(existing) => FavoriteRecord {
                added_date: Utc::now(),
                session_count: existing.session_count + 1,
            },
            None => FavoriteRecord {
                added_date: Utc::now(),
                session_count: 1,
            },
        };
        favorites.insert(username.to_string(), record.clone());
        self.kv.put_json(FAVORITES_KEY, &favorites)?;
        Ok(record)
    }

    pub fn remove(&self, username: &str) -> StoreResult<()> {
        let mut favorites = self.all();
        favorites.remove(username);
        self.kv.put_json(FAVORITES_KEY, &favorites)
    }

    /// Alternate add/remove. Returns the record when the user is now
    /// favorited, None when they were just removed.
    pub fn toggle(&self, username: &str) -> StoreResult<Option<FavoriteRecord>> {
        if self.is_favorited(username) {
            self.remove(username)?;
            Ok(None)
        } else {
            self.add(username).map(Some)
        }
    }
}
