//! Operator profile blob
//!
//! Every mutation loads the whole profile, edits it in memory, and
//! writes it back, so the persisted entry is always a complete document.

use super::{
    KvStore, ProfileLanguage, StoreError, StoreResult, StoredProfile, MAX_INTERESTS, PROFILE_KEY,
};

#[derive(Clone)]
pub struct ProfileStore {
    kv: KvStore,
}

impl ProfileStore {
    pub fn new(kv: KvStore) -> Self {
        Self { kv }
    }

    /// Load the stored profile. Unreadable data counts as a fresh profile.
    pub fn load(&self) -> StoredProfile {
        self.kv.load_or_default(PROFILE_KEY)
    }

    pub fn save(&self, profile: &StoredProfile) -> StoreResult<()> {
        self.kv.put_json(PROFILE_KEY, profile)
    }

    /// Add a language, rejecting case-insensitive duplicates. New
    /// languages default to participating in matching.
    pub fn add_language(&self, name: &str) -> StoreResult<ProfileLanguage> {
        let mut profile = self.load();
        let exists = profile
            .languages
            .iter()
            .any(|lang| lang.name.eq_ignore_ascii_case(name));
        if exists {
            return Err(StoreError::DuplicateLanguage(name.to_string()));
        }

        let language = ProfileLanguage {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            match_enabled: true,
        };
        profile.languages.push(language.clone());
        self.save(&profile)?;
        Ok(language)
    }

    pub fn remove_language(&self, id: &str) -> StoreResult<()> {
        let mut profile = self.load();
        profile.languages.retain(|lang| lang.id != id);
        self.save(&profile)
    }

    /// Flip whether a language participates in matching
    pub fn toggle_language_match(&self, id: &str) -> StoreResult<()> {
        let mut profile = self.load();
        if let Some(language) = profile.languages.iter_mut().find(|lang| lang.id == id) {
            language.match_enabled = !language.match_enabled;
            self.save(&profile)?;
        }
        Ok(())
    }

    /// Add an interest, capped at MAX_INTERESTS with case-insensitive
    /// duplicate rejection
    pub fn add_interest(&self, name: &str) -> StoreResult<()> {
        let mut profile = self.load();
        if profile.interests.len() >= MAX_INTERESTS {
            return Err(StoreError::InterestLimit);
        }
        let exists = profile
            .interests
            .iter()
            .any(|interest| interest.eq_ignore_ascii_case(name));
        if exists {
            return Err(StoreError::DuplicateInterest(name.to_string()));
        }

        profile.interests.push(name.to_string());
        self.save(&profile)
    }

    pub fn remove_interest(&self, index: usize) -> StoreResult<()> {
        let mut profile = self.load();
        if index < profile.interests.len() {
            profile.interests.remove(index);
            self.save(&profile)?;
        }
        Ok(())
    }

    pub fn set_location(&self, city: &str, country: &str) -> StoreResult<()> {
        let mut profile = self.load();
        profile.location.city = city.trim().to_string();
        profile.location.country = country.trim().to_string();
        self.save(&profile)
    }

}
