//! Partner matching
//!
//! Filter-and-random-pick over the directory: everyone who lists the
//! requested language is a candidate, native speakers are preferred when
//! the operator asked for a native session, and the current user is
//! never matched with themselves.

use crate::directory::{Proficiency, Profile, ProfileDirectory};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

pub struct MatchEngine {
    directory: Arc<dyn ProfileDirectory>,
    current_user: String,
}

impl MatchEngine {
    pub fn new(directory: Arc<dyn ProfileDirectory>, current_user: impl Into<String>) -> Self {
        Self {
            directory,
            current_user: current_user.into(),
        }
    }

    /// Pick a partner for the given language and practice level, or
    /// None when nobody else speaks it
    pub fn find_match(&self, language: &str, level: Proficiency) -> Option<Profile> {
        self.find_match_with(&mut rand::thread_rng(), language, level)
    }

    pub fn find_match_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        language: &str,
        level: Proficiency,
    ) -> Option<Profile> {
        let candidates: Vec<&Profile> = self
            .directory
            .query(language)
            .into_iter()
            .filter(|profile| profile.name != self.current_user)
            .collect();

        if candidates.is_empty() {
            return None;
        }

        if level == Proficiency::Native {
            let natives: Vec<&Profile> = candidates
                .iter()
                .copied()
                .filter(|profile| profile.proficiency(language) == Some(Proficiency::Native))
                .collect();
            if let Some(native) = natives.choose(rng) {
                return Some((*native).clone());
            }
        }

        candidates.choose(rng).map(|profile| (*profile).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{MapPoint, StaticDirectory, CURRENT_USER};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeMap;

    fn engine() -> MatchEngine {
        MatchEngine::new(Arc::new(StaticDirectory::seeded()), CURRENT_USER)
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_match_speaks_requested_language() {
        let engine = engine();
        let mut rng = rng();

        for language in ["English", "Spanish", "Korean", "Japanese", "French", "Hindi", "Filipino"]
        {
            for level in [
                Proficiency::Basic,
                Proficiency::Intermediate,
                Proficiency::Professional,
                Proficiency::Native,
            ] {
                let matched = engine
                    .find_match_with(&mut rng, language, level)
                    .unwrap_or_else(|| panic!("no match for {language}"));
                assert!(matched.speaks(language));
                assert_ne!(matched.name, CURRENT_USER);
            }
        }
    }

    #[test]
    fn test_native_level_prefers_native_speakers() {
        let engine = engine();
        let mut rng = rng();

        // Korean candidates are Marty (Beginner) and Hyejin (Native);
        // a native session must always land on Hyejin.
        for _ in 0..50 {
            let matched = engine
                .find_match_with(&mut rng, "Korean", Proficiency::Native)
                .unwrap();
            assert_eq!(matched.name, "Hyejin");
        }
    }

    #[test]
    fn test_native_level_falls_back_when_no_native_candidate() {
        struct TwoUsers(Vec<Profile>);
        impl ProfileDirectory for TwoUsers {
            fn profiles(&self) -> &[Profile] {
                &self.0
            }
        }

        let make = |name: &str, level: Proficiency| Profile {
            name: name.to_string(),
            location: MapPoint { top: 0.0, left: 0.0 },
            hometown: String::new(),
            languages: BTreeMap::from([("english".to_string(), level)]),
            practice_level: level,
            interests: vec![],
        };

        let directory = TwoUsers(vec![
            make("A", Proficiency::Native),
            make("B", Proficiency::Basic),
        ]);
        let engine = MatchEngine::new(Arc::new(directory), "A");
        let mut rng = rng();

        // The only native speaker is the current user, so the native
        // preference falls through to the remaining candidate.
        let matched = engine
            .find_match_with(&mut rng, "english", Proficiency::Native)
            .unwrap();
        assert_eq!(matched.name, "B");
    }

    #[test]
    fn test_unspoken_language_yields_no_match() {
        let engine = engine();
        let mut rng = rng();
        assert!(engine
            .find_match_with(&mut rng, "Swahili", Proficiency::Basic)
            .is_none());
    }

    #[test]
    fn test_random_pick_covers_the_candidate_set() {
        let engine = engine();
        let mut rng = rng();

        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..200 {
            let matched = engine
                .find_match_with(&mut rng, "Spanish", Proficiency::Intermediate)
                .unwrap();
            seen.insert(matched.name);
        }
        // Marty, Sofia and Carlos all list Spanish.
        assert_eq!(
            seen.into_iter().collect::<Vec<_>>(),
            vec!["Carlos", "Marty", "Sofia"]
        );
    }
}
