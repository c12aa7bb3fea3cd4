//! Candidate partner directory
//!
//! The prototype ships a fixed ten-person directory behind the narrow
//! `ProfileDirectory` seam, so a real directory service can replace it
//! without touching the state machine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The fixed operator identity. Excluded from matching.
pub const CURRENT_USER: &str = "April";

/// Languages offered on the selection card
pub const LANGUAGES: &[&str] = &[
    "English",
    "Spanish",
    "Korean",
    "Japanese",
    "French",
    "Hindi",
    "Filipino",
];

/// Self-reported command of a language, weakest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Proficiency {
    Beginner,
    Basic,
    Intermediate,
    Professional,
    Native,
}

impl fmt::Display for Proficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Proficiency::Beginner => "Beginner",
            Proficiency::Basic => "Basic",
            Proficiency::Intermediate => "Intermediate",
            Proficiency::Professional => "Professional",
            Proficiency::Native => "Native",
        };
        write!(f, "{label}")
    }
}

/// Marker position as percentages of the map surface (display
/// coordinates, not geographic)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub top: f64,
    pub left: f64,
}

/// A directory entry for one candidate partner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub location: MapPoint,
    pub hometown: String,
    pub languages: BTreeMap<String, Proficiency>,
    pub practice_level: Proficiency,
    pub interests: Vec<String>,
}

impl Profile {
    /// Whether this profile lists the language, at any proficiency.
    /// Lookup keys are lowercase; display names are accepted.
    pub fn speaks(&self, language: &str) -> bool {
        self.languages.contains_key(&language.to_lowercase())
    }

    pub fn proficiency(&self, language: &str) -> Option<Proficiency> {
        self.languages.get(&language.to_lowercase()).copied()
    }

    /// Tooltip line: "English (Native), Spanish (Intermediate)"
    pub fn languages_line(&self) -> String {
        self.languages
            .iter()
            .map(|(key, level)| {
                let mut name = key.clone();
                if let Some(first) = name.get_mut(0..1) {
                    first.make_ascii_uppercase();
                }
                format!("{name} ({level})")
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn interests_line(&self) -> String {
        self.interests.join(", ")
    }
}

/// Narrow query surface over the candidate directory
pub trait ProfileDirectory: Send + Sync {
    /// Every profile, including the current user's
    fn profiles(&self) -> &[Profile];

    /// Profiles listing the given language, at any proficiency
    fn query(&self, language: &str) -> Vec<&Profile> {
        self.profiles()
            .iter()
            .filter(|profile| profile.speaks(language))
            .collect()
    }
}

/// The hardcoded in-memory directory
pub struct StaticDirectory {
    profiles: Vec<Profile>,
}

impl StaticDirectory {
    pub fn seeded() -> Self {
        Self {
            profiles: seed_profiles(),
        }
    }
}

impl ProfileDirectory for StaticDirectory {
    fn profiles(&self) -> &[Profile] {
        &self.profiles
    }
}

fn profile(
    name: &str,
    location: MapPoint,
    hometown: &str,
    languages: &[(&str, Proficiency)],
    practice_level: Proficiency,
    interests: &[&str],
) -> Profile {
    Profile {
        name: name.to_string(),
        location,
        hometown: hometown.to_string(),
        languages: languages
            .iter()
            .map(|(key, level)| ((*key).to_string(), *level))
            .collect(),
        practice_level,
        interests: interests.iter().map(|s| (*s).to_string()).collect(),
    }
}

fn seed_profiles() -> Vec<Profile> {
    use Proficiency::*;

    vec![
        profile(
            "April",
            MapPoint { top: 32.0, left: 18.0 },
            "Berkeley, CA",
            &[("english", Professional), ("spanish", Beginner), ("korean", Native)],
            Professional,
            &["Parenting", "AI", "Cooking"],
        ),
        profile(
            "Marty",
            MapPoint { top: 40.0, left: 22.0 },
            "Chicago, IL",
            &[("english", Native), ("spanish", Intermediate), ("korean", Beginner)],
            Native,
            &["Music", "Running", "Tech"],
        ),
        profile(
            "Sofia",
            MapPoint { top: 65.0, left: 30.0 },
            "Bogotá, Colombia",
            &[("english", Intermediate), ("spanish", Native)],
            Intermediate,
            &["Travel", "Photography"],
        ),
        profile(
            "Kenji",
            MapPoint { top: 38.0, left: 82.0 },
            "Tokyo, Japan",
            &[("english", Basic), ("japanese", Native)],
            Basic,
            &["Gaming", "Anime"],
        ),
        profile(
            "Hyejin",
            MapPoint { top: 42.0, left: 76.0 },
            "Seoul, Korea",
            &[("english", Professional), ("korean", Native)],
            Professional,
            &["Baking", "Pilates"],
        ),
        profile(
            "Carlos",
            MapPoint { top: 50.0, left: 26.0 },
            "Mexico City, Mexico",
            &[("english", Basic), ("spanish", Native)],
            Basic,
            &["Soccer", "Cooking"],
        ),
        profile(
            "Ravi",
            MapPoint { top: 47.0, left: 70.0 },
            "Mumbai, India",
            &[("english", Professional), ("hindi", Native)],
            Professional,
            &["Cricket", "Startups"],
        ),
        profile(
            "Maria",
            MapPoint { top: 60.0, left: 85.0 },
            "Manila, Philippines",
            &[("english", Intermediate), ("filipino", Native)],
            Intermediate,
            &["Singing", "Volunteering"],
        ),
        profile(
            "Liam",
            MapPoint { top: 80.0, left: 90.0 },
            "Sydney, Australia",
            &[("english", Native)],
            Native,
            &["Surfing", "Beach", "Travel"],
        ),
        profile(
            "Emma",
            MapPoint { top: 52.0, left: 48.0 },
            "London, UK",
            &[("english", Native), ("french", Professional)],
            Professional,
            &["Art", "Wine", "History"],
        ),
    ]
}
