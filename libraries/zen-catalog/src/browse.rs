//! Read-only queries behind the home, discover and favorites screens.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use zen_core::types::parse_length;
use zen_core::{Category, CategoryId, Meditation, MeditationId, User};

/// Loaded catalog data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Ordered by name
    pub categories: Vec<Category>,

    /// Ordered newest first
    pub meditations: Vec<Meditation>,
}

/// Discover screen filters. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoverFilter {
    /// Case-insensitive search over title and description
    pub query: String,
    pub category: Option<CategoryId>,
    /// Display length label, e.g. `"10m"`
    pub duration: Option<String>,
}

impl DiscoverFilter {
    /// Whether any filter is set
    pub fn is_active(&self) -> bool {
        !self.query.trim().is_empty() || self.category.is_some() || self.duration.is_some()
    }

    /// Reset every filter
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether `meditation` passes every filter
    pub fn matches(&self, meditation: &Meditation) -> bool {
        let query = self.query.trim().to_lowercase();
        let matches_query = query.is_empty()
            || meditation.title.to_lowercase().contains(&query)
            || meditation.description.to_lowercase().contains(&query);

        let matches_category = self
            .category
            .as_ref()
            .map_or(true, |category| &meditation.category == category);

        let matches_duration = self
            .duration
            .as_ref()
            .map_or(true, |label| &meditation.length == label);

        matches_query && matches_category && matches_duration
    }
}

impl Catalog {
    /// Meditations for the featured carousel
    pub fn featured(&self) -> Vec<&Meditation> {
        self.meditations.iter().filter(|m| m.featured).collect()
    }

    /// Home screen list: non-featured meditations, optionally in one category
    pub fn home_list(&self, category: Option<&CategoryId>) -> Vec<&Meditation> {
        self.meditations
            .iter()
            .filter(|m| !m.featured)
            .filter(|m| category.map_or(true, |c| &m.category == c))
            .collect()
    }

    /// Discover screen results
    pub fn discover(&self, filter: &DiscoverFilter) -> Vec<&Meditation> {
        self.meditations.iter().filter(|m| filter.matches(m)).collect()
    }

    /// Distinct length labels, shortest first
    pub fn duration_options(&self) -> Vec<String> {
        let labels: BTreeSet<&str> = self.meditations.iter().map(|m| m.length.as_str()).collect();
        let mut labels: Vec<String> = labels.into_iter().map(str::to_string).collect();
        labels.sort_by_key(|label| parse_length(label).unwrap_or(u32::MAX));
        labels
    }

    /// Display name of a category
    pub fn category_name(&self, id: &CategoryId) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| &c.id == id)
            .map(|c| c.name.as_str())
    }

    /// Look up one meditation
    pub fn meditation(&self, id: &MeditationId) -> Option<&Meditation> {
        self.meditations.iter().find(|m| &m.id == id)
    }

    /// Meditations whose id is in `ids`, in catalog order
    pub fn favorites_of(&self, ids: &[MeditationId]) -> Vec<&Meditation> {
        self.meditations.iter().filter(|m| ids.contains(&m.id)).collect()
    }
}

/// Part of the day used by the home screen greeting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    /// Before 12 is morning, before 17 afternoon, evening after
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=11 => Self::Morning,
            12..=16 => Self::Afternoon,
            _ => Self::Evening,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
        }
    }
}

/// "Good morning", or "Good morning, Ana" when someone is signed in
pub fn greeting(hour: u32, user: Option<&User>) -> String {
    let time = TimeOfDay::from_hour(hour).as_str();
    match user {
        Some(user) => format!("Good {}, {}", time, user.name),
        None => format!("Good {}", time),
    }
}
