/// Meditation and category view models
use serde::{Deserialize, Serialize};

use super::{CategoryId, MeditationId};

/// A meditation as shown on the browse, favorites and player screens
///
/// Read-only from the client's perspective; built from a `meditations` row
/// joined with its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meditation {
    /// Unique meditation identifier
    pub id: MeditationId,

    /// Title
    pub title: String,

    /// Short description
    pub description: String,

    /// Category this meditation belongs to
    pub category: CategoryId,

    /// Display length, e.g. `"15m"`
    pub length: String,

    /// Length in whole minutes, kept for numeric sorting
    pub duration_minutes: u32,

    /// Remote audio source
    pub audio_url: String,

    /// Cover image
    pub image_url: String,

    /// Shown in the featured carousel
    pub featured: bool,

    /// Creation timestamp (ISO string)
    pub created_at: String,
}

impl Meditation {
    /// Create a meditation with the fields playback needs; the rest default to empty
    pub fn new(
        id: MeditationId,
        title: impl Into<String>,
        category: CategoryId,
        duration_minutes: u32,
        audio_url: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            category,
            length: format_length(duration_minutes),
            duration_minutes,
            audio_url: audio_url.into(),
            image_url: String::new(),
            featured: false,
            created_at: String::new(),
        }
    }
}

/// Display label for a duration in minutes
pub fn format_length(duration_minutes: u32) -> String {
    format!("{}m", duration_minutes)
}

/// Parse the leading minutes out of a display label (`"15m"` -> 15)
pub fn parse_length(label: &str) -> Option<u32> {
    let digits: String = label.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Meditation category (read-only reference data)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique category identifier
    pub id: CategoryId,

    /// Display name
    pub name: String,

    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_label_round_trips_minutes() {
        assert_eq!(format_length(15), "15m");
        assert_eq!(parse_length("15m"), Some(15));
        assert_eq!(parse_length("5m"), Some(5));
    }

    #[test]
    fn parse_length_rejects_non_numeric_labels() {
        assert_eq!(parse_length("m"), None);
        assert_eq!(parse_length(""), None);
    }

    #[test]
    fn new_meditation_derives_label() {
        let m = Meditation::new(
            MeditationId::new("m1"),
            "Body Scan",
            CategoryId::new("sleep"),
            20,
            "https://cdn.example.com/scan.mp3",
        );
        assert_eq!(m.length, "20m");
        assert!(!m.featured);
    }
}
