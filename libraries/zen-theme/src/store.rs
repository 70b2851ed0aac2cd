//! Theme selection state

use crate::palette::{Palette, DARK, LIGHT};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Color scheme reported by the operating system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl ColorScheme {
    /// Parse the platform's scheme name; unknown values (including
    /// "no preference") read as light
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("dark") {
            Self::Dark
        } else {
            Self::Light
        }
    }
}

/// Which theme the user wants.
///
/// Serializable so a host can persist it; the store itself stores nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    /// Follow the OS scheme
    #[default]
    System,
    Light,
    Dark,
}

/// Current theme: the OS scheme plus an optional manual override
#[derive(Debug, Clone, Default)]
pub struct ThemeStore {
    os_scheme: ColorScheme,
    preference: ThemePreference,
}

impl ThemeStore {
    /// Start following `os_scheme`
    pub fn new(os_scheme: ColorScheme) -> Self {
        Self {
            os_scheme,
            preference: ThemePreference::System,
        }
    }

    /// Start from a persisted preference
    pub fn with_preference(os_scheme: ColorScheme, preference: ThemePreference) -> Self {
        Self { os_scheme, preference }
    }

    /// Whether the dark palette is active
    pub fn is_dark(&self) -> bool {
        match self.preference {
            ThemePreference::System => self.os_scheme == ColorScheme::Dark,
            ThemePreference::Light => false,
            ThemePreference::Dark => true,
        }
    }

    /// Active palette
    pub fn palette(&self) -> &'static Palette {
        if self.is_dark() {
            &DARK
        } else {
            &LIGHT
        }
    }

    pub fn preference(&self) -> ThemePreference {
        self.preference
    }

    /// Flip between light and dark, overriding the OS scheme
    pub fn toggle_theme(&mut self) {
        self.preference = if self.is_dark() {
            ThemePreference::Light
        } else {
            ThemePreference::Dark
        };
        debug!(preference = ?self.preference, "Theme toggled");
    }

    /// The OS scheme changed. A scheme change wins over a manual toggle
    /// and the store goes back to following the OS.
    pub fn os_scheme_changed(&mut self, scheme: ColorScheme) {
        self.os_scheme = scheme;
        self.preference = ThemePreference::System;
        debug!(scheme = ?scheme, "OS color scheme changed");
    }
}
