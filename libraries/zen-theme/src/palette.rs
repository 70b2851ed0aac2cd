//! Color sets for the light and dark themes.

use serde::Serialize;

/// Named colors used across the screens. Values are CSS color strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub dark: bool,

    pub primary: &'static str,
    pub primary_light: &'static str,
    pub primary_dark: &'static str,
    pub secondary: &'static str,
    pub secondary_light: &'static str,
    pub secondary_dark: &'static str,
    pub accent: &'static str,
    pub accent_light: &'static str,
    pub accent_dark: &'static str,

    pub background: &'static str,
    pub card: &'static str,
    pub text: &'static str,
    pub text_secondary: &'static str,
    pub text_tertiary: &'static str,
    pub border: &'static str,

    pub neutral_0: &'static str,
    pub neutral_100: &'static str,
    pub neutral_900: &'static str,

    pub notification: &'static str,
    pub success: &'static str,
    pub error: &'static str,
    pub warning: &'static str,

    pub background_secondary: &'static str,
    pub surface: &'static str,
    pub shadow: &'static str,
}

/// Sand tones on a light background
pub const LIGHT: Palette = Palette {
    dark: false,

    primary: "#E0DDD1",
    primary_light: "#F0EEE5",
    primary_dark: "#D4CEC4",
    secondary: "#544F45",
    secondary_light: "#655F52",
    secondary_dark: "#322E26",
    accent: "#D85E58",
    accent_light: "#E57B76",
    accent_dark: "#B94C46",

    background: "#E0DDD1",
    card: "#E9E6DD",
    text: "#322E26",
    text_secondary: "#655F52",
    text_tertiary: "#8A8984",
    border: "#D4CEC4",

    neutral_0: "#FFFFFF",
    neutral_100: "#F9F8F0",
    neutral_900: "#322E26",

    notification: "#BF4A40",
    success: "#4CAF50",
    error: "#F44336",
    warning: "#FFC107",

    background_secondary: "#E9E6DD",
    surface: "#E9E6DD",
    shadow: "rgba(50, 46, 38, 0.1)",
};

/// Night desert: dark earth with the terracotta accent promoted to primary
pub const DARK: Palette = Palette {
    dark: true,

    primary: "#D85E58",
    primary_light: "#E28783",
    primary_dark: "#B94C46",
    secondary: "#322E26",
    secondary_light: "#655F52",
    secondary_dark: "#544F45",
    accent: "#D85E58",
    accent_light: "#E57B76",
    accent_dark: "#B94C46",

    background: "#322E26",
    card: "#706B58",
    text: "#F9F8F0",
    text_secondary: "#E0DDD1",
    text_tertiary: "#D4CEC4",
    border: "#8A8984",

    neutral_0: "#FFFFFF",
    neutral_100: "#F9F8F0",
    neutral_900: "#322E26",

    notification: "#BF4A40",
    success: "#4CAF50",
    error: "#F44336",
    warning: "#FFC107",

    background_secondary: "#706B58",
    surface: "#706B58",
    shadow: "rgba(0, 0, 0, 0.3)",
};
