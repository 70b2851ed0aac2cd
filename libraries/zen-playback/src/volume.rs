//! Volume control
//!
//! The platform media API takes a linear gain in `0.0..=1.0`; sliders show
//! a percentage. Every input is clamped, so infinities land on the nearest
//! bound, and NaN reads as silence.

/// Linear volume level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume {
    /// Level in `[0.0, 1.0]`
    level: f32,
}

impl Volume {
    /// Create a volume at `level` (clamped)
    pub fn new(level: f32) -> Self {
        Self {
            level: Self::clamp(level),
        }
    }

    /// Set the level (clamped)
    pub fn set_level(&mut self, level: f32) {
        self.level = Self::clamp(level);
    }

    /// Current level in `[0.0, 1.0]`
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Level as a whole percentage, for display
    pub fn percent(&self) -> u8 {
        (self.level * 100.0).round() as u8
    }

    /// Whether the level is zero
    pub fn is_silent(&self) -> bool {
        self.level == 0.0
    }

    fn clamp(level: f32) -> f32 {
        if level.is_nan() {
            0.0
        } else {
            level.clamp(0.0, 1.0)
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(1.0)
    }
}
