//! Core types for the audio transport

use serde::{Deserialize, Serialize};
use std::time::Duration;
use zen_core::Meditation;

/// Default skip step of the player screen
pub const DEFAULT_SKIP_INTERVAL: Duration = Duration::from_secs(15);

/// Transport state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportState {
    /// Nothing loaded
    Idle,

    /// Source is being loaded
    Loading,

    /// Currently playing
    Playing,

    /// Paused mid-meditation
    Paused,

    /// The last load failed; the reason is kept for display
    Failed(String),
}

impl TransportState {
    /// Whether audio is audible right now
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }
}

/// What observers (the mini-player, the player screen) see
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    /// Meditation currently loaded (or being loaded)
    pub current_meditation: Option<Meditation>,

    /// Transport state
    pub state: TransportState,

    /// Playhead, always within `[0, duration]`
    pub position: Duration,

    /// Total length reported by the media backend (zero until known)
    pub duration: Duration,

    /// Linear volume in `[0.0, 1.0]`
    pub volume: f32,
}

impl PlaybackSnapshot {
    /// Whether audio is audible right now
    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    /// Fraction of the meditation played, for progress bars
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            0.0
        } else {
            (self.position.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
        }
    }
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self {
            current_meditation: None,
            state: TransportState::Idle,
            position: Duration::ZERO,
            duration: Duration::ZERO,
            volume: 1.0,
        }
    }
}

/// Status report posted by a media backend while a sound is loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MediaStatus {
    /// Current playhead
    pub position: Duration,

    /// Total length (zero if the backend does not know yet)
    pub duration: Duration,

    /// Whether the sound is audible
    pub is_playing: bool,

    /// Set once, on the report that crosses the end of the sound
    pub did_just_finish: bool,
}

/// Options passed to [`crate::MediaBackend::load`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadOptions {
    /// Start playing as soon as the source is ready
    pub autoplay: bool,

    /// Initial linear volume
    pub volume: f32,
}

/// Configuration for the transport controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Initial volume (0.0-1.0, default: 1.0)
    pub volume: f32,

    /// Step used by skip forward/backward (default: 15 s)
    pub skip_interval: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            volume: 1.0,
            skip_interval: DEFAULT_SKIP_INTERVAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = TransportConfig::default();
        assert_eq!(config.volume, 1.0);
        assert_eq!(config.skip_interval, Duration::from_secs(15));
    }

    #[test]
    fn progress_handles_unknown_duration() {
        let snapshot = PlaybackSnapshot::default();
        assert_eq!(snapshot.progress(), 0.0);

        let snapshot = PlaybackSnapshot {
            position: Duration::from_secs(30),
            duration: Duration::from_secs(120),
            ..PlaybackSnapshot::default()
        };
        assert!((snapshot.progress() - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn only_playing_is_audible() {
        assert!(TransportState::Playing.is_playing());
        assert!(!TransportState::Paused.is_playing());
        assert!(!TransportState::Failed("boom".into()).is_playing());
    }
}
