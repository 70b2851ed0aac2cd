//! Playback Events
//!
//! Discrete transport events for hosts that react to transitions rather
//! than poll snapshots:
//! - State changes (load/play/pause/stop/failure)
//! - Meditation changes
//! - Natural end of a meditation

use crate::types::TransportState;
use serde::{Deserialize, Serialize};
use zen_core::MeditationId;

/// Events emitted by the transport controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Transport state changed
    StateChanged {
        /// The new state
        state: TransportState,
    },

    /// A different meditation was loaded
    MeditationChanged {
        /// ID of the new (current) meditation
        meditation_id: MeditationId,
        /// ID of the replaced meditation (if any)
        previous_meditation_id: Option<MeditationId>,
    },

    /// Meditation played to the end
    Finished {
        /// ID of the finished meditation
        meditation_id: MeditationId,
    },

    /// Volume changed
    VolumeChanged {
        /// New linear level
        level: f32,
    },
}
