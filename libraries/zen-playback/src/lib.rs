//! Desert Zen - Playback
//!
//! Audio transport for guided meditations.
//!
//! This crate provides:
//! - A transport state machine (idle, loading, playing, paused, failed)
//! - Single-sound resource ownership: the previous sound is always released
//!   before the next one loads
//! - Clamped seek, 15-second skips, and volume in `0.0..=1.0`
//! - Status reports from the media backend, tagged per load so late
//!   reports from a replaced sound are ignored
//! - Snapshots over a `watch` channel for mini-player style observers
//!
//! # Architecture
//!
//! `zen-playback` does no decoding. The platform media API is provided via
//! the [`MediaBackend`] and [`SoundHandle`] traits; [`SimulatedMediaBackend`]
//! implements them on a timer for the CLI and tests.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use zen_core::{CategoryId, Meditation, MeditationId};
//! use zen_playback::{SimulatedMediaBackend, TransportConfig, TransportController};
//!
//! # async fn demo() -> zen_playback::Result<()> {
//! let backend = Arc::new(SimulatedMediaBackend::default());
//! let mut transport = TransportController::new(backend, TransportConfig::default());
//!
//! let meditation = Meditation::new(
//!     MeditationId::new("m1"),
//!     "Morning Calm",
//!     CategoryId::new("breath"),
//!     10,
//!     "https://cdn.example.com/calm.mp3",
//! );
//!
//! transport.play(&meditation).await?;
//! transport.set_volume(0.6).await?;
//! transport.drain_status();
//! transport.skip_forward().await?;
//! transport.pause().await?;
//! # Ok(())
//! # }
//! ```

mod clock;
mod error;
mod events;
mod media;
mod simulated;
mod transport;
pub mod types;
mod volume;

// Public exports
pub use clock::{format_clock, format_duration};
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use media::{MediaBackend, SoundHandle, StatusSink};
pub use simulated::SimulatedMediaBackend;
pub use transport::{spawn_status_pump, TransportController};
pub use types::{
    LoadOptions, MediaStatus, PlaybackSnapshot, TransportConfig, TransportState,
    DEFAULT_SKIP_INTERVAL,
};
pub use volume::Volume;
