//! Platform media abstraction
//!
//! The host's audio API (streaming a remote URL, reporting progress) is
//! provided through these traits so the transport stays platform-agnostic.

use crate::error::Result;
use crate::types::{LoadOptions, MediaStatus};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;

/// Status report tagged with the load generation it belongs to
pub(crate) type TaggedStatus = (u64, MediaStatus);

/// Loads remote audio into playable sounds
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Load `url` and return a handle to the loaded sound.
    ///
    /// The backend posts progress through `status` for as long as the
    /// sound stays loaded.
    async fn load(
        &self,
        url: &str,
        options: LoadOptions,
        status: StatusSink,
    ) -> Result<Box<dyn SoundHandle>>;
}

/// A loaded sound
///
/// Exactly one handle is live per transport; it is stopped and unloaded
/// before another is loaded.
#[async_trait]
pub trait SoundHandle: Send {
    /// Start or resume playback
    async fn play(&mut self) -> Result<()>;

    /// Pause playback, keeping the playhead
    async fn pause(&mut self) -> Result<()>;

    /// Move the playhead
    async fn seek(&mut self, position: Duration) -> Result<()>;

    /// Apply a linear volume in `[0.0, 1.0]`
    async fn set_volume(&mut self, volume: f32) -> Result<()>;

    /// Stop playback and rewind
    async fn stop(&mut self) -> Result<()>;

    /// Release the platform resources; the handle is unusable afterwards
    async fn unload(&mut self) -> Result<()>;
}

/// Channel a media backend posts [`MediaStatus`] reports into
///
/// Each sink is bound to one load generation; reports from a sound that
/// has since been replaced are discarded by the transport.
#[derive(Debug, Clone)]
pub struct StatusSink {
    generation: u64,
    tx: mpsc::UnboundedSender<TaggedStatus>,
}

impl StatusSink {
    pub(crate) fn new(generation: u64, tx: mpsc::UnboundedSender<TaggedStatus>) -> Self {
        Self { generation, tx }
    }

    /// Generation this sink reports for
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Post a status report. Returns false once the transport is gone.
    pub fn post(&self, status: MediaStatus) -> bool {
        self.tx.send((self.generation, status)).is_ok()
    }

    /// Whether the transport still listens
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
