//! Transport controller - core orchestration
//!
//! Owns the single live sound, its state machine and the snapshot
//! observers read:
//!
//! ```text
//! Idle -> Loading -> Playing <-> Paused
//!            |
//!            +-> Failed(reason)
//! ```
//!
//! `stop()` returns to `Idle` from anywhere.

use crate::{
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    media::{MediaBackend, SoundHandle, StatusSink, TaggedStatus},
    types::{LoadOptions, MediaStatus, PlaybackSnapshot, TransportConfig, TransportState},
    volume::Volume,
};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use zen_core::Meditation;

/// Audio transport controller
///
/// Single-owner (`&mut self`); hosts that share it wrap it in
/// `Arc<tokio::sync::Mutex<_>>` and run [`spawn_status_pump`].
pub struct TransportController {
    backend: Arc<dyn MediaBackend>,

    // Live sound
    handle: Option<Box<dyn SoundHandle>>,
    current: Option<Meditation>,
    generation: u64,

    // State
    state: TransportState,
    position: Duration,
    duration: Duration,
    volume: Volume,
    skip_interval: Duration,

    // Status reports from the media backend
    status_tx: mpsc::UnboundedSender<TaggedStatus>,
    status_rx: mpsc::UnboundedReceiver<TaggedStatus>,

    // Observers
    snapshot_tx: watch::Sender<PlaybackSnapshot>,
    pending_events: Vec<PlaybackEvent>,
}

impl TransportController {
    /// Create a controller over a media backend
    pub fn new(backend: Arc<dyn MediaBackend>, config: TransportConfig) -> Self {
        let volume = Volume::new(config.volume);
        let (status_tx, status_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, _) = watch::channel(PlaybackSnapshot {
            volume: volume.level(),
            ..PlaybackSnapshot::default()
        });

        Self {
            backend,
            handle: None,
            current: None,
            generation: 0,
            state: TransportState::Idle,
            position: Duration::ZERO,
            duration: Duration::ZERO,
            volume,
            skip_interval: config.skip_interval,
            status_tx,
            status_rx,
            snapshot_tx,
            pending_events: Vec::new(),
        }
    }

    // ===== Playback Control =====

    /// Play a meditation.
    ///
    /// If it is already loaded, playback resumes in place. Otherwise the
    /// previous sound is released and the new one is loaded with autoplay.
    pub async fn play(&mut self, meditation: &Meditation) -> Result<()> {
        let same = self.handle.is_some()
            && self.current.as_ref().is_some_and(|m| m.id == meditation.id);

        if same {
            return self.resume().await;
        }

        self.acquire(meditation).await
    }

    /// Pause playback. No-op unless playing.
    pub async fn pause(&mut self) -> Result<()> {
        let handle = self.handle.as_mut().ok_or(PlaybackError::NoMeditationLoaded)?;

        if self.state == TransportState::Playing {
            handle.pause().await?;
            self.set_state(TransportState::Paused);
        }
        Ok(())
    }

    /// Resume playback. A meditation that played to the end restarts.
    pub async fn resume(&mut self) -> Result<()> {
        let at_end = !self.duration.is_zero() && self.position >= self.duration;
        let handle = self.handle.as_mut().ok_or(PlaybackError::NoMeditationLoaded)?;

        if self.state == TransportState::Playing {
            return Ok(());
        }

        if at_end {
            handle.seek(Duration::ZERO).await?;
            self.position = Duration::ZERO;
        }

        handle.play().await?;
        self.set_state(TransportState::Playing);
        Ok(())
    }

    /// Play if paused, pause if playing; retries a failed load.
    pub async fn toggle(&mut self) -> Result<()> {
        match self.state.clone() {
            TransportState::Playing => self.pause().await,
            TransportState::Paused => self.resume().await,
            TransportState::Failed(_) => match self.current.clone() {
                Some(meditation) => self.acquire(&meditation).await,
                None => Err(PlaybackError::NoMeditationLoaded),
            },
            TransportState::Idle => Err(PlaybackError::NoMeditationLoaded),
            TransportState::Loading => Err(PlaybackError::InvalidOperation(
                "Cannot toggle while loading".to_string(),
            )),
        }
    }

    /// Stop playback, release the sound and clear the current meditation.
    ///
    /// Volume is kept.
    pub async fn stop(&mut self) {
        self.release().await;
        self.current = None;
        self.position = Duration::ZERO;
        self.duration = Duration::ZERO;
        self.set_state(TransportState::Idle);
        info!("Playback stopped");
    }

    // ===== Seek =====

    /// Seek within the current meditation, clamped to `[0, duration]`.
    pub async fn seek(&mut self, position: Duration) -> Result<()> {
        let target = position.min(self.duration);
        let handle = self.handle.as_mut().ok_or(PlaybackError::NoMeditationLoaded)?;

        handle.seek(target).await?;
        self.position = target;
        self.publish();
        Ok(())
    }

    /// Jump back by the skip interval (never before zero)
    pub async fn skip_backward(&mut self) -> Result<()> {
        let target = self.position.saturating_sub(self.skip_interval);
        self.seek(target).await
    }

    /// Jump forward by the skip interval (never past the end)
    pub async fn skip_forward(&mut self) -> Result<()> {
        let target = self.position.saturating_add(self.skip_interval);
        self.seek(target).await
    }

    // ===== Volume =====

    /// Set the linear volume (clamped to `[0.0, 1.0]`) and apply it to the live sound.
    pub async fn set_volume(&mut self, level: f32) -> Result<()> {
        let mut volume = self.volume;
        volume.set_level(level);

        if let Some(handle) = self.handle.as_mut() {
            handle.set_volume(volume.level()).await?;
        }

        self.volume = volume;
        self.pending_events.push(PlaybackEvent::VolumeChanged {
            level: volume.level(),
        });
        self.publish();
        Ok(())
    }

    /// Current linear volume
    pub fn volume(&self) -> f32 {
        self.volume.level()
    }

    // ===== State Queries =====

    /// Current transport state
    pub fn state(&self) -> &TransportState {
        &self.state
    }

    /// Whether audio is audible
    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    /// Meditation currently loaded (or whose load failed)
    pub fn current_meditation(&self) -> Option<&Meditation> {
        self.current.as_ref()
    }

    /// Current playhead
    pub fn position(&self) -> Duration {
        self.position
    }

    /// Total length (zero until the backend reports it)
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Current snapshot
    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            current_meditation: self.current.clone(),
            state: self.state.clone(),
            position: self.position,
            duration: self.duration,
            volume: self.volume.level(),
        }
    }

    /// Receive a snapshot on every change
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.snapshot_tx.subscribe()
    }

    // ===== Status Reports =====

    /// Apply every status report queued by the media backend.
    ///
    /// Returns the number of reports applied; reports from replaced
    /// sounds are discarded and not counted.
    pub fn drain_status(&mut self) -> usize {
        let mut applied = 0;
        while let Ok((generation, status)) = self.status_rx.try_recv() {
            if self.apply_status(generation, status) {
                applied += 1;
            }
        }
        applied
    }

    fn apply_status(&mut self, generation: u64, status: MediaStatus) -> bool {
        if generation != self.generation || self.handle.is_none() {
            debug!(
                generation,
                current = self.generation,
                "Ignoring status from a replaced sound"
            );
            return false;
        }

        if !status.duration.is_zero() {
            self.duration = status.duration;
        }
        self.position = status.position.min(self.duration);

        if status.did_just_finish {
            self.position = self.duration;
            if let Some(meditation) = &self.current {
                info!(meditation_id = %meditation.id, "Meditation finished");
                self.pending_events.push(PlaybackEvent::Finished {
                    meditation_id: meditation.id.clone(),
                });
            }
            self.set_state(TransportState::Paused);
            return true;
        }

        match (&self.state, status.is_playing) {
            (TransportState::Paused, true) => self.set_state(TransportState::Playing),
            (TransportState::Playing, false) => self.set_state(TransportState::Paused),
            _ => self.publish(),
        }
        true
    }

    // ===== Events =====

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Internal =====

    /// Release the previous sound, then load `meditation` with autoplay.
    async fn acquire(&mut self, meditation: &Meditation) -> Result<()> {
        self.release().await;

        let previous = self.current.replace(meditation.clone()).map(|m| m.id);
        if previous.as_ref() != Some(&meditation.id) {
            self.pending_events.push(PlaybackEvent::MeditationChanged {
                meditation_id: meditation.id.clone(),
                previous_meditation_id: previous,
            });
        }

        self.generation += 1;
        self.position = Duration::ZERO;
        self.duration = Duration::ZERO;
        self.set_state(TransportState::Loading);

        debug!(
            meditation_id = %meditation.id,
            url = %meditation.audio_url,
            generation = self.generation,
            "Loading meditation audio"
        );

        let sink = StatusSink::new(self.generation, self.status_tx.clone());
        let options = LoadOptions {
            autoplay: true,
            volume: self.volume.level(),
        };

        match self.backend.load(&meditation.audio_url, options, sink).await {
            Ok(handle) => {
                self.handle = Some(handle);
                info!(meditation_id = %meditation.id, title = %meditation.title, "Playing meditation");
                self.set_state(TransportState::Playing);
                Ok(())
            }
            Err(e) => {
                warn!(meditation_id = %meditation.id, error = %e, "Failed to load meditation audio");
                self.set_state(TransportState::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Stop and unload the live sound, if any. Failures are logged, never returned.
    async fn release(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            if let Err(e) = handle.stop().await {
                warn!(error = %e, "Failed to stop sound");
            }
            if let Err(e) = handle.unload().await {
                warn!(error = %e, "Failed to unload sound");
            }
        }
    }

    fn set_state(&mut self, state: TransportState) {
        if self.state != state {
            self.state = state.clone();
            self.pending_events.push(PlaybackEvent::StateChanged { state });
        }
        self.publish();
    }

    fn publish(&self) {
        // send_replace keeps the latest value even with no receivers
        self.snapshot_tx.send_replace(self.snapshot());
    }
}

/// Apply status reports on a background task every `interval`.
///
/// The task ends once the controller is dropped.
pub fn spawn_status_pump(
    controller: &Arc<Mutex<TransportController>>,
    interval: Duration,
) -> JoinHandle<()> {
    let controller: Weak<Mutex<TransportController>> = Arc::downgrade(controller);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let Some(controller) = controller.upgrade() else {
                debug!("Transport dropped, stopping status pump");
                break;
            };
            controller.lock().await.drain_status();
        }
    })
}
