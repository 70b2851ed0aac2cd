//! Clock-driven media backend
//!
//! Plays nothing; advances a playhead on the tokio clock and reports it
//! like a real platform player would. Used by the CLI and by tests (with
//! `tokio::time::pause` the clock is fully deterministic).

use crate::error::{PlaybackError, Result};
use crate::media::{MediaBackend, SoundHandle, StatusSink};
use crate::types::{LoadOptions, MediaStatus};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Default interval between status reports
pub const DEFAULT_TICK: Duration = Duration::from_millis(250);

/// Media backend that simulates playback on a timer
#[derive(Debug, Clone)]
pub struct SimulatedMediaBackend {
    default_duration: Duration,
    tick: Duration,
    durations: HashMap<String, Duration>,
    failing: HashSet<String>,
    stats: Arc<Stats>,
}

#[derive(Debug, Default)]
struct Stats {
    live: AtomicUsize,
    loads: AtomicUsize,
}

impl SimulatedMediaBackend {
    /// Every source lasts `default_duration`
    pub fn new(default_duration: Duration) -> Self {
        Self {
            default_duration,
            tick: DEFAULT_TICK,
            durations: HashMap::new(),
            failing: HashSet::new(),
            stats: Arc::new(Stats::default()),
        }
    }

    /// Override the length of one source
    #[must_use]
    pub fn with_duration(mut self, url: impl Into<String>, duration: Duration) -> Self {
        self.durations.insert(url.into(), duration);
        self
    }

    /// Make loading `url` fail
    #[must_use]
    pub fn with_failing_source(mut self, url: impl Into<String>) -> Self {
        self.failing.insert(url.into());
        self
    }

    /// Change the status report interval
    #[must_use]
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Number of sounds currently loaded
    pub fn live_sounds(&self) -> usize {
        self.stats.live.load(Ordering::SeqCst)
    }

    /// Number of successful loads so far
    pub fn total_loads(&self) -> usize {
        self.stats.loads.load(Ordering::SeqCst)
    }
}

impl Default for SimulatedMediaBackend {
    fn default() -> Self {
        Self::new(Duration::from_secs(10 * 60))
    }
}

#[async_trait]
impl MediaBackend for SimulatedMediaBackend {
    async fn load(
        &self,
        url: &str,
        options: LoadOptions,
        status: StatusSink,
    ) -> Result<Box<dyn SoundHandle>> {
        if self.failing.contains(url) {
            return Err(PlaybackError::Load(format!("source unavailable: {}", url)));
        }

        let duration = self.durations.get(url).copied().unwrap_or(self.default_duration);
        let sound = Arc::new(Mutex::new(SimulatedSound {
            position: Duration::ZERO,
            duration,
            playing: options.autoplay,
            volume: options.volume,
            unloaded: false,
        }));

        self.stats.live.fetch_add(1, Ordering::SeqCst);
        self.stats.loads.fetch_add(1, Ordering::SeqCst);
        debug!(url = %url, generation = status.generation(), "Simulated sound loaded");

        status.post(lock(&sound).status(false));
        tokio::spawn(run_clock(Arc::clone(&sound), status.clone(), self.tick));

        Ok(Box::new(SimulatedHandle {
            sound,
            status,
            stats: Arc::clone(&self.stats),
        }))
    }
}

#[derive(Debug)]
struct SimulatedSound {
    position: Duration,
    duration: Duration,
    playing: bool,
    volume: f32,
    unloaded: bool,
}

impl SimulatedSound {
    fn status(&self, did_just_finish: bool) -> MediaStatus {
        MediaStatus {
            position: self.position,
            duration: self.duration,
            is_playing: self.playing,
            did_just_finish,
        }
    }
}

fn lock(sound: &Mutex<SimulatedSound>) -> MutexGuard<'_, SimulatedSound> {
    sound.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn run_clock(sound: Arc<Mutex<SimulatedSound>>, status: StatusSink, tick: Duration) {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + tick, tick);

    loop {
        ticker.tick().await;

        let report = {
            let mut sound = lock(&sound);
            if sound.unloaded {
                break;
            }
            if !sound.playing {
                continue;
            }

            sound.position = (sound.position + tick).min(sound.duration);
            let finished = sound.position >= sound.duration;
            if finished {
                sound.playing = false;
            }
            sound.status(finished)
        };

        if !status.post(report) {
            break;
        }
    }
}

struct SimulatedHandle {
    sound: Arc<Mutex<SimulatedSound>>,
    status: StatusSink,
    stats: Arc<Stats>,
}

impl SimulatedHandle {
    fn update(&self, f: impl FnOnce(&mut SimulatedSound)) -> Result<()> {
        let report = {
            let mut sound = lock(&self.sound);
            if sound.unloaded {
                return Err(PlaybackError::media("sound is unloaded"));
            }
            f(&mut sound);
            sound.status(false)
        };
        self.status.post(report);
        Ok(())
    }

    fn mark_unloaded(&self) -> bool {
        let mut sound = lock(&self.sound);
        if sound.unloaded {
            return false;
        }
        sound.unloaded = true;
        sound.playing = false;
        self.stats.live.fetch_sub(1, Ordering::SeqCst);
        true
    }
}

#[async_trait]
impl SoundHandle for SimulatedHandle {
    async fn play(&mut self) -> Result<()> {
        self.update(|s| s.playing = true)
    }

    async fn pause(&mut self) -> Result<()> {
        self.update(|s| s.playing = false)
    }

    async fn seek(&mut self, position: Duration) -> Result<()> {
        self.update(|s| s.position = position.min(s.duration))
    }

    async fn set_volume(&mut self, volume: f32) -> Result<()> {
        self.update(|s| s.volume = volume)
    }

    async fn stop(&mut self) -> Result<()> {
        self.update(|s| {
            s.playing = false;
            s.position = Duration::ZERO;
        })
    }

    async fn unload(&mut self) -> Result<()> {
        if self.mark_unloaded() {
            debug!(generation = self.status.generation(), "Simulated sound unloaded");
        }
        Ok(())
    }
}

impl Drop for SimulatedHandle {
    fn drop(&mut self) {
        self.mark_unloaded();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn sink() -> (StatusSink, mpsc::UnboundedReceiver<(u64, MediaStatus)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (StatusSink::new(7, tx), rx)
    }

    fn autoplay() -> LoadOptions {
        LoadOptions {
            autoplay: true,
            volume: 1.0,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn reports_progress_until_finished() {
        let backend = SimulatedMediaBackend::new(Duration::from_secs(1));
        let (status, mut rx) = sink();
        let _handle = backend.load("a.mp3", autoplay(), status).await.unwrap();

        let mut last = MediaStatus::default();
        while let Some((generation, report)) = rx.recv().await {
            assert_eq!(generation, 7);
            last = report;
            if report.did_just_finish {
                break;
            }
        }

        assert!(last.did_just_finish);
        assert_eq!(last.position, Duration::from_secs(1));
        assert!(!last.is_playing);
    }

    #[tokio::test]
    async fn failing_source_does_not_count_as_live() {
        let backend = SimulatedMediaBackend::default().with_failing_source("bad.mp3");
        let (status, _rx) = sink();

        let result = backend.load("bad.mp3", autoplay(), status).await;
        assert!(matches!(result, Err(PlaybackError::Load(_))));
        assert_eq!(backend.live_sounds(), 0);
    }

    #[tokio::test]
    async fn unload_and_drop_release_once() {
        let backend = SimulatedMediaBackend::default();
        let (status, _rx) = sink();

        let mut handle = backend.load("a.mp3", autoplay(), status).await.unwrap();
        assert_eq!(backend.live_sounds(), 1);

        handle.unload().await.unwrap();
        assert_eq!(backend.live_sounds(), 0);

        assert!(handle.play().await.is_err());
        drop(handle);
        assert_eq!(backend.live_sounds(), 0);
    }
}
