//! Waveform player: media transport, waveform view and loader in one unit
//!
//! A load runs the audio-ready signal and the waveform resolution
//! concurrently and succeeds only when both do. If either fails the whole
//! load fails, the other result is discarded and the view is cleared so it
//! never shows a waveform for a different track than the element holds.
//!
//! Player events are buffered on a broadcast channel; the embedder drains
//! them with [`WaveformPlayer::sync`] from its tick handler.

use std::time::Instant;

use tokio::sync::broadcast::{self, error::TryRecvError};

use wavebar_core::amplitude::ReduceOptions;
use wavebar_core::error::LoadError;
use wavebar_core::playlist::TrackPlayer;
use wavebar_core::source::{AmplitudeLoader, Track};
use wavebar_core::transport::{MediaElement, Player, PlayerEvent};

use crate::waveform::{Host, WaveformView};

pub struct WaveformPlayer<M, H, L>
where
    M: MediaElement,
    H: Host,
    L: AmplitudeLoader,
{
    player: Player<M>,
    view: WaveformView<H>,
    loader: L,
    reduce: ReduceOptions,
    events: broadcast::Receiver<PlayerEvent>,
}

impl<M, H, L> WaveformPlayer<M, H, L>
where
    M: MediaElement,
    H: Host,
    L: AmplitudeLoader,
{
    pub fn new(media: M, view: WaveformView<H>, loader: L, reduce: ReduceOptions) -> Self {
        let player = Player::new(media);
        let events = player.subscribe();
        Self {
            player,
            view,
            loader,
            reduce,
            events,
        }
    }

    pub fn player(&self) -> &Player<M> {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player<M> {
        &mut self.player
    }

    pub fn view(&self) -> &WaveformView<H> {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut WaveformView<H> {
        &mut self.view
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Load a track's audio and waveform
    ///
    /// Resolves once the media element is ready and the amplitude series is
    /// on the view. A newer `load` supersedes this one: dropping the
    /// returned future abandons its fetch and its ready signal.
    pub async fn load(&mut self, track: &Track) -> Result<(), LoadError> {
        log::info!("player: Loading {}", track.audio_url);

        let ready = self.player.load(&track.audio_url);
        let waveform = self.loader.load(&track.waveform, &self.reduce);

        match tokio::try_join!(ready, waveform) {
            Ok(((), series)) => {
                log::debug!("player: Ready with {} waveform points", series.len());
                self.view.reset();
                self.view.set_data(series);
                Ok(())
            }
            Err(e) => {
                log::warn!("player: Load of {} failed ({}): {}", track.audio_url, e.category(), e);
                // The element already points at the failed track
                self.view.clear_data();
                self.view.reset();
                Err(e)
            }
        }
    }

    pub fn play(&mut self) {
        self.player.play();
    }

    pub fn pause(&mut self) {
        self.player.pause();
    }

    pub fn toggle_play(&mut self) {
        self.player.toggle_play();
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.player.set_volume(volume);
    }

    /// Seek to a fraction of the duration, moving progress immediately
    pub fn seek_to_fraction(&mut self, fraction: f64) -> f64 {
        let time = self.player.seek_to_fraction(fraction);
        self.view.set_progress(fraction);
        time
    }

    /// Turn a surface click into a seek; returns the target time
    pub fn handle_click(&mut self, client_x: f32) -> Option<f64> {
        let request = self.view.on_click(client_x)?;
        Some(self.seek_to_fraction(request.fraction))
    }

    /// Apply one player event to the view
    pub fn apply_event(&mut self, event: &PlayerEvent) {
        match *event {
            PlayerEvent::TimeUpdate { .. } => {
                if let Some(progress) = event.progress() {
                    self.view.set_progress(progress);
                }
            }
            PlayerEvent::Seeked { .. } => {
                let progress = self.player.progress();
                self.view.set_progress(progress);
            }
            PlayerEvent::Ended => self.view.set_progress(1.0),
            PlayerEvent::Error(kind) => log::warn!("player: Playback error: {}", kind),
        }
    }

    /// Drain buffered player events into the view; returns how many were applied
    pub fn sync(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    self.apply_event(&event);
                    applied += 1;
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    log::warn!("player: Event receiver lagged, skipped {} events", skipped);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        applied
    }

    /// Periodic housekeeping: apply events and any settled resize
    pub fn tick(&mut self, now: Instant) {
        self.sync();
        self.view.tick(now);
    }

    /// Detach media handlers and tear down the view
    pub fn destroy(&mut self) {
        self.player.detach();
        self.view.destroy();
    }
}

impl<M, H, L> TrackPlayer for WaveformPlayer<M, H, L>
where
    M: MediaElement,
    H: Host,
    L: AmplitudeLoader,
{
    async fn load(&mut self, track: &Track) -> Result<(), LoadError> {
        WaveformPlayer::load(self, track).await
    }

    fn play(&mut self) {
        WaveformPlayer::play(self);
    }

    fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.player.subscribe()
    }

    fn handle_event(&mut self, event: &PlayerEvent) {
        self.apply_event(event);
    }
}
