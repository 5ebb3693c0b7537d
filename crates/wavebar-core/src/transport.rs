//! Media transport: the audio element contract and the player that drives it
//!
//! The host owns the actual media element (an `<audio>` tag, a native
//! output stream, a test fake) and exposes it through [`MediaElement`].
//! [`Player`] wires per-load event handlers onto it and republishes what the
//! rest of the widget cares about on its own broadcast channel.
//!
//! ## Handler lifecycle
//!
//! Every `load` first removes the handlers registered by the previous load,
//! then registers exactly one handler per [`MediaEventKind`]. However many
//! loads run, at most one handler per event kind is active on the element.
//!
//! A superseded load's ready signal is dropped together with its handlers,
//! so its future resolves to [`LoadError::Superseded`] instead of racing the
//! new load.

use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, oneshot};

use crate::error::{LoadError, MediaErrorKind};

/// Capacity of the per-player event channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Handle for a registered element listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Event kinds the player subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaEventKind {
    CanPlay,
    TimeUpdate,
    Ended,
    Error,
}

/// Events raised by a media element
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaEvent {
    /// Enough data is buffered to start playback
    CanPlay,
    /// Playback position advanced
    TimeUpdate { current_time: f64, duration: f64 },
    /// Playback reached the end of the track
    Ended,
    /// Terminal media error with the element's numeric code
    Error { code: u16 },
}

impl MediaEvent {
    pub fn kind(&self) -> MediaEventKind {
        match self {
            Self::CanPlay => MediaEventKind::CanPlay,
            Self::TimeUpdate { .. } => MediaEventKind::TimeUpdate,
            Self::Ended => MediaEventKind::Ended,
            Self::Error { .. } => MediaEventKind::Error,
        }
    }
}

/// Boxed element event handler
pub type MediaHandler = Box<dyn FnMut(&MediaEvent) + Send>;

/// An audio element owned by the host
pub trait MediaElement {
    /// Start loading a new source; readiness is reported via `CanPlay`
    fn set_source(&mut self, url: &str);
    fn play(&mut self);
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
    /// Playback position in seconds
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);
    /// Track duration in seconds (0 or NaN while unknown)
    fn duration(&self) -> f64;
    fn volume(&self) -> f32;
    fn set_volume(&mut self, volume: f32);
    fn add_listener(&mut self, kind: MediaEventKind, handler: MediaHandler) -> ListenerId;
    fn remove_listener(&mut self, id: ListenerId);
}

/// Events published by a [`Player`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerEvent {
    TimeUpdate { current_time: f64, duration: f64 },
    Seeked { time: f64 },
    Ended,
    Error(MediaErrorKind),
}

impl PlayerEvent {
    /// Playback progress as a fraction of duration, for time updates
    pub fn progress(&self) -> Option<f64> {
        match *self {
            Self::TimeUpdate {
                current_time,
                duration,
            } => Some(fraction(current_time, duration)),
            _ => None,
        }
    }
}

/// `time / duration` clamped to [0, 1]; 0 while the duration is unknown
pub fn fraction(time: f64, duration: f64) -> f64 {
    if duration.is_finite() && duration > 0.0 && time.is_finite() {
        (time / duration).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

type ReadySender = Arc<Mutex<Option<oneshot::Sender<Result<(), LoadError>>>>>;

fn signal_ready(ready: &ReadySender, result: Result<(), LoadError>) {
    if let Some(tx) = ready.lock().ok().and_then(|mut slot| slot.take()) {
        // A dropped receiver means the load future was abandoned
        let _ = tx.send(result);
    }
}

/// Owns a media element and its per-load handlers
pub struct Player<M: MediaElement> {
    media: M,
    handlers: Vec<ListenerId>,
    events: broadcast::Sender<PlayerEvent>,
    source: Option<String>,
}

impl<M: MediaElement> Player<M> {
    pub fn new(media: M) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            media,
            handlers: Vec::new(),
            events,
            source: None,
        }
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Subscribe to this player's events
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }

    /// Number of handlers currently registered on the element
    pub fn active_handlers(&self) -> usize {
        self.handlers.len()
    }

    /// Load a new source
    ///
    /// Handlers from the previous load are removed before the new ones are
    /// attached. The returned future does not borrow the player; it resolves
    /// once the element reports `CanPlay` and rejects with a categorized
    /// media error if the element fails first.
    pub fn load(&mut self, url: &str) -> impl Future<Output = Result<(), LoadError>> + 'static {
        self.detach();

        let (tx, rx) = oneshot::channel();
        let ready: ReadySender = Arc::new(Mutex::new(Some(tx)));

        let on_can_play = {
            let ready = Arc::clone(&ready);
            Box::new(move |_: &MediaEvent| signal_ready(&ready, Ok(()))) as MediaHandler
        };

        let on_error = {
            let ready = Arc::clone(&ready);
            let events = self.events.clone();
            Box::new(move |event: &MediaEvent| {
                if let MediaEvent::Error { code } = *event {
                    let error = LoadError::media(code);
                    log::warn!("player: Media error: {}", error);
                    signal_ready(&ready, Err(error));
                    let _ = events.send(PlayerEvent::Error(MediaErrorKind::from_code(code)));
                }
            }) as MediaHandler
        };

        let on_time_update = {
            let events = self.events.clone();
            Box::new(move |event: &MediaEvent| {
                if let MediaEvent::TimeUpdate {
                    current_time,
                    duration,
                } = *event
                {
                    let _ = events.send(PlayerEvent::TimeUpdate {
                        current_time,
                        duration,
                    });
                }
            }) as MediaHandler
        };

        let on_ended = {
            let events = self.events.clone();
            Box::new(move |_: &MediaEvent| {
                let _ = events.send(PlayerEvent::Ended);
            }) as MediaHandler
        };

        self.handlers = vec![
            self.media.add_listener(MediaEventKind::CanPlay, on_can_play),
            self.media.add_listener(MediaEventKind::Error, on_error),
            self.media.add_listener(MediaEventKind::TimeUpdate, on_time_update),
            self.media.add_listener(MediaEventKind::Ended, on_ended),
        ];

        log::debug!("player: Loading {}", url);
        self.source = Some(url.to_string());
        self.media.set_source(url);

        async move { rx.await.unwrap_or(Err(LoadError::Superseded)) }
    }

    /// Remove every handler registered by the current load
    pub fn detach(&mut self) {
        for id in self.handlers.drain(..) {
            self.media.remove_listener(id);
        }
    }

    pub fn play(&mut self) {
        self.media.play();
    }

    pub fn pause(&mut self) {
        self.media.pause();
    }

    pub fn toggle_play(&mut self) {
        if self.media.is_paused() {
            self.media.play();
        } else {
            self.media.pause();
        }
    }

    pub fn is_playing(&self) -> bool {
        !self.media.is_paused()
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.media.set_volume(volume.clamp(0.0, 1.0));
    }

    pub fn volume(&self) -> f32 {
        self.media.volume()
    }

    pub fn current_time(&self) -> f64 {
        self.media.current_time()
    }

    pub fn duration(&self) -> f64 {
        self.media.duration()
    }

    /// Playback position as a fraction of the duration
    pub fn progress(&self) -> f64 {
        fraction(self.media.current_time(), self.media.duration())
    }

    /// Seek to an absolute time, clamped to the track
    pub fn seek(&mut self, seconds: f64) {
        let duration = self.media.duration();
        let target = if duration.is_finite() && duration > 0.0 {
            seconds.clamp(0.0, duration)
        } else {
            seconds.max(0.0)
        };
        self.media.set_current_time(target);
        let _ = self.events.send(PlayerEvent::Seeked { time: target });
    }

    /// Seek to a fraction of the duration; returns the target time
    pub fn seek_to_fraction(&mut self, fraction: f64) -> f64 {
        let duration = self.media.duration();
        let duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
        let target = fraction.clamp(0.0, 1.0) * duration;
        self.seek(target);
        target
    }
}

impl<M: MediaElement> Drop for Player<M> {
    fn drop(&mut self) {
        self.detach();
    }
}
