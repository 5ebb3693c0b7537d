//! Playlist sequencing on top of a track player
//!
//! The sequencer is an explicit state machine:
//!
//! ```text
//! Idle ──run──► LoadingTrack(i) ──ready──► Playing(i) ──ended──► LoadingTrack(i+1)
//!                     │                                              │
//!                     └──load error──► Idle          last track ──► Ended
//! ```
//!
//! Each cycle awaits exactly one `Ended` notification from the player.
//! Other player events are handed back to the player while a track plays.

use std::future::Future;

use tokio::sync::broadcast;

use crate::error::LoadError;
use crate::source::Track;
use crate::transport::PlayerEvent;

/// A player that can load and play whole tracks
pub trait TrackPlayer {
    /// Load a track; resolves once it is ready to play
    fn load(&mut self, track: &Track) -> impl Future<Output = Result<(), LoadError>>;

    fn play(&mut self);

    /// Subscribe to this player's events
    fn subscribe(&self) -> broadcast::Receiver<PlayerEvent>;

    /// Apply a non-terminal event (time updates, seeks) while a track plays
    fn handle_event(&mut self, event: &PlayerEvent);
}

/// Sequencer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequencerState {
    #[default]
    Idle,
    LoadingTrack(usize),
    Playing(usize),
    Ended,
}

/// Ordered list of tracks with a cursor
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    tracks: Vec<Track>,
    cursor: usize,
    state: SequencerState,
}

impl Playlist {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            tracks,
            cursor: 0,
            state: SequencerState::Idle,
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// Index of the track the next `run` starts from
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&Track> {
        self.tracks.get(self.cursor)
    }

    /// Move the cursor forward; `None` at the end of the list
    pub fn next(&mut self) -> Option<&Track> {
        if self.cursor + 1 >= self.tracks.len() {
            return None;
        }
        self.cursor += 1;
        self.tracks.get(self.cursor)
    }

    /// Move the cursor back; `None` at the start of the list
    pub fn previous(&mut self) -> Option<&Track> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.tracks.get(self.cursor)
    }

    /// Play from the cursor to the end of the list
    ///
    /// A load failure stops the sequence with state `Idle` and the cursor on
    /// the failed track; nothing is retried.
    pub async fn run<P: TrackPlayer>(&mut self, player: &mut P) -> Result<(), LoadError> {
        while self.cursor < self.tracks.len() {
            let index = self.cursor;
            self.state = SequencerState::LoadingTrack(index);
            log::info!(
                "playlist: Loading track {}/{}: {}",
                index + 1,
                self.tracks.len(),
                self.tracks[index].audio_url
            );

            if let Err(e) = player.load(&self.tracks[index]).await {
                log::warn!("playlist: Track {} failed to load: {}", index + 1, e);
                self.state = SequencerState::Idle;
                return Err(e);
            }

            let mut events = player.subscribe();
            player.play();
            self.state = SequencerState::Playing(index);

            loop {
                match events.recv().await {
                    Ok(PlayerEvent::Ended) => break,
                    Ok(event) => player.handle_event(&event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        log::warn!("playlist: Event receiver lagged, skipped {} events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        log::warn!("playlist: Player went away during track {}", index + 1);
                        self.state = SequencerState::Idle;
                        return Err(LoadError::Aborted);
                    }
                }
            }

            self.cursor += 1;
        }

        self.state = SequencerState::Ended;
        log::info!("playlist: Finished {} tracks", self.tracks.len());
        Ok(())
    }
}
