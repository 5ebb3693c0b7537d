//! Shared fakes for the integration tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use wavebar_core::cache::MemoryCache;
use wavebar_core::config::ViewOptions;
use wavebar_core::decode::SymphoniaDecoder;
use wavebar_core::error::LoadError;
use wavebar_core::source::{Fetch, WaveformLoader};
use wavebar_core::transport::{ListenerId, MediaElement, MediaEvent, MediaEventKind, MediaHandler};
use wavebar_core::ReduceOptions;
use wavebar_widgets::{CanvasHost, WaveformPlayer, WaveformView};

/// Media element that reports ready (or a media error code) as soon as a
/// source is set, and ends immediately when played
#[derive(Default)]
pub struct FakeMedia {
    next_id: u64,
    listeners: BTreeMap<ListenerId, (MediaEventKind, MediaHandler)>,
    /// Sources containing a key fail with the mapped media error code
    pub failures: HashMap<String, u16>,
    pub adds: usize,
    pub removes: usize,
    pub source: Option<String>,
    pub paused: bool,
    pub time: f64,
    pub duration: f64,
    pub volume: f32,
}

impl FakeMedia {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            paused: true,
            volume: 1.0,
            ..Default::default()
        }
    }

    pub fn failing(mut self, url_part: &str, code: u16) -> Self {
        self.failures.insert(url_part.to_string(), code);
        self
    }

    pub fn fire(&mut self, event: MediaEvent) {
        for (kind, handler) in self.listeners.values_mut() {
            if *kind == event.kind() {
                handler(&event);
            }
        }
    }

    pub fn active(&self, kind: MediaEventKind) -> usize {
        self.listeners.values().filter(|(k, _)| *k == kind).count()
    }

    pub fn total_active(&self) -> usize {
        self.listeners.len()
    }
}

impl MediaElement for FakeMedia {
    fn set_source(&mut self, url: &str) {
        self.source = Some(url.to_string());
        self.time = 0.0;
        let failure = self
            .failures
            .iter()
            .find(|(part, _)| url.contains(part.as_str()))
            .map(|(_, code)| *code);
        match failure {
            Some(code) => self.fire(MediaEvent::Error { code }),
            None => self.fire(MediaEvent::CanPlay),
        }
    }

    fn play(&mut self) {
        self.paused = false;
        self.time = self.duration / 2.0;
        self.fire(MediaEvent::TimeUpdate {
            current_time: self.time,
            duration: self.duration,
        });
        self.time = self.duration;
        self.paused = true;
        self.fire(MediaEvent::Ended);
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn current_time(&self) -> f64 {
        self.time
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.time = seconds;
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn add_listener(&mut self, kind: MediaEventKind, handler: MediaHandler) -> ListenerId {
        self.next_id += 1;
        self.adds += 1;
        let id = ListenerId(self.next_id);
        self.listeners.insert(id, (kind, handler));
        id
    }

    fn remove_listener(&mut self, id: ListenerId) {
        if self.listeners.remove(&id).is_some() {
            self.removes += 1;
        }
    }
}

/// Serves canned bytes; unknown URLs fail with a network error
#[derive(Default)]
pub struct MapFetcher {
    files: RefCell<HashMap<String, Vec<u8>>>,
    pub fetches: RefCell<Vec<String>>,
}

impl MapFetcher {
    pub fn with(self, url: &str, bytes: Vec<u8>) -> Self {
        self.files.borrow_mut().insert(url.to_string(), bytes);
        self
    }
}

impl Fetch for MapFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        self.fetches.borrow_mut().push(url.to_string());
        self.files
            .borrow()
            .get(url)
            .cloned()
            .ok_or_else(|| LoadError::Network(format!("404 Not Found: {}", url)))
    }
}

/// 16-bit sine WAV with a decaying envelope
pub fn wav_bytes(channels: u16, sample_rate: u32, frames: usize) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..frames {
            let t = i as f32 / sample_rate as f32;
            let envelope = 1.0 - i as f32 / frames as f32;
            for ch in 0..channels {
                let freq = 330.0 * (ch as f32 + 1.0);
                let sample = envelope * 0.7 * (2.0 * std::f32::consts::PI * freq * t).sin();
                writer.write_sample((sample * i16::MAX as f32) as i16).unwrap();
            }
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

pub type TestLoader = WaveformLoader<MapFetcher, SymphoniaDecoder, MemoryCache>;
pub type TestPlayer = WaveformPlayer<FakeMedia, CanvasHost, TestLoader>;

/// Host with a 400px wide `#player` container whose left edge is at x = 100
pub fn host() -> CanvasHost {
    let mut host = CanvasHost::new();
    host.add_container("#player", 100.0, 400.0);
    host
}

pub fn player(media: FakeMedia, fetcher: MapFetcher, options: ViewOptions, points: usize) -> TestPlayer {
    let view = WaveformView::new(host(), "#player", options).unwrap();
    let loader = WaveformLoader::new(fetcher, SymphoniaDecoder, MemoryCache::new());
    let reduce = ReduceOptions {
        points,
        ..Default::default()
    };
    WaveformPlayer::new(media, view, loader, reduce)
}

/// Fill calls recorded on the view's surface
pub fn fill_count(player: &TestPlayer) -> usize {
    let view = player.view();
    view.surface()
        .and_then(|id| view.host().surface(id))
        .map(|s| s.draw_list.fill_count())
        .unwrap_or(0)
}
