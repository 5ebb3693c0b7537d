//! Waveform loading strategies
//!
//! A track's waveform comes from exactly one [`WaveformSource`]:
//!
//! - **Inline**: amplitude data supplied by the caller, used verbatim
//! - **Json**: a fetched document (`number[]` or `{label: number[]}`)
//! - **Decoded**: fetched audio bytes, decoded and reduced on the fly
//!
//! Fetched strategies go through the key/value cache first. A cache hit
//! bypasses fetching, decoding and reduction. A malformed cached entry is
//! treated as a miss: it is logged, refetched and overwritten.
//!
//! Loads are plain futures. Dropping a load future (because a newer load
//! replaced it) drops the in-flight fetch with it, so superseded results can
//! never be applied.

use std::future::Future;
use std::path::{Path, PathBuf};

use crate::amplitude::{parse_waveform_json, reduce, AmplitudeSeries, ReduceOptions};
use crate::cache::{cache_key, KeyValueCache};
use crate::config::DEFAULT_CACHE_NAMESPACE;
use crate::decode::{extension_hint, AudioDecoder};
use crate::error::LoadError;

/// Where a track's waveform amplitudes come from
#[derive(Debug, Clone, PartialEq)]
pub enum WaveformSource {
    /// Caller-supplied amplitudes
    Inline(AmplitudeSeries),
    /// Precomputed JSON document
    Json { url: String },
    /// Audio bytes to decode and reduce
    Decoded { url: String },
}

impl WaveformSource {
    pub fn json(url: impl Into<String>) -> Self {
        Self::Json { url: url.into() }
    }

    pub fn decoded(url: impl Into<String>) -> Self {
        Self::Decoded { url: url.into() }
    }

    /// URL fetched by this strategy, if any
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Inline(_) => None,
            Self::Json { url } | Self::Decoded { url } => Some(url),
        }
    }
}

/// A playable track: the audio for the media element plus its waveform source
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub audio_url: String,
    pub waveform: WaveformSource,
}

impl Track {
    /// Waveform decoded from the same file that is played
    pub fn new(audio_url: impl Into<String>) -> Self {
        let audio_url = audio_url.into();
        Self {
            waveform: WaveformSource::decoded(audio_url.clone()),
            audio_url,
        }
    }

    pub fn with_waveform(audio_url: impl Into<String>, waveform: WaveformSource) -> Self {
        Self {
            audio_url: audio_url.into(),
            waveform,
        }
    }
}

/// Asynchronous byte source
pub trait Fetch {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, LoadError>>;
}

/// Fetches `file://` URLs and plain paths from the local filesystem
///
/// Relative paths resolve against `root` when one is set.
#[derive(Debug, Clone, Default)]
pub struct FileFetcher {
    root: Option<PathBuf>,
}

impl FileFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, url: &str) -> PathBuf {
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl Fetch for FileFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        let path = self.resolve(url);
        log::debug!("fetch: Reading {:?}", path);
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::Interrupted => LoadError::Aborted,
            _ => LoadError::Network(format!("{}: {}", path.display(), e)),
        })
    }
}

/// Produces amplitude series for waveform sources
pub trait AmplitudeLoader {
    fn load(
        &self,
        source: &WaveformSource,
        options: &ReduceOptions,
    ) -> impl Future<Output = Result<AmplitudeSeries, LoadError>>;
}

/// Strategy dispatcher with cache
pub struct WaveformLoader<F, D, C> {
    fetcher: F,
    decoder: D,
    cache: C,
    namespace: String,
}

impl<F, D, C> WaveformLoader<F, D, C>
where
    F: Fetch,
    D: AudioDecoder,
    C: KeyValueCache,
{
    pub fn new(fetcher: F, decoder: D, cache: C) -> Self {
        Self {
            fetcher,
            decoder,
            cache,
            namespace: DEFAULT_CACHE_NAMESPACE.to_string(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    fn cached(&self, url: &str) -> Option<AmplitudeSeries> {
        let key = cache_key(&self.namespace, url);
        let raw = self.cache.get(&key)?;
        match serde_json::from_str::<AmplitudeSeries>(&raw) {
            Ok(series) => {
                log::debug!("load: Cache hit for {} ({} points)", key, series.len());
                Some(series)
            }
            Err(e) => {
                log::warn!("load: Ignoring malformed cache entry {}: {}", key, e);
                None
            }
        }
    }

    fn store(&self, url: &str, series: &AmplitudeSeries) {
        let key = cache_key(&self.namespace, url);
        match serde_json::to_string(series) {
            Ok(json) => self.cache.set(&key, json),
            Err(e) => log::warn!("load: Failed to serialize {} for cache: {}", key, e),
        }
    }
}

impl<F, D, C> AmplitudeLoader for WaveformLoader<F, D, C>
where
    F: Fetch,
    D: AudioDecoder,
    C: KeyValueCache,
{
    async fn load(
        &self,
        source: &WaveformSource,
        options: &ReduceOptions,
    ) -> Result<AmplitudeSeries, LoadError> {
        match source {
            WaveformSource::Inline(series) => Ok(series.clone()),
            WaveformSource::Json { url } => {
                if let Some(series) = self.cached(url) {
                    return Ok(series);
                }
                let bytes = self.fetcher.fetch(url).await?;
                let series = parse_waveform_json(&bytes)?;
                self.store(url, &series);
                Ok(series)
            }
            WaveformSource::Decoded { url } => {
                // Entries reduced at a different resolution are stale
                match self.cached(url) {
                    Some(series) if series.len() == options.points => return Ok(series),
                    Some(series) => log::debug!(
                        "load: Cached {} has {} points, want {}",
                        url,
                        series.len(),
                        options.points
                    ),
                    None => {}
                }
                let bytes = self.fetcher.fetch(url).await?;
                let audio = self.decoder.decode(bytes, extension_hint(url))?;
                let series = reduce(&audio.channels, options);
                log::info!(
                    "load: Reduced {} ({:.1}s, {} ch) to {} points",
                    url,
                    audio.duration_seconds(),
                    audio.channels.len(),
                    series.len()
                );
                self.store(url, &series);
                Ok(series)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    use super::*;

    /// Serves canned responses and counts fetches
    #[derive(Default)]
    pub struct FakeFetcher {
        responses: RefCell<HashMap<String, Result<Vec<u8>, LoadError>>>,
        pub fetches: Cell<usize>,
    }

    impl FakeFetcher {
        pub fn serve(&self, url: &str, response: Result<Vec<u8>, LoadError>) {
            self.responses.borrow_mut().insert(url.to_string(), response);
        }
    }

    impl Fetch for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError> {
            self.fetches.set(self.fetches.get() + 1);
            self.responses
                .borrow()
                .get(url)
                .cloned()
                .unwrap_or_else(|| Err(LoadError::Network(format!("404 {}", url))))
        }
    }
}
