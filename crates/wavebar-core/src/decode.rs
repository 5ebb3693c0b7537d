//! Audio decoding facility
//!
//! The amplitude pipeline only needs one `f32` sample array per channel at
//! the native sample rate. [`AudioDecoder`] is that contract;
//! [`SymphoniaDecoder`] implements it for WAV, FLAC and MP3 byte buffers.

use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::LoadError;

/// Planar decoded audio
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedAudio {
    /// One sample array per channel
    pub channels: Vec<Vec<f32>>,
    /// Native sample rate in Hz
    pub sample_rate: u32,
}

impl DecodedAudio {
    /// Frames per channel
    pub fn frames(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }
}

/// Decodes raw audio bytes into per-channel samples
pub trait AudioDecoder {
    /// `hint` is a file extension (e.g. `"wav"`) used to speed up probing
    fn decode(&self, bytes: Vec<u8>, hint: Option<&str>) -> Result<DecodedAudio, LoadError>;
}

/// Extract a probe hint (file extension) from a URL or path
pub fn extension_hint(url: &str) -> Option<&str> {
    let path = url.split(|c: char| c == '?' || c == '#').next().unwrap_or(url);
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}

/// Symphonia-backed decoder
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaDecoder;

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&self, bytes: Vec<u8>, hint: Option<&str>) -> Result<DecodedAudio, LoadError> {
        let byte_len = bytes.len();
        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

        let mut probe_hint = Hint::new();
        if let Some(ext) = hint {
            probe_hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &probe_hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| LoadError::UnsupportedFormat(e.to_string()))?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| LoadError::UnsupportedFormat("No audio track found".to_string()))?;

        let track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
        let mut channel_count = track.codec_params.channels.map(|c| c.count()).unwrap_or(0);

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| LoadError::UnsupportedFormat(e.to_string()))?;

        let mut interleaved: Vec<f32> = Vec::new();
        let mut sample_buf: Option<SampleBuffer<f32>> = None;
        let mut buf_frames = 0usize;
        let mut skipped_packets = 0usize;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => {
                    log::warn!("decode: Error reading packet: {}", e);
                    break;
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(e)) => {
                    log::warn!("decode: Skipping corrupt packet: {}", e);
                    skipped_packets += 1;
                    continue;
                }
                Err(e) => return Err(LoadError::Decode(e.to_string())),
            };

            let spec = *decoded.spec();
            channel_count = spec.channels.count();
            sample_rate = spec.rate;

            // Reallocate when a packet is larger than anything seen so far
            if sample_buf.is_none() || decoded.capacity() > buf_frames {
                buf_frames = decoded.capacity();
                sample_buf = Some(SampleBuffer::new(buf_frames as u64, spec));
            }

            if let Some(ref mut buf) = sample_buf {
                buf.copy_interleaved_ref(decoded);
                interleaved.extend_from_slice(buf.samples());
            }
        }

        if channel_count == 0 || interleaved.is_empty() {
            return Err(LoadError::Decode(format!(
                "no decodable audio in {} bytes ({} corrupt packets)",
                byte_len, skipped_packets
            )));
        }

        let frames = interleaved.len() / channel_count;
        let mut channels: Vec<Vec<f32>> = (0..channel_count)
            .map(|_| Vec::with_capacity(frames))
            .collect();
        for frame in interleaved.chunks_exact(channel_count) {
            for (channel, sample) in channels.iter_mut().zip(frame) {
                channel.push(*sample);
            }
        }

        log::debug!(
            "decode: {} channel(s), {} frames at {} Hz",
            channel_count,
            frames,
            sample_rate
        );

        Ok(DecodedAudio {
            channels,
            sample_rate,
        })
    }
}
