//! Minimal WAV decoding.
//!
//! Supports RIFF/WAVE files with integer PCM (8/16/24/32-bit) or 32-bit
//! IEEE float samples, including `WAVE_FORMAT_EXTENSIBLE` headers. Samples
//! are normalised to `[-1.0, 1.0]` and de-interleaved per channel.

use std::path::{Path, PathBuf};

const FORMAT_PCM: u16 = 1;
const FORMAT_IEEE_FLOAT: u16 = 3;
const FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// Decoded audio, one sample vector per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioTrack {
    pub sample_rate: u32,
    pub channels: Vec<Vec<f32>>,
}

impl AudioTrack {
    /// Number of sample frames (samples per channel).
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }

    /// Decode a WAV file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WavError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| WavError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let track = Self::decode(&bytes)?;
        tracing::info!(
            path = %path.display(),
            sample_rate = track.sample_rate,
            channels = track.channels.len(),
            duration_secs = track.duration_secs(),
            "Decoded audio"
        );
        Ok(track)
    }

    /// Decode WAV bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, WavError> {
        if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
            return Err(WavError::NotWav);
        }

        let mut format: Option<Format> = None;
        let mut data: Option<&[u8]> = None;
        let mut pos = 12;

        while pos + 8 <= bytes.len() {
            let id = &bytes[pos..pos + 4];
            let size = read_u32(&bytes[pos + 4..pos + 8]) as usize;
            let body_start = pos + 8;
            let body_end = body_start.saturating_add(size).min(bytes.len());
            let body = &bytes[body_start..body_end];

            match id {
                b"fmt " => format = Some(Format::parse(body)?),
                b"data" => data = Some(body),
                _ => {}
            }

            // Chunks are word-aligned.
            pos = body_start.saturating_add(size).saturating_add(size & 1);
        }

        let format = format.ok_or(WavError::MissingChunk("fmt "))?;
        let data = data.ok_or(WavError::MissingChunk("data"))?;
        format.decode(data)
    }
}

/// Parsed `fmt ` chunk.
#[derive(Debug, Clone, Copy)]
struct Format {
    tag: u16,
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
}

impl Format {
    fn parse(body: &[u8]) -> Result<Self, WavError> {
        if body.len() < 16 {
            return Err(WavError::Malformed("fmt chunk shorter than 16 bytes"));
        }
        let mut tag = read_u16(&body[0..2]);
        if tag == FORMAT_EXTENSIBLE && body.len() >= 26 {
            // Sub-format GUID starts with the real format tag.
            tag = read_u16(&body[24..26]);
        }
        let format = Self {
            tag,
            channels: read_u16(&body[2..4]),
            sample_rate: read_u32(&body[4..8]),
            bits_per_sample: read_u16(&body[14..16]),
        };
        if format.channels == 0 || format.sample_rate == 0 {
            return Err(WavError::Malformed("zero channels or sample rate"));
        }
        Ok(format)
    }

    fn decode(&self, data: &[u8]) -> Result<AudioTrack, WavError> {
        let width = match (self.tag, self.bits_per_sample) {
            (FORMAT_PCM, 8 | 16 | 24 | 32) | (FORMAT_IEEE_FLOAT, 32) => {
                self.bits_per_sample as usize / 8
            }
            (tag, bits) => return Err(WavError::Unsupported { tag, bits }),
        };

        let channel_count = self.channels as usize;
        let frame_bytes = width * channel_count;
        let frames = data.len() / frame_bytes;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];

        for frame in data.chunks_exact(frame_bytes) {
            for (channel, sample) in channels.iter_mut().zip(frame.chunks_exact(width)) {
                channel.push(self.sample(sample));
            }
        }

        Ok(AudioTrack {
            sample_rate: self.sample_rate,
            channels,
        })
    }

    fn sample(&self, raw: &[u8]) -> f32 {
        match (self.tag, raw.len()) {
            (FORMAT_IEEE_FLOAT, _) => f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]),
            (_, 1) => (raw[0] as f32 - 128.0) / 128.0,
            (_, 2) => i16::from_le_bytes([raw[0], raw[1]]) as f32 / 32_768.0,
            (_, 3) => {
                let value = i32::from_le_bytes([0, raw[0], raw[1], raw[2]]) >> 8;
                value as f32 / 8_388_608.0
            }
            _ => i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as f32 / 2_147_483_648.0,
        }
    }
}

/// Encode a track as 16-bit PCM WAV bytes, for building fixtures.
#[cfg(any(test, feature = "test-util"))]
pub fn encode_pcm16(track: &AudioTrack) -> Vec<u8> {
    let channels = track.channels.len() as u16;
    let frames = track.len();
    let data_len = (frames * channels as usize * 2) as u32;
    let byte_rate = track.sample_rate * channels as u32 * 2;

    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&FORMAT_PCM.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&track.sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&(channels * 2).to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());

    for i in 0..frames {
        for channel in &track.channels {
            let v = (channel[i].clamp(-1.0, 1.0) * 32_767.0).round() as i16;
            out.extend_from_slice(&v.to_le_bytes());
        }
    }
    out
}

fn read_u16(b: &[u8]) -> u16 {
    u16::from_le_bytes([b[0], b[1]])
}

fn read_u32(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

/// Errors that can occur when decoding audio.
#[derive(Debug, thiserror::Error)]
pub enum WavError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Not a RIFF/WAVE file")]
    NotWav,

    #[error("WAV file has no '{0}' chunk")]
    MissingChunk(&'static str),

    #[error("Malformed WAV: {0}")]
    Malformed(&'static str),

    #[error("Unsupported WAV encoding (format tag {tag}, {bits} bits per sample)")]
    Unsupported { tag: u16, bits: u16 },
}
