// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Waveform loading and caching for preview rendering.
//!
//! Each referenced sound is loaded once per render, folded to mono and brought
//! to the render sample rate.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use hound::WavReader;
use tracing::{debug, info};

use super::error::RenderError;
use crate::catalog::SoundId;

/// A mono waveform with samples in [-1.0, 1.0].
#[derive(Clone, Debug, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    /// Creates a waveform from mono samples.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Waveform {
        Waveform {
            samples,
            sample_rate,
        }
    }

    /// Creates a waveform from interleaved samples, averaging the channels.
    pub fn from_interleaved(interleaved: &[f32], channel_count: u16, sample_rate: u32) -> Waveform {
        let channels = usize::from(channel_count.max(1));
        let samples = interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();
        Waveform {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Brings the waveform to another sample rate using linear interpolation.
    /// Good enough for short one-shot sounds.
    pub fn transcode(self, target_rate: u32) -> Waveform {
        if self.sample_rate == target_rate || self.sample_rate == 0 {
            return self;
        }

        let ratio = f64::from(target_rate) / f64::from(self.sample_rate);
        let target_len = (self.samples.len() as f64 * ratio).ceil() as usize;
        let samples = (0..target_len)
            .map(|target_index| {
                let source_pos = target_index as f64 / ratio;
                let source_index = source_pos.floor() as usize;
                let frac = source_pos.fract() as f32;

                let s0 = self.samples.get(source_index).copied().unwrap_or(0.0);
                let s1 = self.samples.get(source_index + 1).copied().unwrap_or(s0);
                s0 + (s1 - s0) * frac
            })
            .collect();

        Waveform {
            samples,
            sample_rate: target_rate,
        }
    }
}

/// Supplies the reference recording for a sound.
pub trait WaveformSource {
    fn load(&self, sound: SoundId) -> Result<Waveform, RenderError>;
}

/// Reads `<folder>/<sound name>.wav` files.
#[derive(Clone, Debug)]
pub struct DirectorySource {
    folder: PathBuf,
}

impl DirectorySource {
    pub fn new(folder: &Path) -> DirectorySource {
        DirectorySource {
            folder: folder.to_path_buf(),
        }
    }

    /// The path a sound is read from.
    pub fn path_for(&self, sound: SoundId) -> PathBuf {
        self.folder.join(sound.file_name())
    }
}

impl WaveformSource for DirectorySource {
    fn load(&self, sound: SoundId) -> Result<Waveform, RenderError> {
        let path = self.path_for(sound);
        let wav_error = |source: hound::Error| RenderError::Waveform {
            path: path.clone(),
            source,
        };

        let mut reader = WavReader::open(&path).map_err(wav_error)?;
        let spec = reader.spec();
        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<Vec<f32>, hound::Error>>()
                .map_err(wav_error)?,
            hound::SampleFormat::Int => {
                // Use i64 to avoid overflow for 32-bit samples.
                let scale = 1.0 / (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|sample| sample.map(|s| s as f32 * scale))
                    .collect::<Result<Vec<f32>, hound::Error>>()
                    .map_err(wav_error)?
            }
        };

        Ok(Waveform::from_interleaved(
            &interleaved,
            spec.channels,
            spec.sample_rate,
        ))
    }
}

/// Waveforms held in memory, for embedding or testing.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    waveforms: HashMap<SoundId, Waveform>,
}

impl MemorySource {
    pub fn new() -> MemorySource {
        MemorySource::default()
    }

    pub fn insert(&mut self, sound: SoundId, waveform: Waveform) {
        self.waveforms.insert(sound, waveform);
    }
}

impl WaveformSource for MemorySource {
    fn load(&self, sound: SoundId) -> Result<Waveform, RenderError> {
        self.waveforms
            .get(&sound)
            .cloned()
            .ok_or(RenderError::MissingWaveform(sound))
    }
}

/// Waveforms loaded for one render, at the render sample rate.
pub struct WaveformCache {
    cache: HashMap<SoundId, Waveform>,
    target_sample_rate: u32,
}

impl WaveformCache {
    pub fn new(target_sample_rate: u32) -> WaveformCache {
        WaveformCache {
            cache: HashMap::new(),
            target_sample_rate,
        }
    }

    /// Loads a sound's waveform, or returns the cached copy.
    pub fn load<S: WaveformSource + ?Sized>(
        &mut self,
        source: &S,
        sound: SoundId,
    ) -> Result<&Waveform, RenderError> {
        if !self.cache.contains_key(&sound) {
            let waveform = source.load(sound)?;
            if waveform.is_empty() {
                return Err(RenderError::EmptyWaveform(sound));
            }
            if waveform.sample_rate() != self.target_sample_rate {
                debug!(
                    sound = %sound,
                    source_rate = waveform.sample_rate(),
                    target_rate = self.target_sample_rate,
                    "Transcoding waveform"
                );
            }
            let waveform = waveform.transcode(self.target_sample_rate);
            info!(
                sound = %sound,
                samples = waveform.len(),
                "Waveform loaded"
            );
            self.cache.insert(sound, waveform);
        }
        self.cache
            .get(&sound)
            .ok_or(RenderError::MissingWaveform(sound))
    }

    pub fn get(&self, sound: SoundId) -> Option<&Waveform> {
        self.cache.get(&sound)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl std::fmt::Debug for WaveformCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaveformCache")
            .field("cached_waveforms", &self.cache.len())
            .field("target_sample_rate", &self.target_sample_rate)
            .finish()
    }
}
