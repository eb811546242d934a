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

//! Offline preview rendering.
//!
//! Mixes the scheduled events into a single mono buffer so a song can be
//! auditioned without the game. Every event's waveform is sped up or slowed
//! down by its playback rate, scaled by its volume and added at its tick.

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::{info, warn};

use crate::catalog::SoundId;
use crate::encoder::{tick_to_seconds, GameEvent};

mod error;
mod loader;

pub use error::RenderError;
pub use loader::{DirectorySource, MemorySource, Waveform, WaveformCache, WaveformSource};

/// Output sample rate of the preview.
pub const SAMPLE_RATE: u32 = 44_100;

/// Silence kept after the last event so trailing sounds can ring out.
pub const TAIL_SECONDS: f64 = 3.0;

/// Non-fatal conditions met while rendering.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderWarning {
    /// A referenced sound could not be loaded; its events were skipped.
    MissingWaveform { sound: SoundId, reason: String },
    /// The mix contained no signal, so it was left unnormalized.
    Silent,
}

/// A rendered preview buffer, peak normalized.
#[derive(Clone, Debug)]
pub struct Preview {
    samples: Vec<f32>,
    sample_rate: u32,
    peak: f32,
    warnings: Vec<RenderWarning>,
}

impl Preview {
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// The peak absolute amplitude of the mix before normalization.
    pub fn peak(&self) -> f32 {
        self.peak
    }

    pub fn warnings(&self) -> &[RenderWarning] {
        &self.warnings
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }

    /// Writes the preview as a 16-bit mono WAV file.
    pub fn write_wav(&self, path: &Path) -> Result<(), RenderError> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec)?;
        for sample in &self.samples {
            writer.write_sample((sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16)?;
        }
        writer.finalize()?;

        info!(
            path = ?path,
            duration_secs = self.duration_secs(),
            "Preview written"
        );
        Ok(())
    }
}

/// Changes the speed of a waveform by the given playback rate using linear
/// interpolation. The result holds floor(len / rate) samples; a rate at or
/// below zero yields nothing.
pub fn resample(data: &[f32], playback_rate: f64) -> Vec<f32> {
    if data.is_empty() || playback_rate.is_nan() || playback_rate <= 0.0 {
        return Vec::new();
    }

    let target_len = (data.len() as f64 / playback_rate).floor() as usize;
    if target_len == 0 {
        return Vec::new();
    }

    let step = data.len() as f64 / target_len as f64;
    (0..target_len)
        .map(|i| {
            let pos = i as f64 * step;
            let index = pos.floor() as usize;
            let frac = (pos - index as f64) as f32;

            let s0 = data.get(index).copied().unwrap_or(0.0);
            let s1 = data.get(index + 1).copied().unwrap_or(s0);
            s0 + (s1 - s0) * frac
        })
        .collect()
}

/// Renders the events at the default sample rate.
pub fn render<S: WaveformSource + ?Sized>(
    events: &[GameEvent],
    source: &S,
) -> Result<Preview, RenderError> {
    render_at(events, source, SAMPLE_RATE)
}

/// Renders the events into a mono buffer at the given sample rate.
pub fn render_at<S: WaveformSource + ?Sized>(
    events: &[GameEvent],
    source: &S,
    sample_rate: u32,
) -> Result<Preview, RenderError> {
    let Some(last_tick) = events.iter().map(|event| event.tick).max() else {
        return Err(RenderError::NoEvents);
    };

    let mut warnings = Vec::new();
    let mut cache = WaveformCache::new(sample_rate);
    for event in events {
        let sound = event.sound;
        if cache.get(sound).is_some()
            || warnings.iter().any(
                |warning| matches!(warning, RenderWarning::MissingWaveform { sound: s, .. } if *s == sound),
            )
        {
            continue;
        }
        if let Err(e) = cache.load(source, sound) {
            warn!(sound = %sound, err = %e, "Unable to load waveform, skipping its events");
            warnings.push(RenderWarning::MissingWaveform {
                sound,
                reason: e.to_string(),
            });
        }
    }
    if cache.is_empty() {
        return Err(RenderError::NoWaveforms);
    }

    let total_len =
        ((tick_to_seconds(last_tick) + TAIL_SECONDS) * f64::from(sample_rate)).floor() as usize;
    let mut samples = vec![0.0_f32; total_len];

    for event in events {
        let Some(waveform) = cache.get(event.sound) else {
            continue;
        };
        if event.volume == 0.0 {
            continue;
        }
        let pitched = resample(waveform.samples(), event.playback_rate);
        if pitched.is_empty() {
            continue;
        }

        let start = (event.seconds() * f64::from(sample_rate)).floor() as usize;
        if start >= samples.len() {
            continue;
        }
        let end = (start + pitched.len()).min(samples.len());
        for (out, sample) in samples[start..end].iter_mut().zip(&pitched) {
            *out += sample * event.volume;
        }
    }

    let peak = samples.iter().fold(0.0_f32, |peak, s| peak.max(s.abs()));
    if peak > 0.0 {
        for sample in samples.iter_mut() {
            *sample /= peak;
        }
    } else {
        warn!("Rendered preview is silent");
        warnings.push(RenderWarning::Silent);
    }

    info!(
        events = events.len(),
        waveforms = cache.len(),
        peak,
        "Preview rendered"
    );

    Ok(Preview {
        samples,
        sample_rate,
        peak,
        warnings,
    })
}
