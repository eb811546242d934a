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
use std::{any::TypeId, error::Error, fs::File, path::PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};

/// Writes a WAV file with one vector of samples per channel. Supports i16, i32
/// and f32 samples.
pub fn write_wav<S: hound::Sample + Copy + 'static>(
    path: PathBuf,
    samples: Vec<Vec<S>>,
    sample_rate: u32,
) -> Result<(), Box<dyn Error>> {
    let file = File::create(path)?;

    let (sample_format, bits_per_sample) = if TypeId::of::<S>() == TypeId::of::<f32>() {
        (SampleFormat::Float, 32)
    } else if TypeId::of::<S>() == TypeId::of::<i32>() {
        (SampleFormat::Int, 32)
    } else if TypeId::of::<S>() == TypeId::of::<i16>() {
        (SampleFormat::Int, 16)
    } else {
        return Err("Unsupported sample format".into());
    };

    let num_channels = samples.len();
    assert!(num_channels <= u16::MAX.into(), "Too many channels!");
    let frames = samples.iter().map(Vec::len).max().unwrap_or(0);
    let mut writer = WavWriter::new(
        file,
        WavSpec {
            channels: num_channels as u16,
            sample_rate,
            bits_per_sample,
            sample_format,
        },
    )?;

    for frame in 0..frames {
        for channel in &samples {
            let sample = channel.get(frame).copied();
            match sample {
                Some(sample) => writer.write_sample(sample)?,
                None => return Err("Channels must have the same length".into()),
            }
        }
    }
    writer.finalize()?;

    Ok(())
}

/// A sine tone at the given frequency.
pub fn sine(frequency: f32, sample_rate: u32, frames: usize) -> Vec<f32> {
    (0..frames)
        .map(|i| {
            (2.0 * std::f32::consts::PI * frequency * i as f32 / sample_rate as f32).sin() * 0.5
        })
        .collect()
}
