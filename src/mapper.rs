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
//! Chooses which catalog sounds represent a note.
//!
//! Each note gets between one and `max_layers` layers. The primary sound
//! anchors every note; other sounds are only used when their pitched decay
//! fits inside the note, and the closest fit wins.

use crate::catalog::{SoundId, SoundSample};
use crate::midi::Note;

/// The smallest allowed layering budget.
pub const MIN_LAYERS: usize = 1;

/// The largest allowed layering budget. The volume digit can only express
/// this many non-primary layers.
pub const MAX_LAYERS: usize = 5;

/// Volume of the primary layer.
pub const PRIMARY_VOLUME: f32 = 1.0;

/// Volume shared out between the non-primary layers of a note.
pub const LAYER_VOLUME_BUDGET: f32 = 0.8;

/// One sound chosen to play for a note.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MappedLayer {
    pub sound: SoundId,
    pub playback_rate: f64,
    pub volume: f32,
    /// 0 for the primary layer. For every other layer, the number of
    /// non-primary layers on the note.
    pub volume_index: u8,
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    sample: SoundSample,
    rate: f64,
    duration_diff: f64,
}

fn candidates(note: &Note, palette: &[SoundSample]) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = palette
        .iter()
        .filter_map(|sample| {
            let rate = sample.playback_rate(note.pitch_hz);
            let pitched_duration = sample.base_duration_sec / rate;
            is_eligible(note, sample).then(|| Candidate {
                sample: *sample,
                rate,
                duration_diff: (note.duration_sec - pitched_duration).abs(),
            })
        })
        .collect();

    // Stable, so equally good fits keep palette order.
    candidates.sort_by(|a, b| a.duration_diff.total_cmp(&b.duration_diff));
    candidates
}

/// Returns true if the sound may be layered onto the note.
pub fn is_eligible(note: &Note, sample: &SoundSample) -> bool {
    sample.is_primary() || sample.pitched_duration(note.pitch_hz) <= note.duration_sec
}

/// Picks the layers for a note. An empty result means no sound in the palette
/// can represent the note and it should be dropped.
pub fn map_note(note: &Note, palette: &[SoundSample], max_layers: usize) -> Vec<MappedLayer> {
    let ranked = candidates(note, palette);
    if ranked.is_empty() {
        return Vec::new();
    }

    let chosen: Vec<Candidate> = if max_layers <= 1 {
        vec![ranked[0]]
    } else {
        let primary = ranked.iter().find(|c| c.sample.is_primary()).copied();
        let slots = if primary.is_some() {
            max_layers - 1
        } else {
            max_layers
        };

        let mut layers: Vec<Candidate> = Vec::with_capacity(slots);
        for candidate in ranked.iter().filter(|c| !c.sample.is_primary()) {
            if layers.len() == slots {
                break;
            }
            if layers.iter().all(|l| l.sample.id != candidate.sample.id) {
                layers.push(*candidate);
            }
        }
        primary.into_iter().chain(layers).collect()
    };

    let layer_count = chosen.iter().filter(|c| !c.sample.is_primary()).count();
    chosen
        .into_iter()
        .map(|candidate| {
            let (volume, volume_index) = if candidate.sample.is_primary() {
                (PRIMARY_VOLUME, 0)
            } else {
                (
                    LAYER_VOLUME_BUDGET / layer_count as f32,
                    layer_count as u8,
                )
            };
            MappedLayer {
                sound: candidate.sample.id,
                playback_rate: candidate.rate,
                volume,
                volume_index,
            }
        })
        .collect()
}
