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
//! Tick quantization and the four-string song encoding.
//!
//! Every mapped layer becomes one event. Events are ordered by tick and each
//! carries the delay since the previous event, so the game script can replay
//! the song by walking the strings in lockstep.

use tracing::debug;

use crate::alphabet::{self, ALPHABET, MAX_SYMBOL_VALUE};
use crate::catalog::SoundId;
use crate::mapper::MappedLayer;
use crate::midi::Note;

mod decode;
mod packed;

pub use decode::{decode, DecodeError, DecodedEvent};
pub use packed::{pack, pack_word, unpack, PackedWord, PACKED_CHARSET, PACKED_MAX_DELAY};

/// Game ticks per second.
pub const TICK_RATE: f64 = 20.0;

/// Converts seconds to the nearest tick. Halfway values round to even.
pub fn to_tick(seconds: f64) -> u64 {
    (seconds * TICK_RATE).round_ties_even().max(0.0) as u64
}

/// Converts a tick back to seconds.
pub fn tick_to_seconds(tick: u64) -> f64 {
    tick as f64 / TICK_RATE
}

/// A note together with the layers chosen for it.
#[derive(Clone, Debug, PartialEq)]
pub struct MappedNote {
    /// Position of the note in the extracted note list.
    pub note_index: usize,
    pub note: Note,
    pub layers: Vec<MappedLayer>,
}

/// One sound played by the game at a given tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GameEvent {
    pub tick: u64,
    pub sound: SoundId,
    /// Nearest piano key of the source note.
    pub key_index: usize,
    /// Ticks since the previous event, clamped to one alphabet symbol.
    pub delay: usize,
    pub volume_index: u8,
    pub playback_rate: f64,
    pub volume: f32,
    pub note_index: usize,
}

impl GameEvent {
    pub fn seconds(&self) -> f64 {
        tick_to_seconds(self.tick)
    }

    /// The symbol the notes string carries for this event.
    pub fn note_symbol(&self) -> char {
        ALPHABET[self.key_index]
    }
}

/// A delay that did not fit in one symbol and was cut short.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DelayClamp {
    pub event_index: usize,
    pub tick: u64,
    pub raw_delay: u64,
    pub clamped: usize,
}

/// Expands mapped notes into events, orders them by tick and computes delays.
pub fn schedule(notes: &[MappedNote]) -> (Vec<GameEvent>, Vec<DelayClamp>) {
    let mut events: Vec<GameEvent> = notes
        .iter()
        .flat_map(|mapped| {
            let tick = to_tick(mapped.note.start_time_sec);
            let key_index = alphabet::nearest_piano_key(mapped.note.pitch_hz);
            mapped.layers.iter().map(move |layer| GameEvent {
                tick,
                sound: layer.sound,
                key_index,
                delay: 0,
                volume_index: layer.volume_index,
                playback_rate: layer.playback_rate,
                volume: layer.volume,
                note_index: mapped.note_index,
            })
        })
        .collect();

    // Stable, so layers of one note stay together and in mapping order.
    events.sort_by_key(|event| event.tick);

    let mut clamps = Vec::new();
    let mut last_tick = 0;
    for (event_index, event) in events.iter_mut().enumerate() {
        let raw_delay = event.tick.saturating_sub(last_tick);
        let clamped = raw_delay.min(MAX_SYMBOL_VALUE as u64) as usize;
        if raw_delay > clamped as u64 {
            clamps.push(DelayClamp {
                event_index,
                tick: event.tick,
                raw_delay,
                clamped,
            });
        }
        event.delay = clamped;
        last_tick = event.tick;
    }

    debug!(
        events = events.len(),
        clamped_delays = clamps.len(),
        "Scheduled events"
    );

    (events, clamps)
}

/// The four position-aligned strings read by the game script.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncodedSong {
    /// One catalog index digit per event.
    pub sounds: String,
    /// One alphabet symbol per event: ticks since the previous event.
    pub delays: String,
    /// One alphabet symbol per event: nearest piano key.
    pub notes: String,
    /// One volume index digit per event.
    pub volumes: String,
}

impl EncodedSong {
    /// The number of events encoded.
    pub fn len(&self) -> usize {
        self.sounds.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }
}

fn digit(value: usize) -> char {
    char::from_digit((value % 10) as u32, 10).unwrap_or('0')
}

/// Encodes scheduled events into the four song strings.
pub fn encode(events: &[GameEvent]) -> EncodedSong {
    let mut song = EncodedSong::default();
    for event in events {
        song.sounds.push(digit(event.sound.index()));
        song.delays.push(ALPHABET[event.delay.min(MAX_SYMBOL_VALUE)]);
        song.notes.push(event.note_symbol());
        song.volumes.push(digit(usize::from(event.volume_index)));
    }
    song
}
