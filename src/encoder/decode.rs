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
use crate::alphabet::{self, PIANO_KEYS};
use crate::catalog::SoundId;
use crate::mapper::{LAYER_VOLUME_BUDGET, MAX_LAYERS, PRIMARY_VOLUME};

use super::EncodedSong;

/// Errors raised while reading encoded songs back.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Song strings differ in length: sounds={sounds} delays={delays} notes={notes} volumes={volumes}")]
    LengthMismatch {
        sounds: usize,
        delays: usize,
        notes: usize,
        volumes: usize,
    },

    #[error("Unknown {field} symbol {symbol:?} at position {position}")]
    UnknownSymbol {
        field: &'static str,
        position: usize,
        symbol: char,
    },

    #[error("Packed song length {0} is not a multiple of the word length")]
    TruncatedWord(usize),
}

/// An event read back from the song strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedEvent {
    /// Running sum of delays. Matches the original tick unless a delay was
    /// clamped earlier in the song.
    pub tick: u64,
    pub delay: usize,
    pub sound: SoundId,
    pub key_index: usize,
    pub volume_index: u8,
}

impl DecodedEvent {
    /// The pitch the game plays for this event.
    pub fn pitch_hz(&self) -> f64 {
        alphabet::key_hz(self.key_index)
    }

    /// The volume the game plays this event at.
    pub fn volume(&self) -> f32 {
        match self.volume_index {
            0 => PRIMARY_VOLUME,
            layers => LAYER_VOLUME_BUDGET / f32::from(layers),
        }
    }
}

fn unknown(field: &'static str, position: usize, symbol: char) -> DecodeError {
    DecodeError::UnknownSymbol {
        field,
        position,
        symbol,
    }
}

/// Decodes the four song strings into events.
pub fn decode(song: &EncodedSong) -> Result<Vec<DecodedEvent>, DecodeError> {
    let sounds: Vec<char> = song.sounds.chars().collect();
    let delays: Vec<char> = song.delays.chars().collect();
    let notes: Vec<char> = song.notes.chars().collect();
    let volumes: Vec<char> = song.volumes.chars().collect();

    if sounds.len() != delays.len()
        || sounds.len() != notes.len()
        || sounds.len() != volumes.len()
    {
        return Err(DecodeError::LengthMismatch {
            sounds: sounds.len(),
            delays: delays.len(),
            notes: notes.len(),
            volumes: volumes.len(),
        });
    }

    let mut tick = 0;
    let mut events = Vec::with_capacity(sounds.len());
    for position in 0..sounds.len() {
        let sound = sounds[position]
            .to_digit(10)
            .and_then(|index| SoundId::from_index(index as usize))
            .ok_or_else(|| unknown("sound", position, sounds[position]))?;
        let delay = alphabet::index_of(delays[position])
            .ok_or_else(|| unknown("delay", position, delays[position]))?;
        let key_index = alphabet::index_of(notes[position])
            .filter(|&key| key < PIANO_KEYS)
            .ok_or_else(|| unknown("note", position, notes[position]))?;
        let volume_index = volumes[position]
            .to_digit(10)
            .filter(|&volume| volume as usize <= MAX_LAYERS)
            .ok_or_else(|| unknown("volume", position, volumes[position]))?;

        tick += delay as u64;
        events.push(DecodedEvent {
            tick,
            delay,
            sound,
            key_index,
            volume_index: volume_index as u8,
        });
    }

    Ok(events)
}
