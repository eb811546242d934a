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
//! Single-string packed encoding.
//!
//! Each event becomes one four-symbol word in base 30. Delays are not clamped:
//! a gap that does not fit in one word is bridged with filler words.

use crate::alphabet::PIANO_KEYS;
use crate::mapper::MAX_LAYERS;

use super::decode::DecodeError;
use super::GameEvent;

/// The packed symbol set. Position is the digit value.
pub const PACKED_CHARSET: [char; 30] = [
    ' ', '!', '#', '$', '%', '&', '\'', '(', ')', '*', '+', ',', '-', '.', '/', ':', ';', '<',
    '=', '>', '?', '@', '[', ']', '^', '_', '{', '|', '}', '~',
];

const BASE: u32 = PACKED_CHARSET.len() as u32;

/// Symbols per packed word.
pub const WORD_LEN: usize = 4;

/// Delays must stay below this to fit in one word.
pub const PACKED_MAX_DELAY: u32 = 300;

const KEY_RANGE: u32 = PIANO_KEYS as u32;
const VOLUME_RANGE: u32 = MAX_LAYERS as u32 + 1;

/// The fields of one packed word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PackedWord {
    pub delay: u32,
    pub key_index: u32,
    pub volume_index: u32,
    pub sound_index: u32,
}

impl PackedWord {
    /// Bridges part of a long gap. The game plays it as a very quiet primary
    /// sound on the lowest key.
    pub const FILLER: PackedWord = PackedWord {
        delay: PACKED_MAX_DELAY - 1,
        key_index: 0,
        volume_index: VOLUME_RANGE - 1,
        sound_index: 0,
    };

    fn value(&self) -> u32 {
        self.delay
            + self.key_index * PACKED_MAX_DELAY
            + self.volume_index * PACKED_MAX_DELAY * KEY_RANGE
            + self.sound_index * PACKED_MAX_DELAY * KEY_RANGE * VOLUME_RANGE
    }

    fn from_value(mut value: u32) -> PackedWord {
        let delay = value % PACKED_MAX_DELAY;
        value /= PACKED_MAX_DELAY;
        let key_index = value % KEY_RANGE;
        value /= KEY_RANGE;
        let volume_index = value % VOLUME_RANGE;
        value /= VOLUME_RANGE;
        PackedWord {
            delay,
            key_index,
            volume_index,
            sound_index: value,
        }
    }
}

/// Packs one word, most significant symbol first.
pub fn pack_word(word: PackedWord) -> [char; WORD_LEN] {
    let mut value = word.value();
    let mut symbols = [PACKED_CHARSET[0]; WORD_LEN];
    for slot in symbols.iter_mut().rev() {
        *slot = PACKED_CHARSET[(value % BASE) as usize];
        value /= BASE;
    }
    symbols
}

/// Packs scheduled events into one string, using the raw tick gaps.
pub fn pack(events: &[GameEvent]) -> String {
    let mut packed = String::with_capacity(events.len() * WORD_LEN);
    let mut last_tick = 0;
    for event in events {
        let mut gap = event.tick.saturating_sub(last_tick);
        while gap >= u64::from(PACKED_MAX_DELAY) {
            packed.extend(pack_word(PackedWord::FILLER));
            gap -= u64::from(PackedWord::FILLER.delay);
        }
        packed.extend(pack_word(PackedWord {
            delay: gap as u32,
            key_index: event.key_index as u32,
            volume_index: u32::from(event.volume_index).min(VOLUME_RANGE - 1),
            sound_index: event.sound.index() as u32,
        }));
        last_tick = event.tick;
    }
    packed
}

/// Splits a packed string back into words.
pub fn unpack(packed: &str) -> Result<Vec<PackedWord>, DecodeError> {
    let symbols: Vec<char> = packed.chars().collect();
    if symbols.len() % WORD_LEN != 0 {
        return Err(DecodeError::TruncatedWord(symbols.len()));
    }

    symbols
        .chunks(WORD_LEN)
        .enumerate()
        .map(|(word_index, word)| -> Result<PackedWord, DecodeError> {
            let mut value = 0;
            for (offset, &symbol) in word.iter().enumerate() {
                let digit = PACKED_CHARSET
                    .iter()
                    .position(|&c| c == symbol)
                    .ok_or(DecodeError::UnknownSymbol {
                        field: "packed",
                        position: word_index * WORD_LEN + offset,
                        symbol,
                    })?;
                value = value * BASE + digit as u32;
            }
            Ok(PackedWord::from_value(value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SoundId;

    fn event(tick: u64, sound: SoundId, key_index: usize, volume_index: u8) -> GameEvent {
        GameEvent {
            tick,
            sound,
            key_index,
            delay: 0,
            volume_index,
            playback_rate: 1.0,
            volume: 1.0,
            note_index: 0,
        }
    }

    #[test]
    fn largest_word_fits_in_four_symbols() {
        let largest = PackedWord {
            delay: PACKED_MAX_DELAY - 1,
            key_index: KEY_RANGE - 1,
            volume_index: VOLUME_RANGE - 1,
            sound_index: SoundId::ALL.len() as u32 - 1,
        };
        assert!(largest.value() < BASE.pow(WORD_LEN as u32));
        let word = unpack(&pack_word(largest).iter().collect::<String>()).unwrap();
        assert_eq!(word, vec![largest]);
    }

    #[test]
    fn zero_word_is_spaces() {
        let word = PackedWord {
            delay: 0,
            key_index: 0,
            volume_index: 0,
            sound_index: 0,
        };
        assert_eq!(pack_word(word), [' '; WORD_LEN]);
        // Delay 1 only touches the last symbol.
        assert_eq!(
            pack_word(PackedWord { delay: 1, ..word }),
            [' ', ' ', ' ', '!']
        );
    }

    #[test]
    fn packs_events_with_gaps() {
        let events = [
            event(5, SoundId::HarpPling, 48, 0),
            event(5, SoundId::Countdown01, 48, 1),
            event(40, SoundId::CountdownFinal, 60, 2),
        ];
        let words = unpack(&pack(&events)).unwrap();
        assert_eq!(
            words,
            vec![
                PackedWord {
                    delay: 5,
                    key_index: 48,
                    volume_index: 0,
                    sound_index: 0
                },
                PackedWord {
                    delay: 0,
                    key_index: 48,
                    volume_index: 1,
                    sound_index: 1
                },
                PackedWord {
                    delay: 35,
                    key_index: 60,
                    volume_index: 2,
                    sound_index: 4
                },
            ]
        );
    }

    #[test]
    fn long_gaps_use_filler_words() {
        let events = [event(700, SoundId::HarpPling, 10, 0)];
        let words = unpack(&pack(&events)).unwrap();
        // 700 = 299 + 299 + 102
        assert_eq!(words.len(), 3);
        assert_eq!(words[0], PackedWord::FILLER);
        assert_eq!(words[1], PackedWord::FILLER);
        assert_eq!(words[2].delay, 102);
        let total: u32 = words.iter().map(|w| w.delay).sum();
        assert_eq!(total, 700);
    }

    #[test]
    fn volume_index_is_capped() {
        let events = [event(0, SoundId::Countdown02, 0, 9)];
        let words = unpack(&pack(&events)).unwrap();
        assert_eq!(words[0].volume_index, VOLUME_RANGE - 1);
    }

    #[test]
    fn unpack_errors() {
        assert_eq!(unpack("abc"), Err(DecodeError::TruncatedWord(3)));
        assert_eq!(
            unpack("   a"),
            Err(DecodeError::UnknownSymbol {
                field: "packed",
                position: 3,
                symbol: 'a',
            })
        );
    }
}
