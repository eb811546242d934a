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
//! The built-in sound catalog.
//!
//! Every sound the game can play is listed here with the pitch and natural
//! decay it was recorded at. The catalog index is what ends up in the encoded
//! sounds string, so the order is fixed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A sound the game can play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundId {
    HarpPling,
    #[serde(rename = "game_start_countdown_01")]
    Countdown01,
    #[serde(rename = "game_start_countdown_02")]
    Countdown02,
    #[serde(rename = "game_start_countdown_03")]
    Countdown03,
    #[serde(rename = "game_start_countdown_final")]
    CountdownFinal,
}

impl SoundId {
    /// All sounds in catalog order.
    pub const ALL: [SoundId; 5] = [
        SoundId::HarpPling,
        SoundId::Countdown01,
        SoundId::Countdown02,
        SoundId::Countdown03,
        SoundId::CountdownFinal,
    ];

    /// The anchor sound. It is eligible for every note regardless of duration.
    pub const PRIMARY: SoundId = SoundId::HarpPling;

    /// The position of this sound in the catalog.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Looks up a sound by catalog index.
    pub fn from_index(index: usize) -> Option<SoundId> {
        Self::ALL.get(index).copied()
    }

    /// The name the game uses for this sound.
    pub fn name(self) -> &'static str {
        match self {
            SoundId::HarpPling => "harp_pling",
            SoundId::Countdown01 => "game_start_countdown_01",
            SoundId::Countdown02 => "game_start_countdown_02",
            SoundId::Countdown03 => "game_start_countdown_03",
            SoundId::CountdownFinal => "game_start_countdown_final",
        }
    }

    /// The file name of the reference recording for this sound.
    pub fn file_name(self) -> String {
        format!("{}.wav", self.name())
    }

    pub fn is_primary(self) -> bool {
        self == Self::PRIMARY
    }

    /// Returns the catalog entry for this sound.
    pub fn sample(self) -> &'static SoundSample {
        &CATALOG[self.index()]
    }
}

impl fmt::Display for SoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SoundId {
    type Err = String;

    /// Parses a sound name. A trailing `.wav` is accepted and ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = strip_extension(s);
        Self::ALL
            .into_iter()
            .find(|id| id.name() == name)
            .ok_or_else(|| format!("unknown sound '{}'", s))
    }
}

/// Removes a trailing `.wav` (case-insensitive) from a sound name.
pub fn strip_extension(name: &str) -> &str {
    if name.len() >= 4 && name.is_char_boundary(name.len() - 4) {
        let (stem, extension) = name.split_at(name.len() - 4);
        if extension.eq_ignore_ascii_case(".wav") {
            return stem;
        }
    }
    name
}

/// A catalog entry: a recorded sound and its natural pitch and decay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SoundSample {
    pub id: SoundId,
    pub base_pitch_hz: f64,
    pub base_duration_sec: f64,
}

impl SoundSample {
    pub fn is_primary(&self) -> bool {
        self.id.is_primary()
    }

    /// The ratio the recording must be sped up by to sound at the given pitch.
    pub fn playback_rate(&self, pitch_hz: f64) -> f64 {
        pitch_hz / self.base_pitch_hz
    }

    /// How long the recording lasts when played back at the given pitch.
    pub fn pitched_duration(&self, pitch_hz: f64) -> f64 {
        self.base_duration_sec / self.playback_rate(pitch_hz)
    }
}

/// The sound catalog, indexed by [`SoundId::index`].
pub const CATALOG: [SoundSample; 5] = [
    SoundSample {
        id: SoundId::HarpPling,
        base_pitch_hz: 260.79,
        base_duration_sec: 0.84,
    },
    SoundSample {
        id: SoundId::Countdown01,
        base_pitch_hz: 329.75,
        base_duration_sec: 1.0,
    },
    SoundSample {
        id: SoundId::Countdown02,
        base_pitch_hz: 164.84,
        base_duration_sec: 0.99,
    },
    SoundSample {
        id: SoundId::Countdown03,
        base_pitch_hz: 164.87,
        base_duration_sec: 1.0,
    },
    SoundSample {
        id: SoundId::CountdownFinal,
        base_pitch_hz: 658.83,
        base_duration_sec: 1.58,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_indexed_by_sound_id() {
        for (index, sample) in CATALOG.iter().enumerate() {
            assert_eq!(sample.id.index(), index);
            assert_eq!(SoundId::from_index(index), Some(sample.id));
        }
        assert_eq!(SoundId::from_index(CATALOG.len()), None);
    }

    #[test]
    fn exactly_one_primary() {
        let primaries = CATALOG.iter().filter(|s| s.is_primary()).count();
        assert_eq!(primaries, 1);
        assert_eq!(SoundId::PRIMARY.index(), 0);
    }

    #[test]
    fn parse_names() {
        assert_eq!("harp_pling".parse::<SoundId>(), Ok(SoundId::HarpPling));
        assert_eq!(
            "game_start_countdown_final.wav".parse::<SoundId>(),
            Ok(SoundId::CountdownFinal)
        );
        assert_eq!(
            "game_start_countdown_02.WAV".parse::<SoundId>(),
            Ok(SoundId::Countdown02)
        );
        assert!("cowbell".parse::<SoundId>().is_err());
    }

    #[test]
    fn serde_names_match_game_names() {
        for id in SoundId::ALL {
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.name()));
        }
    }

    #[test]
    fn pitched_duration_scales_with_rate() {
        let sample = SoundId::Countdown02.sample();
        // An octave up halves the decay.
        let rate = sample.playback_rate(sample.base_pitch_hz * 2.0);
        assert!((rate - 2.0).abs() < 1e-12);
        let duration = sample.pitched_duration(sample.base_pitch_hz * 2.0);
        assert!((duration - 0.495).abs() < 1e-12);
    }
}
