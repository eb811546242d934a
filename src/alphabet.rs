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
//! Fixed symbol tables shared with the in-game player.
//!
//! The alphabet is indexed by two unrelated quantities: the nearest piano key
//! of a note and the tick delay before an event. Both use the same table, and
//! its exact code points are part of the wire format read by the game script.

/// Number of keys on a standard piano.
pub const PIANO_KEYS: usize = 88;

/// Number of symbols in [`ALPHABET`].
pub const ALPHABET_SIZE: usize = 100;

/// The largest value a single alphabet symbol can carry.
pub const MAX_SYMBOL_VALUE: usize = ALPHABET_SIZE - 1;

/// Key index of A4 (440 Hz) in [`PIANO_HZ`].
pub const A4_KEY_INDEX: usize = 48;

/// The symbol table. Several entries are invisible (zero-width and variation
/// selector code points), so always go through [`symbol`] and [`index_of`].
pub const ALPHABET: [char; ALPHABET_SIZE] = [
    '\u{2070}', '\u{00B9}', '\u{00B2}', '\u{00B3}', '\u{2074}', '\u{2075}', '\u{2076}', '\u{2077}',
    '\u{2078}', '\u{2079}', '\u{1D43}', '\u{1D47}', '\u{1D9C}', '\u{1D48}', '\u{1D49}', '\u{1DA0}',
    '\u{1D4D}', '\u{02B0}', '\u{2071}', '\u{02B2}', '\u{1D4F}', '\u{02E1}', '\u{1D50}', '\u{1DB0}',
    '\u{207F}', '\u{1D52}', '\u{1D56}', '\u{02B3}', '\u{02E2}', '\u{1D57}', '\u{1D58}', '\u{1D5B}',
    '\u{02B7}', '\u{02E3}', '\u{02B8}', '\u{1DBB}', '\u{02B1}', '\u{02B4}', '\u{02B5}', '\u{02B6}',
    '\u{2080}', '\u{2081}', '\u{2082}', '\u{2083}', '\u{2084}', '\u{2085}', '\u{2086}', '\u{2087}',
    '\u{2088}', '\u{2089}', '\u{2090}', '\u{2091}', '\u{2092}', '\u{2093}', '\u{2094}', '\u{2095}',
    '\u{1D62}', '\u{2C7C}', '\u{1D63}', '\u{1D64}', '\u{1D65}', '\u{2096}', '\u{2097}', '\u{2098}',
    '\u{2099}', '\u{209A}', '\u{209B}', '\u{209C}', '\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}',
    '\u{2061}', '\u{2062}', '\u{2063}', '\u{2064}', '\u{2067}', '\u{2069}', '\u{2068}', '\u{206A}',
    '\u{206B}', '\u{206C}', '\u{206D}', '\u{206E}', '\u{206F}', '\u{FEFF}', '\u{FE00}', '\u{FE01}',
    '\u{FE02}', '\u{FE03}', '\u{FE04}', '\u{FE05}', '\u{FE06}', '\u{FE07}', '\u{FE08}', '\u{FE09}',
    '\u{FE0A}', '\u{FE0B}', '\u{FE0C}', '\u{FE0D}',
];

/// Piano key frequencies from A0 to C8, rounded to two decimals.
pub const PIANO_HZ: [f64; PIANO_KEYS] = [
    27.50, 29.14, 30.87, 32.70, 34.65, 36.71, 38.89, 41.20,
    43.65, 46.25, 49.00, 51.91, 55.00, 58.27, 61.74, 65.41,
    69.30, 73.42, 77.78, 82.41, 87.31, 92.50, 98.00, 103.83,
    110.00, 116.54, 123.47, 130.81, 138.59, 146.83, 155.56, 164.81,
    174.61, 185.00, 196.00, 207.65, 220.00, 233.08, 246.94, 261.63,
    277.18, 293.66, 311.13, 329.63, 349.23, 369.99, 392.00, 415.30,
    440.00, 466.16, 493.88, 523.25, 554.37, 587.33, 622.25, 659.26,
    698.46, 739.99, 783.99, 830.61, 880.00, 932.33, 987.77, 1046.50,
    1108.73, 1174.66, 1244.51, 1318.51, 1396.91, 1479.98, 1567.98, 1661.22,
    1760.00, 1864.66, 1975.53, 2093.00, 2217.46, 2349.32, 2489.02, 2637.02,
    2793.83, 2959.96, 3135.96, 3322.44, 3520.00, 3729.31, 3951.07, 4186.01,
];

/// Returns the symbol for the given value, or None if it is out of range.
pub fn symbol(value: usize) -> Option<char> {
    ALPHABET.get(value).copied()
}

/// Returns the value encoded by the given symbol.
pub fn index_of(symbol: char) -> Option<usize> {
    ALPHABET.iter().position(|&c| c == symbol)
}

/// Returns the index of the piano key closest to the given frequency. Ties go
/// to the lower key.
pub fn nearest_piano_key(hz: f64) -> usize {
    let mut closest = 0;
    let mut min_diff = f64::INFINITY;
    for (index, key_hz) in PIANO_HZ.iter().enumerate() {
        let diff = (key_hz - hz).abs();
        if diff < min_diff {
            min_diff = diff;
            closest = index;
        }
    }
    closest
}

/// The frequency the game script plays for a key index. This is the exact
/// equal-tempered pitch, not the rounded value in [`PIANO_HZ`].
pub fn key_hz(key_index: usize) -> f64 {
    440.0 * 2f64.powf((key_index as f64 - A4_KEY_INDEX as f64) / 12.0)
}
