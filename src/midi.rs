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
//! Note extraction from MIDI event streams.

use std::collections::HashMap;

use tracing::debug;

mod error;
mod smf;

pub use error::MidiError;
pub use smf::{parse_smf, read_smf};

/// Notes this short or shorter are discarded.
pub const MIN_NOTE_DURATION_SEC: f64 = 0.01;

/// A note-on or note-off message, timed relative to the previous event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MidiEvent {
    /// Seconds since the previous event in the stream.
    pub delta_sec: f64,
    pub channel: u8,
    pub message: NoteMessage,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteMessage {
    On { key: u8, velocity: u8 },
    Off { key: u8 },
}

impl MidiEvent {
    pub fn note_on(delta_sec: f64, channel: u8, key: u8, velocity: u8) -> MidiEvent {
        MidiEvent {
            delta_sec,
            channel,
            message: NoteMessage::On { key, velocity },
        }
    }

    pub fn note_off(delta_sec: f64, channel: u8, key: u8) -> MidiEvent {
        MidiEvent {
            delta_sec,
            channel,
            message: NoteMessage::Off { key },
        }
    }
}

/// A discrete note. Immutable once extracted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Note {
    pub start_time_sec: f64,
    pub pitch_hz: f64,
    pub duration_sec: f64,
    pub velocity: u8,
}

/// The notes extracted from an event stream along with counts of what was
/// thrown away on the way.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Extraction {
    /// Notes sorted by start time. Notes starting together keep the order they
    /// were closed in.
    pub notes: Vec<Note>,
    /// Notes discarded for being too short.
    pub too_short: usize,
    /// Note-offs with no matching note-on.
    pub unmatched_offs: usize,
    /// Note-ons that replaced a still-open note on the same channel and key.
    pub restarted: usize,
}

/// Converts a MIDI key number into its equal-tempered frequency.
pub fn midi_to_hz(key: u8) -> f64 {
    440.0 * 2f64.powf((f64::from(key) - 69.0) / 12.0)
}

/// Pairs note-ons with note-offs on the same (channel, key) and emits notes.
///
/// A note-on with velocity zero closes a note. A second note-on for a key that
/// is already sounding restarts it: the earlier start is forgotten and the note
/// is emitted once, from the later start, when it closes.
pub fn extract_notes(events: &[MidiEvent]) -> Extraction {
    let mut active: HashMap<(u8, u8), (f64, u8)> = HashMap::new();
    let mut extraction = Extraction::default();
    let mut now = 0.0;

    for event in events {
        now += event.delta_sec;
        let (key, open) = match event.message {
            NoteMessage::On { key, velocity } if velocity > 0 => (key, Some(velocity)),
            NoteMessage::On { key, .. } | NoteMessage::Off { key } => (key, None),
        };

        match open {
            Some(velocity) => {
                if active.insert((event.channel, key), (now, velocity)).is_some() {
                    extraction.restarted += 1;
                }
            }
            None => match active.remove(&(event.channel, key)) {
                Some((start_time_sec, velocity)) => {
                    let duration_sec = now - start_time_sec;
                    if duration_sec > MIN_NOTE_DURATION_SEC {
                        extraction.notes.push(Note {
                            start_time_sec,
                            pitch_hz: midi_to_hz(key),
                            duration_sec,
                            velocity,
                        });
                    } else {
                        extraction.too_short += 1;
                    }
                }
                None => extraction.unmatched_offs += 1,
            },
        }
    }

    // Stable, so simultaneous notes stay in the order they closed.
    extraction
        .notes
        .sort_by(|a, b| a.start_time_sec.total_cmp(&b.start_time_sec));

    debug!(
        notes = extraction.notes.len(),
        too_short = extraction.too_short,
        unmatched_offs = extraction.unmatched_offs,
        restarted = extraction.restarted,
        still_open = active.len(),
        "Extracted notes"
    );

    extraction
}
