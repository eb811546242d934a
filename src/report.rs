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
//! Human-readable and JSON summaries of a conversion.

use std::fmt::Write;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Serializer, Value};

use crate::catalog::SoundId;
use crate::encoder::GameEvent;

/// All events that fire on one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct TickEntry {
    pub tick: u64,
    pub events: Vec<GameEvent>,
}

impl TickEntry {
    pub fn seconds(&self) -> f64 {
        crate::encoder::tick_to_seconds(self.tick)
    }
}

/// Summaries produced alongside the song strings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Report {
    /// Distinct sounds used, sorted by name.
    pub sounds_used: Vec<SoundId>,
    /// Events per sound, most used first. Equal counts keep first-use order.
    pub usage: Vec<(SoundId, usize)>,
    /// Events grouped by tick, in tick order.
    pub ticks: Vec<TickEntry>,
}

impl Report {
    /// Builds a report from events that are already ordered by tick.
    pub fn from_events(events: &[GameEvent]) -> Report {
        let mut usage: Vec<(SoundId, usize)> = Vec::new();
        let mut ticks: Vec<TickEntry> = Vec::new();

        for event in events {
            match usage.iter_mut().find(|(sound, _)| *sound == event.sound) {
                Some((_, count)) => *count += 1,
                None => usage.push((event.sound, 1)),
            }

            match ticks.last_mut() {
                Some(entry) if entry.tick == event.tick => entry.events.push(*event),
                _ => ticks.push(TickEntry {
                    tick: event.tick,
                    events: vec![*event],
                }),
            }
        }

        let mut sounds_used: Vec<SoundId> = usage.iter().map(|(sound, _)| *sound).collect();
        sounds_used.sort_by_key(|sound| sound.name());
        usage.sort_by(|a, b| b.1.cmp(&a.1));

        Report {
            sounds_used,
            usage,
            ticks,
        }
    }

    /// The per-tick note log.
    pub fn note_log(&self) -> String {
        let mut log = String::new();
        for entry in &self.ticks {
            let _ = writeln!(log, "Tick: {:04} ({:.2}s)", entry.tick, entry.seconds());
            for event in &entry.events {
                let _ = writeln!(
                    log,
                    "    - Sound: {:<28} | Vol Idx: {} | Note Char: {} | (Sim Vol: {:.2}, Sim Rate: {:.2})",
                    event.sound.name(),
                    event.volume_index,
                    event.note_symbol(),
                    event.volume,
                    event.playback_rate,
                );
            }
        }
        log
    }

    /// The sorted list of sounds used, as JSON.
    pub fn sounds_used_json(&self) -> Result<String, serde_json::Error> {
        let names: Vec<&str> = self.sounds_used.iter().map(|sound| sound.name()).collect();
        to_json(&names)
    }

    /// The usage histogram, as a JSON object ordered by count.
    pub fn usage_json(&self) -> Result<String, serde_json::Error> {
        let mut map = Map::new();
        for (sound, count) in &self.usage {
            map.insert(sound.name().to_string(), Value::from(*count));
        }
        to_json(&map)
    }
}

/// Pretty prints with four-space indentation.
fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
