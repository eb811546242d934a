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
use std::fs;
use std::path::Path;

use midly::{Format, MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use tracing::{debug, info};

use super::error::MidiError;
use super::{MidiEvent, NoteMessage};

/// Tempo assumed until the first tempo event: 120 BPM.
const DEFAULT_MICROS_PER_BEAT: u32 = 500_000;

/// Converts file ticks into seconds.
#[derive(Clone, Copy, Debug)]
enum Clock {
    /// Ticks are fractions of a beat; the tempo map sets the beat length.
    Metrical { ticks_per_beat: f64 },
    /// Ticks are fixed SMPTE subdivisions of a second.
    Timecode { seconds_per_tick: f64 },
}

impl Clock {
    fn from_timing(timing: Timing) -> Result<Clock, MidiError> {
        match timing {
            Timing::Metrical(ticks_per_beat) => {
                let ticks_per_beat = ticks_per_beat.as_int();
                if ticks_per_beat == 0 {
                    return Err(MidiError::UnsupportedTiming(
                        "zero ticks per beat".to_string(),
                    ));
                }
                Ok(Clock::Metrical {
                    ticks_per_beat: f64::from(ticks_per_beat),
                })
            }
            Timing::Timecode(fps, subframes) => {
                if subframes == 0 {
                    return Err(MidiError::UnsupportedTiming(
                        "zero subframes per frame".to_string(),
                    ));
                }
                Ok(Clock::Timecode {
                    seconds_per_tick: 1.0 / (f64::from(fps.as_f32()) * f64::from(subframes)),
                })
            }
        }
    }

    fn seconds(&self, ticks: u64, micros_per_beat: u32) -> f64 {
        match self {
            Clock::Metrical { ticks_per_beat } => {
                ticks as f64 / ticks_per_beat * f64::from(micros_per_beat) / 1_000_000.0
            }
            Clock::Timecode { seconds_per_tick } => ticks as f64 * seconds_per_tick,
        }
    }
}

/// Reads a Standard MIDI File from disk. See [`parse_smf`].
pub fn read_smf(path: &Path) -> Result<Vec<MidiEvent>, MidiError> {
    let buf = fs::read(path)?;
    info!(path = ?path, bytes = buf.len(), "Reading MIDI file");
    parse_smf(&buf)
}

/// Parses a Standard MIDI File into a single stream of note events.
///
/// Tracks of format 0 and 1 files are merged by absolute tick, earlier tracks
/// first when events coincide. Format 2 tracks play one after another. Tempo
/// events apply to everything after them in the merged stream.
pub fn parse_smf(bytes: &[u8]) -> Result<Vec<MidiEvent>, MidiError> {
    let smf = Smf::parse(bytes)?;
    let clock = Clock::from_timing(smf.header.timing)?;
    let sequential = smf.header.format == Format::Sequential;

    let mut timeline: Vec<(u64, TrackEventKind)> = Vec::new();
    let mut track_offset = 0;
    for track in smf.tracks.iter() {
        let mut tick = if sequential { track_offset } else { 0 };
        for event in track.iter() {
            tick += u64::from(event.delta.as_int());
            timeline.push((tick, event.kind));
        }
        if sequential {
            track_offset = tick;
        }
    }
    timeline.sort_by_key(|(tick, _)| *tick);

    let mut events = Vec::new();
    let mut micros_per_beat = DEFAULT_MICROS_PER_BEAT;
    let mut last_tick = 0;
    let mut pending_sec = 0.0;
    for (tick, kind) in timeline {
        pending_sec += clock.seconds(tick - last_tick, micros_per_beat);
        last_tick = tick;

        match kind {
            TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => micros_per_beat = tempo.as_int(),
            TrackEventKind::Midi { channel, message } => {
                let message = match message {
                    MidiMessage::NoteOn { key, vel } => NoteMessage::On {
                        key: key.as_int(),
                        velocity: vel.as_int(),
                    },
                    MidiMessage::NoteOff { key, .. } => NoteMessage::Off { key: key.as_int() },
                    _ => continue,
                };
                events.push(MidiEvent {
                    delta_sec: pending_sec,
                    channel: channel.as_int(),
                    message,
                });
                pending_sec = 0.0;
            }
            _ => {}
        }
    }

    debug!(
        tracks = smf.tracks.len(),
        events = events.len(),
        "Parsed MIDI file"
    );

    Ok(events)
}
