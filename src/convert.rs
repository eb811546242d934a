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
//! The conversion pipeline: MIDI events in, song strings out.
//!
//! Conversion is a pure function of the events and settings. Everything the
//! pipeline silently drops or clamps is reported back as a [`Diagnostic`].

use tracing::{debug, info};

use crate::config::Settings;
use crate::encoder::{self, DelayClamp, EncodedSong, GameEvent, MappedNote};
use crate::mapper;
use crate::midi::{self, MidiEvent, Note};
use crate::report::Report;

/// Something the pipeline dropped or altered on the way.
#[derive(Clone, Debug, PartialEq)]
pub enum Diagnostic {
    /// No sound in the palette could represent the note.
    NoteDropped {
        note_index: usize,
        start_time_sec: f64,
        pitch_hz: f64,
        duration_sec: f64,
    },
    /// The gap before an event was too long for one delay symbol.
    DelayClamped(DelayClamp),
}

/// Errors raised by the conversion pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("No notes could be mapped to sounds ({notes} notes found)")]
    NoEvents {
        notes: usize,
        diagnostics: Vec<Diagnostic>,
    },
}

/// The result of a conversion.
#[derive(Clone, Debug)]
pub struct Conversion {
    /// The notes extracted from the MIDI events.
    pub notes: Vec<Note>,
    /// The scheduled events, ordered by tick.
    pub events: Vec<GameEvent>,
    /// The four song strings.
    pub song: EncodedSong,
    pub report: Report,
    pub diagnostics: Vec<Diagnostic>,
}

impl Conversion {
    /// The song as a single packed string.
    pub fn packed(&self) -> String {
        encoder::pack(&self.events)
    }

    /// The number of notes that could not be mapped.
    pub fn dropped_notes(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::NoteDropped { .. }))
            .count()
    }

    /// The number of delays that were clamped.
    pub fn clamped_delays(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::DelayClamped(_)))
            .count()
    }
}

/// Converts a MIDI event stream.
pub fn convert(events: &[MidiEvent], settings: &Settings) -> Result<Conversion, ConvertError> {
    let extraction = midi::extract_notes(events);
    info!(notes = extraction.notes.len(), "Found and sorted notes");
    convert_notes(extraction.notes, settings)
}

/// Converts notes that have already been extracted and sorted by start time.
pub fn convert_notes(notes: Vec<Note>, settings: &Settings) -> Result<Conversion, ConvertError> {
    let mut diagnostics = Vec::new();
    let mut mapped = Vec::with_capacity(notes.len());

    for (note_index, note) in notes.iter().enumerate() {
        let layers = mapper::map_note(note, settings.palette(), settings.max_layers());
        if layers.is_empty() {
            debug!(
                note_index,
                pitch_hz = note.pitch_hz,
                duration_sec = note.duration_sec,
                "No eligible sound for note"
            );
            diagnostics.push(Diagnostic::NoteDropped {
                note_index,
                start_time_sec: note.start_time_sec,
                pitch_hz: note.pitch_hz,
                duration_sec: note.duration_sec,
            });
            continue;
        }
        mapped.push(MappedNote {
            note_index,
            note: *note,
            layers,
        });
    }

    let (events, clamps) = encoder::schedule(&mapped);
    diagnostics.extend(clamps.into_iter().map(Diagnostic::DelayClamped));

    if events.is_empty() {
        return Err(ConvertError::NoEvents {
            notes: notes.len(),
            diagnostics,
        });
    }

    let song = encoder::encode(&events);
    let report = Report::from_events(&events);

    info!(
        notes = notes.len(),
        mapped = mapped.len(),
        events = events.len(),
        diagnostics = diagnostics.len(),
        "Mapped notes to game events"
    );

    Ok(Conversion {
        notes,
        events,
        song,
        report,
        diagnostics,
    })
}
