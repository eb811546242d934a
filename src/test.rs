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

use midly::num::{u15, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};

use crate::catalog::SoundId;
use crate::config::{self, ConverterConfig};
use crate::convert::{self, ConvertError};
use crate::encoder;
use crate::midi;
use crate::output;
use crate::render::{self, DirectorySource, RenderWarning};
use crate::testutil::{sine, write_wav};

fn midi_event(delta: u32, key: u8, on: bool) -> TrackEvent<'static> {
    let message = if on {
        MidiMessage::NoteOn {
            key: u7::new(key),
            vel: u7::new(100),
        }
    } else {
        MidiMessage::NoteOff {
            key: u7::new(key),
            vel: u7::new(0),
        }
    };
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Midi {
            channel: u4::new(0),
            message,
        },
    }
}

fn end_of_track() -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    }
}

/// A4 for one second, then C4 for half a second, at the default 120 BPM.
fn two_note_song() -> Vec<u8> {
    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(480)),
    ));
    smf.tracks = vec![vec![
        midi_event(0, 69, true),
        midi_event(960, 69, false),
        midi_event(0, 60, true),
        midi_event(480, 60, false),
        end_of_track(),
    ]];
    let mut buf = Vec::new();
    smf.write(&mut buf).unwrap();
    buf
}

#[test]
fn converts_a_midi_file_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let midi_path = dir.path().join("two notes.mid");
    fs::write(&midi_path, two_note_song()).unwrap();

    // A missing config is created with the default palette and two layers.
    let config_path = dir.path().join("config.json");
    let settings = config::load_or_create(&config_path)
        .unwrap()
        .resolve()
        .unwrap();
    assert!(config_path.exists());
    assert_eq!(settings.max_layers(), 2);

    let events = midi::read_smf(&midi_path).unwrap();
    let conversion = convert::convert(&events, &settings).unwrap();

    // A4 gets the primary sound plus the closest fitting countdown; C4 is too
    // short for anything but the primary.
    assert_eq!(conversion.notes.len(), 2);
    assert_eq!(conversion.song.sounds, "010");
    assert_eq!(conversion.song.volumes, "010");
    assert_eq!(
        conversion.events.iter().map(|e| e.tick).collect::<Vec<_>>(),
        vec![0, 0, 20]
    );
    assert!(conversion.diagnostics.is_empty());

    let decoded = encoder::decode(&conversion.song).unwrap();
    assert_eq!(decoded.len(), conversion.events.len());
    for (decoded, event) in decoded.iter().zip(&conversion.events) {
        assert_eq!(decoded.tick, event.tick);
        assert_eq!(decoded.sound, event.sound);
        assert_eq!(decoded.key_index, event.key_index);
        assert_eq!(decoded.volume_index, event.volume_index);
    }
    assert!((decoded[0].pitch_hz() - 440.0).abs() < 1e-9);

    let words = encoder::unpack(&conversion.packed()).unwrap();
    assert_eq!(words.len(), 3);
    assert_eq!(words[2].delay, 20);
    assert_eq!(words[1].sound_index, 1);

    let files = output::write_all(
        &dir.path().join("results"),
        &output::base_name(&midi_path),
        &conversion,
    )
    .unwrap();
    assert_eq!(files.dir, dir.path().join("results").join("two notes"));
    assert_eq!(fs::read_to_string(&files.sounds).unwrap(), "010");
    assert_eq!(
        fs::read_to_string(&files.mapping_report).unwrap(),
        "{\n    \"harp_pling\": 2,\n    \"game_start_countdown_01\": 1\n}"
    );
    assert_eq!(
        fs::read_to_string(&files.sounds_used).unwrap(),
        "[\n    \"game_start_countdown_01\",\n    \"harp_pling\"\n]"
    );
}

#[test]
fn renders_a_preview_from_a_sound_folder() {
    let dir = tempfile::tempdir().unwrap();
    let sounds = dir.path().join("sounds");
    fs::create_dir(&sounds).unwrap();
    write_wav(
        sounds.join(SoundId::HarpPling.file_name()),
        vec![sine(260.79, 44100, 4410)],
        44100,
    )
    .unwrap();
    // Stereo at a different rate, to exercise folding and transcoding.
    write_wav(
        sounds.join(SoundId::Countdown01.file_name()),
        vec![sine(329.75, 22050, 2205), sine(329.75, 22050, 2205)],
        22050,
    )
    .unwrap();

    let events = midi::parse_smf(&two_note_song()).unwrap();
    let settings = ConverterConfig::default().resolve().unwrap();
    let conversion = convert::convert(&events, &settings).unwrap();

    let preview = render::render(&conversion.events, &DirectorySource::new(&sounds)).unwrap();
    assert!(preview.warnings().is_empty());
    assert_eq!(preview.sample_rate(), render::SAMPLE_RATE);
    // The last event is at one second, followed by the tail.
    assert_eq!(preview.samples().len(), 4 * 44100);
    assert!(preview.peak() > 0.0);
    let max = preview
        .samples()
        .iter()
        .fold(0.0_f32, |max, s| max.max(s.abs()));
    assert!((max - 1.0).abs() < 1e-6);

    let files = output::OutputFiles::new(dir.path(), "two_notes");
    fs::create_dir_all(&files.dir).unwrap();
    let path = output::write_preview(&files, &preview).unwrap();
    assert!(path.ends_with("8_two_notes_preview.wav"));
    assert_eq!(hound::WavReader::open(&path).unwrap().len(), 4 * 44100);
}

#[test]
fn preview_skips_missing_sounds() {
    let dir = tempfile::tempdir().unwrap();
    write_wav(
        dir.path().join(SoundId::HarpPling.file_name()),
        vec![sine(260.79, 44100, 441)],
        44100,
    )
    .unwrap();

    let events = midi::parse_smf(&two_note_song()).unwrap();
    let settings = ConverterConfig::default().resolve().unwrap();
    let conversion = convert::convert(&events, &settings).unwrap();

    let preview = render::render(&conversion.events, &DirectorySource::new(dir.path())).unwrap();
    assert_eq!(preview.warnings().len(), 1);
    assert!(matches!(
        &preview.warnings()[0],
        RenderWarning::MissingWaveform {
            sound: SoundId::Countdown01,
            ..
        }
    ));

    let empty = tempfile::tempdir().unwrap();
    assert!(matches!(
        render::render(&conversion.events, &DirectorySource::new(empty.path())),
        Err(render::RenderError::NoWaveforms)
    ));
}

#[test]
fn unmatched_and_tiny_notes_produce_no_events() {
    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(480)),
    ));
    // A note that is never released and one that lasts a single tick.
    smf.tracks = vec![vec![
        midi_event(0, 64, true),
        midi_event(0, 67, true),
        midi_event(1, 67, false),
        end_of_track(),
    ]];
    let mut buf = Vec::new();
    smf.write(&mut buf).unwrap();

    let events = midi::parse_smf(&buf).unwrap();
    let extraction = midi::extract_notes(&events);
    assert!(extraction.notes.is_empty());
    assert_eq!(extraction.too_short, 1);

    let settings = ConverterConfig::default().resolve().unwrap();
    assert!(matches!(
        convert::convert(&events, &settings),
        Err(ConvertError::NoEvents { notes: 0, .. })
    ));
}
