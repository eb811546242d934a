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

//! Writes a converted song to its numbered output files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::convert::Conversion;
use crate::render::{Preview, RenderError};

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Unable to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unable to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// The files produced for one song.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputFiles {
    pub dir: PathBuf,
    pub sounds: PathBuf,
    pub delays: PathBuf,
    pub notes: PathBuf,
    pub volumes: PathBuf,
    pub note_log: PathBuf,
    pub sounds_used: PathBuf,
    pub mapping_report: PathBuf,
    pub packed: PathBuf,
}

impl OutputFiles {
    /// Lays out the file names under `<root>/<base_name>/`.
    pub fn new(root: &Path, base_name: &str) -> OutputFiles {
        let dir = root.join(base_name);
        let file = |index: u8, suffix: &str| dir.join(format!("{index}_{base_name}_{suffix}"));
        OutputFiles {
            sounds: file(1, "sounds.txt"),
            delays: file(2, "delays.txt"),
            notes: file(3, "notes.txt"),
            volumes: file(4, "volumes.txt"),
            note_log: file(5, "note_log.txt"),
            sounds_used: file(6, "sounds_used.json"),
            mapping_report: file(7, "mapping_report.json"),
            packed: file(9, "packed.txt"),
            dir,
        }
    }

    /// Where the rendered preview goes.
    pub fn preview(&self) -> PathBuf {
        let base_name = self
            .dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.dir.join(format!("8_{base_name}_preview.wav"))
    }
}

/// The song name used for output files: the input file name without its
/// extension.
pub fn base_name(input: &Path) -> String {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "song".to_string())
}

/// Writes the four data strings, the note log, both reports and the packed
/// encoding.
pub fn write_all(
    root: &Path,
    base_name: &str,
    conversion: &Conversion,
) -> Result<OutputFiles, OutputError> {
    let files = OutputFiles::new(root, base_name);
    fs::create_dir_all(&files.dir).map_err(|source| OutputError::Write {
        path: files.dir.clone(),
        source,
    })?;

    let song = &conversion.song;
    write_file(&files.sounds, &song.sounds)?;
    write_file(&files.delays, &song.delays)?;
    write_file(&files.notes, &song.notes)?;
    write_file(&files.volumes, &song.volumes)?;
    write_file(&files.note_log, &conversion.report.note_log())?;
    write_file(&files.sounds_used, &conversion.report.sounds_used_json()?)?;
    write_file(&files.mapping_report, &conversion.report.usage_json()?)?;
    write_file(&files.packed, &conversion.packed())?;

    info!(
        dir = ?files.dir,
        events = conversion.events.len(),
        "Song data written"
    );
    Ok(files)
}

/// Writes the preview WAV next to the other files.
pub fn write_preview(files: &OutputFiles, preview: &Preview) -> Result<PathBuf, OutputError> {
    let path = files.preview();
    preview.write_wav(&path)?;
    Ok(path)
}

fn write_file(path: &Path, contents: &str) -> Result<(), OutputError> {
    fs::write(path, contents).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::config::Settings;
    use crate::midi::Note;

    #[test]
    fn lays_out_numbered_files() {
        let files = OutputFiles::new(Path::new("results"), "song");
        assert_eq!(files.dir, Path::new("results/song"));
        assert_eq!(files.sounds, Path::new("results/song/1_song_sounds.txt"));
        assert_eq!(
            files.mapping_report,
            Path::new("results/song/7_song_mapping_report.json")
        );
        assert_eq!(files.preview(), Path::new("results/song/8_song_preview.wav"));
        assert_eq!(files.packed, Path::new("results/song/9_song_packed.txt"));
    }

    #[test]
    fn base_name_strips_extension() {
        assert_eq!(base_name(Path::new("midi/My Song.mid")), "My Song");
        assert_eq!(base_name(Path::new("tune")), "tune");
    }

    #[test]
    fn writes_song_files() {
        let notes = vec![
            Note {
                start_time_sec: 0.0,
                pitch_hz: 440.0,
                duration_sec: 0.5,
                velocity: 100,
            },
            Note {
                start_time_sec: 0.25,
                pitch_hz: 261.63,
                duration_sec: 0.5,
                velocity: 100,
            },
        ];
        let conversion = crate::convert::convert_notes(notes, &Settings::default()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let files = write_all(dir.path(), "song", &conversion).unwrap();

        assert_eq!(fs::read_to_string(&files.sounds).unwrap(), "00");
        assert_eq!(fs::read_to_string(&files.volumes).unwrap(), "00");
        assert_eq!(fs::read_to_string(&files.delays).unwrap(), conversion.song.delays);
        assert_eq!(fs::read_to_string(&files.notes).unwrap(), conversion.song.notes);
        assert_eq!(
            fs::read_to_string(&files.sounds_used).unwrap(),
            "[\n    \"harp_pling\"\n]"
        );
        assert_eq!(
            fs::read_to_string(&files.mapping_report).unwrap(),
            "{\n    \"harp_pling\": 2\n}"
        );
        assert!(fs::read_to_string(&files.note_log)
            .unwrap()
            .starts_with("Tick: 0000 (0.00s)\n"));
        assert_eq!(fs::read_to_string(&files.packed).unwrap(), conversion.packed());
    }
}
