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
use std::error::Error;
use std::path::{Path, PathBuf};

use bloxtune::catalog::{SoundId, CATALOG};
use bloxtune::config::{self, ConverterConfig};
use bloxtune::convert::{self, ConvertError};
use bloxtune::render::{self, DirectorySource, RenderWarning};
use bloxtune::{midi, output};
use clap::{crate_version, Parser, Subcommand};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "Converts MIDI files into song strings for the game's music player."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Converts a MIDI file into song data.
    Convert {
        /// The MIDI file to convert.
        midi_file: PathBuf,
        /// The converter config. Created with defaults if it doesn't exist.
        #[arg(short, long, default_value = "config.json")]
        config: PathBuf,
        /// Renders an audio preview of the converted song.
        #[arg(short, long)]
        render_preview: bool,
        /// The folder holding the sound recordings used for the preview.
        #[arg(short, long, default_value = "sounds")]
        sound_folder: PathBuf,
        /// The directory results are written to, one subdirectory per song.
        #[arg(short, long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Lists the sounds the game can play.
    Catalog {},
    /// Writes a default converter config.
    InitConfig {
        /// Where to write the config. YAML is used for .yaml/.yml files.
        #[arg(default_value = "config.json")]
        path: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            midi_file,
            config,
            render_preview,
            sound_folder,
            output_dir,
        } => convert_song(
            &midi_file,
            &config,
            render_preview.then_some(sound_folder.as_path()),
            &output_dir,
        )?,
        Commands::Catalog {} => {
            println!("Sounds:");
            for sample in CATALOG.iter() {
                println!(
                    "- {} (index: {}, pitch: {:.2} Hz, duration: {:.2}s){}",
                    sample.id,
                    sample.id.index(),
                    sample.base_pitch_hz,
                    sample.base_duration_sec,
                    if sample.id == SoundId::PRIMARY {
                        " [primary]"
                    } else {
                        ""
                    }
                );
            }
        }
        Commands::InitConfig { path } => {
            config::save(&ConverterConfig::default(), &path)?;
            println!("Wrote default config to {}.", path.display());
        }
    }

    Ok(())
}

fn convert_song(
    midi_file: &Path,
    config_path: &Path,
    sound_folder: Option<&Path>,
    output_dir: &Path,
) -> Result<(), Box<dyn Error>> {
    let settings = config::load_or_create(config_path)?.resolve()?;
    println!(
        "Using a palette of {} sounds with up to {} layers per note.",
        settings.palette().len(),
        settings.max_layers()
    );

    let events = midi::read_smf(midi_file)?;
    let conversion = match convert::convert(&events, &settings) {
        Ok(conversion) => conversion,
        Err(ConvertError::NoEvents { notes, .. }) => {
            println!("No valid notes were mapped from {notes} notes. No output files generated.");
            return Ok(());
        }
    };

    if conversion.dropped_notes() > 0 {
        warn!(
            dropped = conversion.dropped_notes(),
            "Some notes had no eligible sound and were dropped"
        );
    }
    if conversion.clamped_delays() > 0 {
        warn!(
            clamped = conversion.clamped_delays(),
            "Some gaps were too long and were shortened"
        );
    }

    let files = output::write_all(output_dir, &output::base_name(midi_file), &conversion)?;
    println!("Wrote song data to {}:", files.dir.display());
    for path in [
        &files.sounds,
        &files.delays,
        &files.notes,
        &files.volumes,
        &files.note_log,
        &files.sounds_used,
        &files.mapping_report,
        &files.packed,
    ] {
        println!("- {}", path.display());
    }

    if let Some(sound_folder) = sound_folder {
        match render::render(&conversion.events, &DirectorySource::new(sound_folder)) {
            Ok(preview) => {
                for warning in preview.warnings() {
                    match warning {
                        RenderWarning::MissingWaveform { sound, reason } => {
                            println!("Could not load sound {sound}: {reason}")
                        }
                        RenderWarning::Silent => println!(
                            "The preview is silent. Check that the sound files were found."
                        ),
                    }
                }
                let path = output::write_preview(&files, &preview)?;
                println!("Rendered preview to {}.", path.display());
            }
            // The song data is already written, so a failed preview isn't fatal.
            Err(e) => error!(
                sound_folder = ?sound_folder,
                err = %e,
                "Unable to render preview"
            ),
        }
    }

    Ok(())
}
