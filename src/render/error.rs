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
use std::path::PathBuf;

use crate::catalog::SoundId;

/// Errors raised while rendering a preview.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Waveform file {path} could not be read: {source}")]
    Waveform {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("Waveform for {0} is not available")]
    MissingWaveform(SoundId),

    #[error("Waveform for {0} is empty")]
    EmptyWaveform(SoundId),

    #[error("No events to render")]
    NoEvents,

    #[error("No waveforms could be loaded, cannot render a preview")]
    NoWaveforms,

    #[error("WAV error: {0}")]
    WavError(#[from] hound::Error),
}
