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
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::catalog::{SoundId, SoundSample, CATALOG};
use crate::mapper::{MAX_LAYERS, MIN_LAYERS};

/// Layering budget used when a config file has no layering section.
pub const DEFAULT_MAX_LAYERS: i64 = 1;

/// Layering budget written into freshly created config files.
pub const INITIAL_MAX_LAYERS: i64 = 2;

/// A JSON or YAML representation of the converter settings.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ConverterConfig {
    /// The sounds the converter may use, by name. A `.wav` suffix is allowed.
    #[serde(default = "default_palette")]
    palette: Vec<String>,

    /// How many sounds may play for a single note.
    #[serde(default)]
    layering: Layering,
}

fn default_palette() -> Vec<String> {
    SoundId::ALL.iter().map(|id| id.name().to_string()).collect()
}

impl Default for ConverterConfig {
    fn default() -> Self {
        ConverterConfig {
            palette: default_palette(),
            layering: Layering {
                max_layers: INITIAL_MAX_LAYERS,
            },
        }
    }
}

impl ConverterConfig {
    /// Creates a new converter configuration.
    pub fn new(palette: Vec<String>, max_layers: i64) -> ConverterConfig {
        ConverterConfig {
            palette,
            layering: Layering { max_layers },
        }
    }

    /// Gets the palette as written in the config.
    pub fn palette(&self) -> &[String] {
        &self.palette
    }

    /// Gets the layering configuration.
    pub fn layering(&self) -> &Layering {
        &self.layering
    }

    /// Validates the config and resolves the palette against the catalog.
    /// Unknown sound names and an empty palette are errors rather than being
    /// skipped.
    pub fn resolve(&self) -> Result<Settings, ConfigError> {
        let mut selected: HashSet<SoundId> = HashSet::new();
        for name in &self.palette {
            let id = name
                .parse::<SoundId>()
                .map_err(|_| ConfigError::UnknownSound(name.clone()))?;
            selected.insert(id);
        }

        // Catalog order, whatever order the config lists them in.
        let palette: Vec<SoundSample> = CATALOG
            .iter()
            .filter(|sample| selected.contains(&sample.id))
            .copied()
            .collect();

        Settings::new(palette, self.layering.max_layers)
    }
}

/// The layering section of the config.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Layering {
    /// Max sounds per note. 1 disables layering.
    #[serde(default = "default_max_layers")]
    max_layers: i64,
}

fn default_max_layers() -> i64 {
    DEFAULT_MAX_LAYERS
}

impl Default for Layering {
    fn default() -> Self {
        Layering {
            max_layers: DEFAULT_MAX_LAYERS,
        }
    }
}

impl Layering {
    pub fn max_layers(&self) -> i64 {
        self.max_layers
    }
}

/// Validated settings, ready for conversion.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    palette: Vec<SoundSample>,
    max_layers: usize,
}

impl Settings {
    /// Creates validated settings. The palette must not be empty and the
    /// layering budget must be within the range the volume digit can express.
    pub fn new(palette: Vec<SoundSample>, max_layers: i64) -> Result<Settings, ConfigError> {
        if palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        let valid = usize::try_from(max_layers)
            .ok()
            .filter(|layers| (MIN_LAYERS..=MAX_LAYERS).contains(layers));
        match valid {
            Some(max_layers) => Ok(Settings {
                palette,
                max_layers,
            }),
            None => Err(ConfigError::MaxLayers {
                value: max_layers,
                min: MIN_LAYERS,
                max: MAX_LAYERS,
            }),
        }
    }

    /// Gets the resolved palette, in catalog order.
    pub fn palette(&self) -> &[SoundSample] {
        &self.palette
    }

    /// Gets the layering budget.
    pub fn max_layers(&self) -> usize {
        self.max_layers
    }
}

impl Default for Settings {
    /// The full catalog with layering disabled.
    fn default() -> Self {
        Settings {
            palette: CATALOG.to_vec(),
            max_layers: MIN_LAYERS,
        }
    }
}
