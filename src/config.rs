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

use config::{Config, File, FileFormat};
use tracing::info;

mod converter;
mod error;

pub use converter::{ConverterConfig, Layering, Settings, DEFAULT_MAX_LAYERS, INITIAL_MAX_LAYERS};
pub use error::ConfigError;

/// Loads a converter config from a file. The format follows the extension.
pub fn load(path: &Path) -> Result<ConverterConfig, ConfigError> {
    info!(path = ?path, "Loading settings");
    Ok(Config::builder()
        .add_source(File::from(path))
        .build()?
        .try_deserialize::<ConverterConfig>()?)
}

/// Parses a converter config from a string.
pub fn parse(contents: &str, format: FileFormat) -> Result<ConverterConfig, ConfigError> {
    Ok(Config::builder()
        .add_source(File::from_str(contents, format))
        .build()?
        .try_deserialize::<ConverterConfig>()?)
}

/// Serializes and saves a converter config. YAML is used for `.yaml` and
/// `.yml` files, JSON for everything else.
pub fn save(config: &ConverterConfig, path: &Path) -> Result<(), ConfigError> {
    let serialized = match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => serde_yml::to_string(config)?,
        _ => serde_json::to_string_pretty(config)?,
    };
    fs::write(path, serialized)?;
    Ok(())
}

/// Loads the config at the given path, creating it with defaults first if it
/// does not exist yet.
pub fn load_or_create(path: &Path) -> Result<ConverterConfig, ConfigError> {
    if !path.exists() {
        info!(path = ?path, "Config file not found, creating a default");
        let config = ConverterConfig::default();
        save(&config, path)?;
        return Ok(config);
    }
    load(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SoundId;

    #[test]
    fn parses_the_default_file_format() {
        let json = r#"
            {
                "palette": ["harp_pling", "game_start_countdown_01"],
                "layering": {
                    "comment": "Max sounds per note. 1 = no layering.",
                    "max_layers": 3
                }
            }
        "#;
        let config = parse(json, FileFormat::Json).unwrap();
        assert_eq!(config.layering().max_layers(), 3);

        let settings = config.resolve().unwrap();
        assert_eq!(settings.max_layers(), 3);
        let ids: Vec<SoundId> = settings.palette().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![SoundId::HarpPling, SoundId::Countdown01]);
    }

    #[test]
    fn yaml_is_accepted() {
        let yaml = r#"
            palette:
              - game_start_countdown_final.wav
              - harp_pling
            layering:
              max_layers: 2
        "#;
        let settings = parse(yaml, FileFormat::Yaml).unwrap().resolve().unwrap();
        let ids: Vec<SoundId> = settings.palette().iter().map(|s| s.id).collect();
        // Catalog order, not config order.
        assert_eq!(ids, vec![SoundId::HarpPling, SoundId::CountdownFinal]);
    }

    #[test]
    fn missing_layering_means_no_layering() {
        let config = parse(r#"{ "palette": ["harp_pling"] }"#, FileFormat::Json).unwrap();
        assert_eq!(config.layering().max_layers(), DEFAULT_MAX_LAYERS);
        assert_eq!(config.resolve().unwrap().max_layers(), 1);

        let config = parse(r#"{ "layering": {} }"#, FileFormat::Json).unwrap();
        assert_eq!(config.layering().max_layers(), DEFAULT_MAX_LAYERS);
    }

    #[test]
    fn missing_palette_means_full_catalog() {
        let config = parse(r#"{ "layering": { "max_layers": 2 } }"#, FileFormat::Json).unwrap();
        assert_eq!(config.resolve().unwrap().palette().len(), SoundId::ALL.len());
    }

    #[test]
    fn malformed_shapes_fail() {
        assert!(matches!(
            parse(r#"{ "palette": "harp_pling" }"#, FileFormat::Json),
            Err(ConfigError::Load(_))
        ));
        assert!(matches!(
            parse(r#"{ "layering": { "max_layers": "lots" } }"#, FileFormat::Json),
            Err(ConfigError::Load(_))
        ));
        assert!(matches!(
            parse("{ not json", FileFormat::Json),
            Err(ConfigError::Load(_))
        ));
    }

    #[test]
    fn invalid_values_fail_on_resolve() {
        for max_layers in [0, 6, -1] {
            let config = ConverterConfig::new(vec!["harp_pling".to_string()], max_layers);
            assert!(matches!(
                config.resolve(),
                Err(ConfigError::MaxLayers { value, .. }) if value == max_layers
            ));
        }

        let config = ConverterConfig::new(vec!["cowbell".to_string()], 2);
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::UnknownSound(name)) if name == "cowbell"
        ));

        // One unknown name fails the whole palette instead of being skipped.
        let config = ConverterConfig::new(vec!["harp_pling".to_string(), "cowbell".to_string()], 2);
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::UnknownSound(name)) if name == "cowbell"
        ));

        let config = ConverterConfig::new(vec![], 2);
        assert!(matches!(config.resolve(), Err(ConfigError::EmptyPalette)));
    }

    #[test]
    fn duplicate_palette_entries_collapse() {
        let config = ConverterConfig::new(
            vec![
                "harp_pling".to_string(),
                "harp_pling.wav".to_string(),
                "game_start_countdown_03".to_string(),
            ],
            2,
        );
        assert_eq!(config.resolve().unwrap().palette().len(), 2);
    }

    #[test]
    fn load_or_create_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let created = load_or_create(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created, ConverterConfig::default());
        assert_eq!(created.layering().max_layers(), INITIAL_MAX_LAYERS);

        let loaded = load_or_create(&path).unwrap();
        assert_eq!(loaded, created);
    }

    #[test]
    fn save_and_load_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let config = ConverterConfig::new(vec!["game_start_countdown_02".to_string()], 4);
        save(&config, &path).unwrap();
        assert_eq!(load(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load(&dir.path().join("missing.json")),
            Err(ConfigError::Load(_))
        ));
    }
}
