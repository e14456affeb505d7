use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use voodoo_core::{BufferSelect, VoodooConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputBuffer {
    #[default]
    Front,
    Back,
}

impl OutputBuffer {
    #[must_use]
    pub fn to_select(self) -> BufferSelect {
        match self {
            Self::Front => BufferSelect::Front,
            Self::Back => BufferSelect::Back,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub buffer: OutputBuffer,
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_output_path() -> PathBuf {
    "voodoo-frame.ppm".into()
}

fn default_width() -> u32 {
    640
}

fn default_height() -> u32 {
    480
}

impl Default for OutputConfig {
    fn default() -> Self {
        toml::from_str("").unwrap()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayConfig {
    #[serde(default)]
    pub chip: VoodooConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        toml::from_str("").unwrap()
    }
}

/// Read a replay config from a TOML file. Every field has a default, so an empty file is valid
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML for this config.
pub fn read_config<P: AsRef<Path>>(path: P) -> anyhow::Result<ReplayConfig> {
    let path = path.as_ref();

    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Error reading config from '{}'", path.display()))?;
    let config: ReplayConfig = toml::from_str(&config_str)
        .with_context(|| format!("Error parsing config in '{}'", path.display()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use voodoo_core::Revision;

    #[test]
    fn replay_config_default_does_not_panic() {
        let config = ReplayConfig::default();
        assert_eq!(config.chip, VoodooConfig::default());
        assert_eq!(config.output.buffer, OutputBuffer::Front);
        assert_eq!((config.output.width, config.output.height), (640, 480));
    }

    #[test]
    fn partial_config() {
        let config: ReplayConfig = toml::from_str(
            r#"
            [chip]
            revision = "Voodoo1"
            tmu_count = 1

            [output]
            buffer = "Back"
            path = "out.ppm"
            "#,
        )
        .unwrap();

        assert_eq!(config.chip.revision, Revision::Voodoo1);
        assert_eq!(config.chip.tmu_count, 1);
        assert_eq!(config.chip.fb_memory_mb, VoodooConfig::default().fb_memory_mb);
        assert_eq!(config.output.buffer, OutputBuffer::Back);
        assert_eq!(config.output.path, PathBuf::from("out.ppm"));
        assert_eq!(config.output.width, 640);
    }

    #[test]
    fn unknown_revision_is_rejected() {
        assert!(toml::from_str::<ReplayConfig>("[chip]\nrevision = \"Voodoo5\"").is_err());
    }
}
