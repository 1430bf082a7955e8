// Configuration management
//
// Handles player configuration: canvas layout, frame export and tracing.

use crate::canvas::FULL_WIDTH;
use crate::debug::LogLevel;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default configuration file path
pub const CONFIG_FILE: &str = "cdg_config.toml";

/// Player configuration
///
/// Stores all user-configurable settings for decoding a stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Canvas and allocation settings
    pub decoder: DecoderConfig,

    /// Frame export settings
    pub export: ExportConfig,

    /// Trace logging settings
    pub logging: LoggingConfig,
}

/// Decoder configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Row stride of the canvas in bytes (at least 300)
    pub stride: usize,

    /// Maximum number of canvases alive at once (0 = unbounded)
    pub pool_capacity: usize,
}

/// Frame export configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory PNG frames are written to
    pub output_directory: PathBuf,

    /// Write every Nth emitted frame (0 = only the final frame)
    pub frame_interval: u64,

    /// Export only the 294×204 area inside the border
    pub crop_border: bool,

    /// Include timestamp in the final frame's filename
    pub include_timestamp: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,

    /// Record every graphics packet (needs level `trace`)
    pub packet_trace: bool,

    /// Mirror the trace to this file
    pub log_file: Option<PathBuf>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            decoder: DecoderConfig {
                stride: FULL_WIDTH,
                pool_capacity: 2,
            },
            export: ExportConfig {
                output_directory: PathBuf::from("frames"),
                frame_interval: 0,
                crop_border: false,
                include_timestamp: true,
            },
            logging: LoggingConfig {
                level: LogLevel::Error,
                packet_trace: false,
                log_file: None,
            },
        }
    }
}

impl PlayerConfig {
    /// Load configuration from file or create default
    ///
    /// If the configuration file can't be read, returns the default
    /// configuration and tries to save it to the file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cdg_rs::player::PlayerConfig;
    ///
    /// let config = PlayerConfig::load_or_default("cdg_config.toml");
    /// ```
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load_from(&path).unwrap_or_else(|_| {
            let config = Self::default();
            // Try to save the default config, but don't fail if we can't
            let _ = config.save_to(&path);
            config
        })
    }

    /// Load configuration from file
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, io::Error> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, io::Error> {
        toml::from_str(contents).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Save configuration to file
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), io::Error> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlayerConfig::default();
        assert_eq!(config.decoder.stride, 300);
        assert_eq!(config.decoder.pool_capacity, 2);
        assert_eq!(config.export.frame_interval, 0);
        assert_eq!(config.logging.level, LogLevel::Error);
        assert!(config.logging.log_file.is_none());
    }

    #[test]
    fn test_config_serialization() {
        let mut config = PlayerConfig::default();
        config.logging.log_file = Some(PathBuf::from("trace.log"));
        config.logging.level = LogLevel::Trace;

        let toml_str = toml::to_string(&config).expect("Failed to serialize");
        let deserialized = PlayerConfig::from_toml(&toml_str).expect("Failed to deserialize");

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_parse_handwritten_config() {
        let text = r#"
            [decoder]
            stride = 320
            pool_capacity = 0

            [export]
            output_directory = "out"
            frame_interval = 300
            crop_border = true
            include_timestamp = false

            [logging]
            level = "debug"
            packet_trace = false
        "#;

        let config = PlayerConfig::from_toml(text).unwrap();
        assert_eq!(config.decoder.stride, 320);
        assert_eq!(config.export.output_directory, PathBuf::from("out"));
        assert!(config.export.crop_border);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert!(config.logging.log_file.is_none());
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let err = PlayerConfig::from_toml("decoder = 3").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
