// SPDX-License-Identifier: MPL-2.0-only

use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub const NAME: &str = "vidpaper";
pub const CONFIG_FILE: &str = "config.ron";

/// Frame cadence used when none is configured.
pub const DEFAULT_FRAME_RATE: u32 = 60;

/// Upper bound for the message that asks the shell to spawn its worker layer.
pub const DEFAULT_SHELL_MESSAGE_TIMEOUT_MS: u32 = 100;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),
}

/// What the player does when reading a packet fails for a reason other
/// than end of stream.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadErrorPolicy {
    /// Log the failure, poll window events and read again.
    #[default]
    Skip,
    /// Stop playback and report the failure.
    Abort,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Setters)]
#[serde(deny_unknown_fields, default)]
#[must_use]
pub struct Config {
    /// video played when none is given on the command line
    #[setters(strip_option, into)]
    pub source: Option<PathBuf>,
    /// fixed presentation cadence in frames per second
    pub frame_rate: u32,
    /// timeout for the worker layer request sent to the desktop shell
    pub shell_message_timeout_ms: u32,
    pub read_error_policy: ReadErrorPolicy,
    /// title of the wallpaper window
    #[setters(into)]
    pub window_title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: None,
            frame_rate: DEFAULT_FRAME_RATE,
            shell_message_timeout_ms: DEFAULT_SHELL_MESSAGE_TIMEOUT_MS,
            read_error_policy: ReadErrorPolicy::default(),
            window_title: String::from(NAME),
        }
    }
}

impl Config {
    /// Location of the config file in the user's config directory.
    #[must_use]
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(NAME).join(CONFIG_FILE))
    }

    /// Load the config from the user's config directory.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, Error> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::debug!("No config directory available, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load the config from `path`. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, Error> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(Error::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        ron::from_str(&contents).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the config to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Fails if the directory or file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), Error> {
        let contents = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| Error::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(path, contents).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Delay applied after every presented frame.
    ///
    /// Integer millisecond division, so 60 fps gives 16ms. A zero frame rate
    /// falls back to [`DEFAULT_FRAME_RATE`].
    #[must_use]
    pub fn frame_delay(&self) -> Duration {
        let rate = if self.frame_rate == 0 {
            tracing::warn!("Frame rate of 0 is invalid, using {DEFAULT_FRAME_RATE}");
            DEFAULT_FRAME_RATE
        } else {
            self.frame_rate
        };
        Duration::from_millis(u64::from(1000 / rate))
    }

    #[must_use]
    pub fn shell_message_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.shell_message_timeout_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_delay_is_sixty_hertz() {
        assert_eq!(Config::default().frame_delay(), Duration::from_millis(16));
    }

    #[test]
    fn zero_frame_rate_falls_back() {
        let config = Config::default().frame_rate(0);
        assert_eq!(config.frame_delay(), Duration::from_millis(16));
    }

    #[test]
    fn custom_frame_rate() {
        let config = Config::default().frame_rate(30);
        assert_eq!(config.frame_delay(), Duration::from_millis(33));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.ron")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "(frame_rate: 24, read_error_policy: Abort)").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.frame_rate, 24);
        assert_eq!(config.read_error_policy, ReadErrorPolicy::Abort);
        assert_eq!(config.shell_message_timeout_ms, DEFAULT_SHELL_MESSAGE_TIMEOUT_MS);
        assert_eq!(config.window_title, NAME);
        assert!(config.source.is_none());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "(playlist: [])").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Parse { .. })));
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(NAME).join(CONFIG_FILE);
        let config = Config::default()
            .source(PathBuf::from("clips/ocean.mp4"))
            .shell_message_timeout_ms(250);

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }
}
