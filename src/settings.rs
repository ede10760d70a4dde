use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::state::DEFAULT_ROWS;

/// Environment variable overriding the settings file location
pub const CONFIG_ENV: &str = "DEVSHEETS_CONFIG";
const CONFIG_FILE_NAME: &str = "devsheets.json";

const DEFAULT_REFERENCE_DELIMITER: char = ';';
const DEFAULT_EXPORT_DELIMITER: char = ',';
/// Upper bound for `initial_rows`; the grid still grows past it by paste
pub const MAX_INITIAL_ROWS: usize = 10_000;

/// How grid rows are matched against reference records when filling.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Every filled cell of the row must equal the record's value
    #[default]
    AllKeys,
    /// Only the Device ID, compared as an integer
    DeviceId,
}

/// User settings, read from a JSON file next to the working directory
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub initial_rows: usize,
    pub reference_delimiter: char,
    pub export_delimiter: char,
    pub match_strategy: MatchStrategy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            initial_rows: DEFAULT_ROWS,
            reference_delimiter: DEFAULT_REFERENCE_DELIMITER,
            export_delimiter: DEFAULT_EXPORT_DELIMITER,
            match_strategy: MatchStrategy::default(),
        }
    }
}

impl Settings {
    /// `$DEVSHEETS_CONFIG`, or `devsheets.json` in the working directory
    pub fn default_path() -> PathBuf {
        config_path(std::env::var_os(CONFIG_ENV))
    }

    /// Load settings from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> io::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Load from the default location, falling back to defaults on any error
    pub fn load_or_default() -> Self {
        Self::load_or_default_from(&Self::default_path())
    }

    pub fn load_or_default_from(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings.validated(),
            Err(e) => {
                log::warn!("Ignoring settings file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Replace unusable values with their defaults
    pub fn validated(mut self) -> Self {
        if as_delimiter(self.reference_delimiter).is_none() {
            log::warn!(
                "Invalid reference_delimiter {:?}, using {:?}",
                self.reference_delimiter,
                DEFAULT_REFERENCE_DELIMITER
            );
            self.reference_delimiter = DEFAULT_REFERENCE_DELIMITER;
        }
        if as_delimiter(self.export_delimiter).is_none() {
            log::warn!(
                "Invalid export_delimiter {:?}, using {:?}",
                self.export_delimiter,
                DEFAULT_EXPORT_DELIMITER
            );
            self.export_delimiter = DEFAULT_EXPORT_DELIMITER;
        }
        if self.initial_rows == 0 || self.initial_rows > MAX_INITIAL_ROWS {
            log::warn!(
                "Invalid initial_rows {}, using {}",
                self.initial_rows,
                DEFAULT_ROWS
            );
            self.initial_rows = DEFAULT_ROWS;
        }
        self
    }

    pub fn reference_delimiter_byte(&self) -> u8 {
        as_delimiter(self.reference_delimiter).unwrap_or(DEFAULT_REFERENCE_DELIMITER as u8)
    }

    pub fn export_delimiter_byte(&self) -> u8 {
        as_delimiter(self.export_delimiter).unwrap_or(DEFAULT_EXPORT_DELIMITER as u8)
    }
}

fn config_path(env_value: Option<OsString>) -> PathBuf {
    env_value
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

fn as_delimiter(c: char) -> Option<u8> {
    (c.is_ascii() && !c.is_ascii_alphanumeric() && c != '"' && c != '\n' && c != '\r')
        .then_some(c as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("devsheets.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.reference_delimiter_byte(), b';');
        assert_eq!(settings.export_delimiter_byte(), b',');
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devsheets.json");
        std::fs::write(&path, r#"{ "match_strategy": "device_id", "initial_rows": 25 }"#).unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.match_strategy, MatchStrategy::DeviceId);
        assert_eq!(settings.initial_rows, 25);
        assert_eq!(settings.reference_delimiter, ';');
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devsheets.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Settings::load(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devsheets.json");
        let settings = Settings {
            reference_delimiter: '\t',
            ..Settings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn invalid_values_are_replaced() {
        let settings = Settings {
            initial_rows: 0,
            reference_delimiter: 'x',
            export_delimiter: 'é',
            match_strategy: MatchStrategy::AllKeys,
        }
        .validated();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn oversized_row_count_falls_back() {
        let settings = Settings {
            initial_rows: 10_000_000_000,
            ..Settings::default()
        }
        .validated();
        assert_eq!(settings.initial_rows, DEFAULT_ROWS);

        let settings = Settings {
            initial_rows: MAX_INITIAL_ROWS,
            ..Settings::default()
        }
        .validated();
        assert_eq!(settings.initial_rows, MAX_INITIAL_ROWS);
    }

    #[test]
    fn config_path_honours_environment_override() {
        assert_eq!(
            config_path(Some(OsString::from("/etc/devsheets/site.json"))),
            PathBuf::from("/etc/devsheets/site.json")
        );
        assert_eq!(config_path(None), PathBuf::from("devsheets.json"));
        assert_eq!(config_path(Some(OsString::new())), PathBuf::from("devsheets.json"));
    }

    #[test]
    fn startup_load_validates_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.json");
        std::fs::write(
            &path,
            r#"{ "initial_rows": 10000000000, "reference_delimiter": "a", "export_delimiter": ";", "match_strategy": "device_id" }"#,
        )
        .unwrap();

        let settings = Settings::load_or_default_from(&path);

        assert_eq!(settings.initial_rows, DEFAULT_ROWS);
        assert_eq!(settings.reference_delimiter, ';');
        assert_eq!(settings.export_delimiter_byte(), b';');
        assert_eq!(settings.match_strategy, MatchStrategy::DeviceId);
    }

    #[test]
    fn startup_load_ignores_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.json");
        std::fs::write(&path, r#"{ "initial_rows": "many" }"#).unwrap();

        assert_eq!(Settings::load_or_default_from(&path), Settings::default());
    }
}
