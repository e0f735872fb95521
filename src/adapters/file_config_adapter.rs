//! INI file configuration adapter.
//!
//! A missing file behaves like an empty one: every lookup falls back to its
//! default. A value that is present but unparseable is a configuration error.

use crate::domain::error::SigbenchError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SigbenchError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        if path.exists() {
            config
                .load(path)
                .map_err(|reason| SigbenchError::ConfigParse {
                    file: path.display().to_string(),
                    reason,
                })?;
        }
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, SigbenchError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| SigbenchError::ConfigParse {
                file: "<inline>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, SigbenchError> {
        match self.config.getint(section, key) {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Ok(default),
            Err(reason) => Err(SigbenchError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason,
            }),
        }
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, SigbenchError> {
        match self.config.getfloat(section, key) {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Ok(default),
            Err(reason) => Err(SigbenchError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason,
            }),
        }
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> Result<bool, SigbenchError> {
        match self.config.get(section, key) {
            Some(raw) => Self::parse_bool(&raw).ok_or_else(|| SigbenchError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("expected a boolean, got {:?}", raw),
            }),
            None => Ok(default),
        }
    }
}
