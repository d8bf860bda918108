use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Database descriptor kept in `<db_name>/info.json`.
#[derive(Debug, Clone, PartialEq)]
pub struct DbInfo {
    pub db_name: String,
    pub server_port: u16,
    pub version: f32,
    pub is_beta: bool,
}

// On disk the version is a string, e.g. "1.0".
#[derive(Debug, Serialize, Deserialize)]
struct RawInfo {
    db_name: String,
    server_port: u16,
    version: String,
    #[serde(default)]
    is_beta: bool,
}

impl DbInfo {
    pub const DEFAULT_VERSION: f32 = 1.0;

    pub fn new(db_name: impl Into<String>, server_port: u16) -> Self {
        Self {
            db_name: db_name.into(),
            server_port,
            version: Self::DEFAULT_VERSION,
            is_beta: false,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let raw: RawInfo = serde_json::from_str(data)?;
        let version = raw
            .version
            .trim()
            .parse::<f32>()
            .map_err(|_| Error::Config(format!("invalid version '{}'", raw.version)))?;
        if raw.db_name.is_empty() {
            return Err(Error::Config("db_name must not be empty".to_string()));
        }
        Ok(Self {
            db_name: raw.db_name,
            server_port: raw.server_port,
            version,
            is_beta: raw.is_beta,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        let raw = RawInfo {
            db_name: self.db_name.clone(),
            server_port: self.server_port,
            version: format!("{:?}", self.version),
            is_beta: self.is_beta,
        };
        Ok(serde_json::to_string_pretty(&raw)?)
    }
}
