//! Loading raw snapshot files from disk.
//!
//! A snapshot file holds the raw (un-normalized) collections a dashboard pass
//! aggregates over. The file is returned as an untyped JSON value; typing and
//! defaulting happen in the normalizer.

use std::path::Path;

use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Yaml,
}

impl SnapshotFormat {
    /// Pick the format from the file extension. Anything that is not
    /// `.yaml`/`.yml` is read as JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => SnapshotFormat::Yaml,
            _ => SnapshotFormat::Json,
        }
    }
}

/// Read a raw snapshot file as JSON or YAML.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or is not valid for its format.
pub fn load_raw_snapshot(path: &Path) -> Result<serde_json::Value, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SnapshotFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_raw_snapshot(&content, SnapshotFormat::from_path(path)).map_err(|reason| {
        ConfigError::SnapshotFileParse {
            path: path.display().to_string(),
            reason,
        }
    })
}

fn parse_raw_snapshot(content: &str, format: SnapshotFormat) -> Result<serde_json::Value, String> {
    match format {
        SnapshotFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        SnapshotFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
    }
}
