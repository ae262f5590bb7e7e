//! Reading and writing snapshot files

use std::path::Path;

use banker_core::Snapshot;

use crate::error::{CliError, CliResult};

/// On-disk snapshot encodings, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Yaml,
    Toml,
}

impl SnapshotFormat {
    pub fn from_path(path: &Path) -> CliResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            other => Err(CliError::UnsupportedFormat(if other.is_empty() {
                path.display().to_string()
            } else {
                format!(".{}", other)
            })),
        }
    }
}

pub fn parse(content: &str, format: SnapshotFormat) -> CliResult<Snapshot> {
    Ok(match format {
        SnapshotFormat::Json => serde_json::from_str(content)?,
        SnapshotFormat::Yaml => serde_yaml::from_str(content)?,
        SnapshotFormat::Toml => toml::from_str(content)?,
    })
}

pub fn render(snapshot: &Snapshot, format: SnapshotFormat) -> CliResult<String> {
    Ok(match format {
        SnapshotFormat::Json => serde_json::to_string_pretty(snapshot)?,
        SnapshotFormat::Yaml => serde_yaml::to_string(snapshot)?,
        SnapshotFormat::Toml => toml::to_string(snapshot)?,
    })
}

/// Load a snapshot; the format follows the extension.
pub fn load(path: &Path) -> CliResult<Snapshot> {
    let format = SnapshotFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    let snapshot = parse(&content, format)?;
    tracing::debug!(path = %path.display(), ?format, "Snapshot loaded");
    Ok(snapshot)
}

pub fn save(path: &Path, snapshot: &Snapshot) -> CliResult<()> {
    let format = SnapshotFormat::from_path(path)?;
    std::fs::write(path, render(snapshot, format)?)?;
    tracing::debug!(path = %path.display(), ?format, "Snapshot written");
    Ok(())
}
