//! Case manifest loading
//!
//! A case manifest is a TOML file naming the sources to scan:
//!
//! ```toml
//! [[sources]]
//! id = "S1_Mobile"
//! path = "/evidence/mobile"
//!
//! [[sources]]
//! id = "S2_Laptop"
//! path = "/evidence/laptop"
//!
//! # optional
//! extensions = ["jpg", "png", "pdf"]
//! exiftool = "/usr/local/bin/exiftool"
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// One device or collection origin
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Source identifier; becomes the `source_id` of every record scanned
    /// from this root
    pub id: String,
    /// Directory root of the collected files
    pub path: PathBuf,
}

/// Case manifest
#[derive(Debug, Clone, Deserialize)]
pub struct CaseConfig {
    /// Sources to scan, in manifest order
    #[serde(default)]
    pub sources: Vec<SourceConfig>,

    /// Extension filter for the scanner; `None` keeps the scanner default
    #[serde(default)]
    pub extensions: Option<Vec<String>>,

    /// Override for the exiftool binary; `None` resolves from PATH
    #[serde(default)]
    pub exiftool: Option<PathBuf>,
}

impl CaseConfig {
    /// Load and validate a manifest from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read manifest {}: {}", path.display(), e))
        })?;
        let config: CaseConfig = toml::from_str(&text).map_err(|e| {
            Error::Config(format!("Invalid manifest {}: {}", path.display(), e))
        })?;
        config.validate()?;

        tracing::info!(
            manifest = %path.display(),
            sources = config.sources.len(),
            "Loaded case manifest"
        );
        Ok(config)
    }

    /// Check the manifest is usable: at least one source, non-blank ids,
    /// no duplicate ids
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(Error::Config(
                "Manifest declares no sources; nothing to scan".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for source in &self.sources {
            if source.id.trim().is_empty() {
                return Err(Error::Config(format!(
                    "Source with path {} has a blank id",
                    source.path.display()
                )));
            }
            if !seen.insert(source.id.as_str()) {
                return Err(Error::Config(format!(
                    "Duplicate source id '{}'",
                    source.id
                )));
            }
        }
        Ok(())
    }
}
