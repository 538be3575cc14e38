//! Artifact file scanner
//!
//! Recursive discovery of collectible files under one source root (a
//! mounted device, an exported image tree). Per-file problems are logged
//! and recorded, never fatal to the scan: in a forensic run, a partial
//! listing beats an aborted one.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// File scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Cannot access file
    #[error("File access error {0}: {1}")]
    FileAccessError(PathBuf, String),
}

/// One discovered artifact candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFile {
    /// Deterministic id: `<source>-NNN` over the sorted relative paths
    pub artifact_id: String,
    /// Source the file was collected from
    pub source_id: String,
    /// Absolute path on disk
    pub path: PathBuf,
}

/// Scan result with statistics
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Discovered artifact files, sorted by path
    pub files: Vec<ArtifactFile>,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Count of files by extension
    pub by_extension: BTreeMap<String, usize>,
    /// Non-fatal scan errors encountered
    pub errors: Vec<String>,
}

/// Artifact file scanner
pub struct FileScanner {
    ignore_patterns: Vec<String>,
    extensions: Vec<String>,
    max_depth: Option<usize>,
}

impl FileScanner {
    /// Create a scanner with default ignore patterns and extension filter
    ///
    /// Ignores system clutter like .DS_Store, Thumbs.db, .git, etc.
    pub fn new() -> Self {
        Self {
            ignore_patterns: vec![
                ".DS_Store".to_string(),
                "Thumbs.db".to_string(),
                ".git".to_string(),
                ".svn".to_string(),
            ],
            extensions: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "gif".to_string(),
                "bmp".to_string(),
                "tiff".to_string(),
                "pdf".to_string(),
                "docx".to_string(),
            ],
            max_depth: None,
        }
    }

    /// Replace the extension filter; an empty list accepts every file
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Scan one source root for artifact files
    ///
    /// Traversal is sequential (the symlink-visited set is mutable) and
    /// deterministic: discovered paths are sorted before artifact ids are
    /// assigned, so the same tree always yields the same ids.
    pub fn scan(&self, source_id: &str, root_path: &Path) -> Result<ScanResult, ScanError> {
        if !root_path.exists() {
            return Err(ScanError::PathNotFound(root_path.to_path_buf()));
        }
        if !root_path.is_dir() {
            return Err(ScanError::NotADirectory(root_path.to_path_buf()));
        }

        let mut paths = Vec::new();
        let mut errors = Vec::new();
        let mut symlink_visited = HashSet::new();

        let walker = WalkDir::new(root_path)
            .follow_links(false)
            .max_depth(self.max_depth.unwrap_or(usize::MAX))
            .into_iter()
            .filter_entry(|e| self.should_process_entry(e, &mut symlink_visited));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && self.matches_extension(entry.path()) {
                        paths.push(entry.path().to_path_buf());
                    }
                }
                Err(e) => {
                    tracing::warn!(source = source_id, "Error accessing entry: {}", e);
                    errors.push(e.to_string());
                }
            }
        }

        paths.sort();

        let mut total_size = 0u64;
        let mut by_extension: BTreeMap<String, usize> = BTreeMap::new();
        let mut files = Vec::with_capacity(paths.len());

        for (index, path) in paths.into_iter().enumerate() {
            match std::fs::metadata(&path) {
                Ok(meta) => total_size += meta.len(),
                Err(e) => errors.push(format!("{}: {}", path.display(), e)),
            }
            if let Some(ext) = path.extension() {
                let ext = ext.to_string_lossy().to_lowercase();
                *by_extension.entry(ext).or_insert(0) += 1;
            }
            files.push(ArtifactFile {
                artifact_id: format!("{}-{:03}", source_id, index + 1),
                source_id: source_id.to_string(),
                path,
            });
        }

        tracing::info!(
            source = source_id,
            files = files.len(),
            total_size,
            errors = errors.len(),
            "Source scan complete"
        );

        Ok(ScanResult {
            files,
            total_size,
            by_extension,
            errors,
        })
    }

    /// Check if entry should be processed
    fn should_process_entry(
        &self,
        entry: &DirEntry,
        symlink_visited: &mut HashSet<PathBuf>,
    ) -> bool {
        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy();

        for pattern in &self.ignore_patterns {
            if file_name.contains(pattern) {
                return false;
            }
        }

        // Detect symlink loops
        if entry.file_type().is_symlink() {
            if let Ok(canonical) = path.canonicalize() {
                if !symlink_visited.insert(canonical) {
                    tracing::warn!("Symlink loop detected: {}", path.display());
                    return false;
                }
            }
        }

        true
    }

    fn matches_extension(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .map(|ext| {
                let ext = ext.to_string_lossy().to_lowercase();
                self.extensions.iter().any(|e| *e == ext)
            })
            .unwrap_or(false)
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}
