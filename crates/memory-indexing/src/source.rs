//! Directory-backed text source.
//!
//! Walks a directory tree and turns every file with a matching extension into
//! a [`SourceDocument`] whose id is its `/`-separated path relative to the root.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use memory_types::{MemoryError, SourceDocument, TextSource};

use crate::error::IndexingError;

/// Extensions read when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["md", "txt"];

/// Loads text files from a directory tree.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    extensions: Vec<String>,
    name: String,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = root.display().to_string();
        Self {
            root,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            name,
        }
    }

    /// Restrict to the given extensions (without leading dot, case-insensitive).
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Read every matching file, ordered by path.
    ///
    /// Files that are not valid UTF-8 are skipped with a warning.
    pub fn scan(&self) -> Result<Vec<SourceDocument>, IndexingError> {
        if !self.root.is_dir() {
            return Err(IndexingError::Source(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }
        let root = std::fs::canonicalize(&self.root)?;

        let mut documents = Vec::new();
        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Some(extension) = self.matching_extension(path) else {
                continue;
            };

            let text = match std::fs::read_to_string(path) {
                Ok(text) => text,
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    warn!(path = %path.display(), "Skipping non UTF-8 file");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let relative = path.strip_prefix(&root).unwrap_or(path);
            let id = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            let mut doc = SourceDocument::new(id, text)
                .with_doc_type(extension)
                .with_path(path.display().to_string());
            if let Some(stem) = path.file_stem() {
                doc = doc.with_title(stem.to_string_lossy());
            }
            documents.push(doc);
        }

        debug!(root = %root.display(), count = documents.len(), "Scanned directory source");
        Ok(documents)
    }

    fn matching_extension(&self, path: &Path) -> Option<String> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        self.extensions
            .iter()
            .any(|e| *e == extension)
            .then_some(extension)
    }
}

impl TextSource for DirectorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<Vec<SourceDocument>, MemoryError> {
        self.scan()
            .map_err(|e| MemoryError::source_failed(&self.name, e.to_string()))
    }
}
