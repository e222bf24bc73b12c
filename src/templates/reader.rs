//! Raw template file access

use std::io;
use std::path::PathBuf;

/// Source of raw template bytes, keyed by file identifier
pub trait SourceReader {
    fn read(&self, path: &str) -> io::Result<Vec<u8>>;
}

/// Reads template files from disk, relative to a resource root
#[derive(Debug, Clone)]
pub struct FsReader {
    root: PathBuf,
}

impl FsReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute paths are kept as-is, relative ones are joined to the root
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl SourceReader for FsReader {
    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.resolve(path))
    }
}
