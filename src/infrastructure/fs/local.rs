//! Local File System Implementation
//!
//! Implements the FileSystem port for local disk operations.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::domain::ports::file_system::{FileSystem, FsError, FsResult};

/// Local file system implementation
///
/// Writes go to a temp file in the target's directory and are renamed into
/// place, so a crash never leaves a half-written parameter file.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    /// Create a new LocalFs instance
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for LocalFs {
    fn read(&self, path: &Path) -> FsResult<String> {
        std::fs::read_to_string(path).map_err(|e| FsError::from_io(e, path))
    }

    fn write(&self, path: &Path, content: &str) -> FsResult<()> {
        atomic_write(path, content.as_bytes())
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Write content to a file atomically (tempfile + rename)
pub fn atomic_write(path: &Path, content: &[u8]) -> FsResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| FsError::from_io(e, dir))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| FsError::from_io(e, dir))?;
    tmp.write_all(content)
        .map_err(|e| FsError::from_io(e, path))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| FsError::from_io(e, path))?;

    // Keep the original permissions when overwriting.
    if let Ok(meta) = std::fs::metadata(path) {
        let _ = std::fs::set_permissions(tmp.path(), meta.permissions());
    }

    tmp.persist(path)
        .map_err(|e| FsError::from_io(e.error, path))?;
    Ok(())
}
