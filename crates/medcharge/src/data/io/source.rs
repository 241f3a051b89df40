//! Storage collaborators the loader reads raw dataset bytes from.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Somewhere a dataset can be read from, addressed by a location string.
///
/// Implementations must not mutate the underlying data.
pub trait DatasetSource: Send + Sync {
    /// Read the full contents stored at `location`.
    fn read(&self, location: &str) -> io::Result<Vec<u8>>;
}

impl<S: DatasetSource + ?Sized> DatasetSource for Arc<S> {
    fn read(&self, location: &str) -> io::Result<Vec<u8>> {
        (**self).read(location)
    }
}

impl<S: DatasetSource + ?Sized> DatasetSource for &S {
    fn read(&self, location: &str) -> io::Result<Vec<u8>> {
        (**self).read(location)
    }
}

/// Reads datasets from the local filesystem.
///
/// Relative locations resolve against `root` when one is set, otherwise
/// against the process working directory.
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    root: Option<PathBuf>,
}

impl FileSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative locations against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, location: &str) -> PathBuf {
        let path = Path::new(location);
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl DatasetSource for FileSource {
    fn read(&self, location: &str) -> io::Result<Vec<u8>> {
        let path = self.resolve(location);
        if path.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is a directory", path.display()),
            ));
        }
        std::fs::read(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn file_source_reads_absolute_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"age\n1\n").unwrap();
        let bytes = FileSource::new()
            .read(file.path().to_str().unwrap())
            .unwrap();
        assert_eq!(bytes, b"age\n1\n");
    }

    #[test]
    fn file_source_resolves_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("data.csv"), b"x").unwrap();
        let source = FileSource::with_root(dir.path());
        assert_eq!(source.read("data.csv").unwrap(), b"x");
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileSource::with_root(dir.path())
            .read("missing.csv")
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileSource::new()
            .read(dir.path().to_str().unwrap())
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
