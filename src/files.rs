//! File Collaborator Module
//!
//! Whole-file read, write and delete used by the cache to fetch sources and
//! emit output files.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::debug;

// == File System Trait ==
/// Byte-buffer source and sink consumed by the cache.
pub trait FileSystem {
    /// Reads the whole named file.
    fn read_all(&self, name: &str) -> io::Result<Bytes>;

    /// Writes `data` to the named file, creating or truncating it.
    ///
    /// Returns the number of bytes accepted.
    fn write_all(&self, name: &str, data: &[u8]) -> io::Result<usize>;

    /// Removes the named file. Never fails, even if the file is absent.
    fn delete(&self, name: &str);
}

impl<T: FileSystem + ?Sized> FileSystem for &T {
    fn read_all(&self, name: &str) -> io::Result<Bytes> {
        (**self).read_all(name)
    }

    fn write_all(&self, name: &str, data: &[u8]) -> io::Result<usize> {
        (**self).write_all(name, data)
    }

    fn delete(&self, name: &str) {
        (**self).delete(name)
    }
}

// == Disk File System ==
/// Files on disk, with names resolved against a root directory.
#[derive(Debug, Clone)]
pub struct DiskFs {
    root: PathBuf,
}

impl DiskFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl Default for DiskFs {
    fn default() -> Self {
        Self::new(".")
    }
}

impl FileSystem for DiskFs {
    fn read_all(&self, name: &str) -> io::Result<Bytes> {
        fs::read(self.resolve(name)).map(Bytes::from)
    }

    fn write_all(&self, name: &str, data: &[u8]) -> io::Result<usize> {
        fs::write(self.resolve(name), data)?;
        Ok(data.len())
    }

    fn delete(&self, name: &str) {
        if let Err(err) = fs::remove_file(self.resolve(name)) {
            debug!("delete of '{}' ignored: {}", name, err);
        }
    }
}

// == Memory File System ==
/// In-memory files, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryFs {
    files: RefCell<BTreeMap<String, Bytes>>,
    write_limit: Option<usize>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps how many bytes a single write accepts; longer writes are truncated.
    pub fn with_write_limit(limit: usize) -> Self {
        Self {
            files: RefCell::default(),
            write_limit: Some(limit),
        }
    }

    pub fn insert(&self, name: impl Into<String>, data: impl Into<Bytes>) {
        self.files.borrow_mut().insert(name.into(), data.into());
    }

    pub fn contents(&self, name: &str) -> Option<Bytes> {
        self.files.borrow().get(name).cloned()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.files.borrow().contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.files.borrow().keys().cloned().collect()
    }
}

impl FileSystem for MemoryFs {
    fn read_all(&self, name: &str) -> io::Result<Bytes> {
        self.contents(name)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no such file: {name}")))
    }

    fn write_all(&self, name: &str, data: &[u8]) -> io::Result<usize> {
        let accepted = self.write_limit.map_or(data.len(), |limit| data.len().min(limit));
        self.insert(name, Bytes::copy_from_slice(&data[..accepted]));
        Ok(accepted)
    }

    fn delete(&self, name: &str) {
        self.files.borrow_mut().remove(name);
    }
}
