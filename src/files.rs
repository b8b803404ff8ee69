//! The `@file` seam.
//!
//! Handlers never touch the filesystem directly; every `@path` payload goes
//! through a [`PayloadReader`]. Reads are whole-file and the handle is closed
//! before the handler returns.

use std::collections::HashMap;

use crate::error::{Error, Result};

pub trait PayloadReader: Send + Sync {
    fn read(&self, path: &str) -> Result<Vec<u8>>;
}

/// Reads payloads from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsReader;

impl PayloadReader for FsReader {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        std::fs::read(path).map_err(|source| Error::FileRead {
            path: path.to_owned(),
            source,
        })
    }
}

/// Serves payloads from memory, keyed by the exact path used after `@`.
#[derive(Debug, Default, Clone)]
pub struct MemoryReader {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }
}

impl PayloadReader for MemoryReader {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| Error::FileRead {
            path: path.to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        })
    }
}
