// Infrastructure implementations for include_trace.

use crate::ports::SourceResolver;
use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub mod concurrency;
pub mod config_loader;

/// Resolves node paths against the working directory, then each include
/// search directory in order.
pub struct FsSourceResolver {
    search_dirs: Vec<PathBuf>,
}

impl FsSourceResolver {
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        Self { search_dirs }
    }
}

impl SourceResolver for FsSourceResolver {
    fn locate(&self, path: &str) -> Option<PathBuf> {
        let direct = PathBuf::from(path);
        if direct.is_file() {
            return Some(direct);
        }
        self.search_dirs
            .iter()
            .map(|dir| dir.join(path))
            .find(|candidate| candidate.is_file())
    }

    fn read_source(&self, location: &Path) -> io::Result<String> {
        let bytes = fs::read(location)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Read a whole trace file.
pub fn load_trace(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read trace file {}", path.display()))
}
