use crate::domain::scope_tree::ScopeTree;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub mod cluster_exporter;

/// Maps node paths onto readable source files.
/// Implementations must be thread-safe (Send + Sync); the scanner reads in parallel.
pub trait SourceResolver: Send + Sync {
    /// Find a readable location for `path`, or `None` when it cannot be resolved.
    fn locate(&self, path: &str) -> Option<PathBuf>;
    fn read_source(&self, location: &Path) -> io::Result<String>;
}

pub trait GraphExporter {
    fn export(&self, tree: &ScopeTree, out: &mut dyn Write) -> io::Result<()>;
}
