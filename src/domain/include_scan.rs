//! Transitive Include Scanner
//!
//! Reads the files behind the nodes of a finished [`ScopeTree`] and collects
//! the `#include` targets they name. Discovered targets are reported only;
//! they are not attached to the tree.

use crate::domain::scope_tree::{NodeId, ScopeTree};
use crate::ports::SourceResolver;
use rayon::prelude::*;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn include_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)^[ \t]*#[ \t]*include[ \t]*(?:"([^"\n]+)"|<([^>\n]+)>)"#)
            .expect("include pattern is valid")
    })
}

/// Literal include targets in `source`, in order of appearance.
pub fn extract_includes(source: &str) -> Vec<&str> {
    include_pattern()
        .captures_iter(source)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str())
        .collect()
}

/// Result of one scan over a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// First sighting of each raw include target, in walk order.
    pub discovered: Vec<String>,
    /// Node paths that could not be resolved or read.
    pub skipped: Vec<String>,
    /// Number of files actually read.
    pub scanned: usize,
}

enum FileScan {
    Includes(Vec<String>),
    Unresolved,
}

pub struct TransitiveScanner<'a> {
    resolver: &'a dyn SourceResolver,
}

impl<'a> TransitiveScanner<'a> {
    pub fn new(resolver: &'a dyn SourceResolver) -> Self {
        Self { resolver }
    }

    /// Walk `tree` (child scopes before own nodes) and report every include
    /// target not seen before. Files are read in parallel; the visited set is
    /// applied over the ordered results so the report is deterministic.
    pub fn scan(&self, tree: &ScopeTree) -> ScanReport {
        let order = tree.nodes_depth_first();
        let results: Vec<(NodeId, FileScan)> = order
            .par_iter()
            .map(|id| (*id, self.scan_node(&tree.node(*id).path)))
            .collect();

        let mut report = ScanReport::default();
        let mut visited: HashSet<String> = HashSet::new();
        for (id, result) in results {
            match result {
                FileScan::Unresolved => {
                    let path = &tree.node(id).path;
                    log::debug!("unresolved: {}", path);
                    report.skipped.push(path.clone());
                }
                FileScan::Includes(targets) => {
                    report.scanned += 1;
                    for target in targets {
                        if visited.insert(target.clone()) {
                            log::info!("{}", target);
                            report.discovered.push(target);
                        }
                    }
                }
            }
        }
        report
    }

    fn scan_node(&self, path: &str) -> FileScan {
        let Some(location) = self.resolver.locate(path) else {
            return FileScan::Unresolved;
        };
        match self.resolver.read_source(&location) {
            Ok(source) => {
                log::debug!("scanning {} as {}", path, location.display());
                FileScan::Includes(extract_includes(&source).into_iter().map(String::from).collect())
            }
            Err(e) => {
                log::debug!("cannot read {}: {}", location.display(), e);
                FileScan::Unresolved
            }
        }
    }
}
