//! Trace Parser
//!
//! Rebuilds the inclusion tree from a depth-coded trace such as the one
//! printed by `gcc -H`:
//!
//! ```text
//! . ./core/future.hh
//! .. /usr/include/c++/13/type_traits
//! . ./core/sstring.hh
//! ```
//!
//! The depth of a line is the offset of its first space.

use crate::domain::path::PathNormalizer;
use crate::domain::scope_tree::{EdgeKind, ScopeTree};
use thiserror::Error;

pub const DEFAULT_ROOT_NAME: &str = "<translation-unit>";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TraceError {
    #[error("line {line}: no space separating depth marker from path")]
    MissingSeparator { line: usize },

    #[error("line {line}: empty path")]
    EmptyPath { line: usize },
}

/// One decoded trace line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceLine<'a> {
    pub depth: usize,
    pub raw_path: &'a str,
}

impl<'a> TraceLine<'a> {
    /// Decode a single line; `line_no` is 1-based and only used for errors.
    pub fn parse(line: &'a str, line_no: usize) -> Result<Self, TraceError> {
        let space = line
            .find(' ')
            .ok_or(TraceError::MissingSeparator { line: line_no })?;
        // Depth counts characters, markers may be multibyte.
        let depth = line[..space].chars().count();
        let raw_path = line[space + 1..].trim();
        if raw_path.is_empty() {
            return Err(TraceError::EmptyPath { line: line_no });
        }
        Ok(Self { depth, raw_path })
    }
}

/// Counters for one parsed section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionStats {
    pub lines: usize,
    pub skipped_too_deep: usize,
    pub edges_added: usize,
}

/// Parser state. The stack is private to one instance, so separate traces
/// can be parsed independently.
#[derive(Debug, Clone)]
pub struct TraceParser<'n> {
    normalizer: &'n PathNormalizer,
    max_depth: usize,
    stack: Vec<String>,
}

impl<'n> TraceParser<'n> {
    pub fn new(normalizer: &'n PathNormalizer, max_depth: usize, root_name: &str) -> Self {
        Self {
            normalizer,
            max_depth,
            stack: vec![root_name.to_string()],
        }
    }

    /// Current inclusion chain, outermost first.
    pub fn stack(&self) -> &[String] {
        &self.stack
    }

    /// Parse one trace section into `tree`. Depths are measured relative to
    /// the stack length at the start of the section.
    pub fn parse_section(
        &mut self,
        trace: &str,
        tree: &mut ScopeTree,
    ) -> Result<SectionStats, TraceError> {
        let base = self.stack.len();
        let mut stats = SectionStats::default();

        for (idx, line) in trace.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            stats.lines += 1;

            let parsed = TraceLine::parse(line, idx + 1)?;
            if parsed.depth > self.max_depth {
                stats.skipped_too_deep += 1;
                continue;
            }

            let name = self.normalizer.normalize(parsed.raw_path);
            if self.step(base, parsed.depth, name, tree) {
                stats.edges_added += 1;
            }
        }

        log::debug!(
            "parsed {} trace lines ({} beyond max depth, {} edges)",
            stats.lines,
            stats.skipped_too_deep,
            stats.edges_added
        );
        Ok(stats)
    }

    fn step(&mut self, base: usize, depth: usize, name: String, tree: &mut ScopeTree) -> bool {
        let target = base + depth;
        if target <= self.stack.len() {
            self.stack.truncate(target.saturating_sub(1));
        }
        self.stack.push(name);

        match self.stack.as_slice() {
            [.., parent, child] if depth > 0 => tree.push_edge(parent, child, EdgeKind::Explicit),
            [.., top] => {
                tree.insert(top);
                false
            }
            [] => false,
        }
    }
}
