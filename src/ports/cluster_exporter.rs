//! Cluster DOT Exporter
//!
//! Exports a ScopeTree as Graphviz DOT, one nested cluster per directory.

use crate::domain::scope_tree::{EdgeKind, ScopeId, ScopeTree};
use crate::ports::GraphExporter;
use regex::Regex;
use std::borrow::Cow;
use std::io::{self, Write};
use std::sync::OnceLock;

pub struct ClusterDotExporter;

impl GraphExporter for ClusterDotExporter {
    fn export(&self, tree: &ScopeTree, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(Self::to_dot(tree).as_bytes())
    }
}

impl ClusterDotExporter {
    /// Convert a ScopeTree to a DOT string.
    pub fn to_dot(tree: &ScopeTree) -> String {
        let mut dot = String::new();
        dot.push_str("digraph G {\n");
        dot.push_str("  node [fontname=Helvetica, fontsize=10];\n\n");

        // Every node must be declared before the first edge statement.
        Self::write_scopes(tree, tree.root(), 1, 0, &mut dot);
        dot.push('\n');
        Self::write_edges(tree, tree.root(), &mut dot);

        dot.push_str("}\n");
        dot
    }

    /// Pass 1: clusters and node declarations. Returns the next cluster number.
    fn write_scopes(
        tree: &ScopeTree,
        scope_id: ScopeId,
        indent: usize,
        mut cluster: usize,
        dot: &mut String,
    ) -> usize {
        let scope = tree.scope(scope_id);
        let pad = "  ".repeat(indent);
        let clustered = scope_id != tree.root() && scope.is_cluster();

        if clustered {
            let label = scope.prefix.as_deref().unwrap_or_default();
            dot.push_str(&format!("{}subgraph cluster_{} {{\n", pad, cluster));
            dot.push_str(&format!("{}  label=\"{}\";\n", pad, Self::escape_label(label)));
            cluster += 1;
        }

        for child in scope.children.values() {
            cluster = Self::write_scopes(tree, *child, indent + 1, cluster, dot);
            dot.push('\n');
        }

        let node_pad = "  ".repeat(indent + 1);
        for node in &scope.nodes {
            dot.push_str(&format!("{}\"{}\";\n", node_pad, dot_name(&tree.node(*node).path)));
        }

        if clustered {
            dot.push_str(&format!("{}}}\n", pad));
        }
        cluster
    }

    /// Pass 2: edges, child scopes first.
    fn write_edges(tree: &ScopeTree, scope_id: ScopeId, dot: &mut String) {
        let scope = tree.scope(scope_id);
        for child in scope.children.values() {
            Self::write_edges(tree, *child, dot);
        }

        for node in &scope.nodes {
            for edge in tree.node(*node).edges.values() {
                let attr = match edge.kind {
                    EdgeKind::Explicit => "",
                    EdgeKind::Transitive => " [color=blue]",
                };
                dot.push_str(&format!(
                    "  \"{}\" -> \"{}\"{};\n",
                    dot_name(&tree.node(edge.source).path),
                    dot_name(&tree.node(edge.target).path),
                    attr
                ));
            }
        }
    }

    fn escape_label(label: &str) -> String {
        label.replace('\\', "\\\\").replace('"', "\\\"")
    }
}

/// DOT identifier for a path: anything outside `[A-Za-z0-9/.+_-]` becomes `_`.
pub fn dot_name(path: &str) -> Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9/.+_-]").expect("dot name pattern is valid"));
    re.replace_all(path, "_")
}
